//! Error types shared by every schedule module and codec.

use thiserror::Error;

/// Errors raised while building, resampling, or (de)serializing schedules.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// A field value failed validation (identifier, limits, times, dates).
    #[error("validation error: {0}")]
    Validation(String),

    /// Timestep is not one of the accepted steps-per-hour values.
    #[error("timestep {timestep} is not valid; choose from {allowed:?}")]
    InvalidTimestep { timestep: u32, allowed: &'static [u32] },

    /// The number of values is outside the bounds implied by timestep and leap flag.
    #[error(
        "schedule values must be between {min} and {max} for timestep {timestep} \
         (leap year: {leap_year}); got {got}"
    )]
    ValueCount {
        min: usize,
        max: usize,
        timestep: u32,
        leap_year: bool,
        got: usize,
    },

    /// A coarsening conversion whose native timestep is not a multiple of the target.
    #[error("schedule timestep {native} cannot be converted to timestep {target}")]
    TimestepConversion { native: u32, target: u32 },

    /// Explicit averaging weights do not sum to one.
    #[error("averaging weights must sum to 1; got {0}")]
    WeightSum(f64),

    /// Inputs to an operation disagree on the leap-year flag.
    #[error("all schedules must share the same leap-year setting")]
    LeapYearMismatch,

    /// An identifier could not be resolved against the supplied lookup.
    #[error("no {kind} named \"{identifier}\" was found")]
    MissingReference { kind: &'static str, identifier: String },

    /// Malformed text in a dict, IDF, or CSV source.
    #[error("parse error: {0}")]
    Parse(String),

    /// A mutator was called on a locked object.
    #[error("\"{0}\" is locked and cannot be modified")]
    Locked(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ScheduleError>;

/// Validates an identifier against the simulation-engine naming rules.
///
/// Identifiers must be non-empty, shorter than 100 characters, and free of
/// the characters `,` `;` `!` newline and tab.
///
/// # Errors
///
/// Returns [`ScheduleError::Validation`] naming the offending input.
pub fn valid_identifier(value: &str, what: &str) -> Result<String> {
    if value.is_empty() {
        return Err(ScheduleError::Validation(format!("{what} must not be empty")));
    }
    if value.chars().count() >= 100 {
        return Err(ScheduleError::Validation(format!(
            "{what} \"{value}\" must be less than 100 characters"
        )));
    }
    if let Some(c) = value.chars().find(|c| matches!(c, ',' | ';' | '!' | '\n' | '\t')) {
        return Err(ScheduleError::Validation(format!(
            "{what} \"{}\" contains the illegal character {c:?}",
            value.escape_debug()
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifier_rules() {
        assert!(valid_identifier("Office Occupancy", "schedule identifier").is_ok());
        assert!(valid_identifier("", "schedule identifier").is_err());
        assert!(valid_identifier("a,b", "schedule identifier").is_err());
        assert!(valid_identifier("a;b", "schedule identifier").is_err());
        assert!(valid_identifier("bang!", "schedule identifier").is_err());
        assert!(valid_identifier(&"x".repeat(99), "id").is_ok());
        assert!(valid_identifier(&"x".repeat(100), "id").is_err());
    }

    #[test]
    fn value_count_message_reports_bounds() {
        let e = ScheduleError::ValueCount {
            min: 24,
            max: 8760,
            timestep: 1,
            leap_year: false,
            got: 10,
        };
        let msg = e.to_string();
        assert!(msg.contains("24") && msg.contains("8760") && msg.contains("10"));
    }
}
