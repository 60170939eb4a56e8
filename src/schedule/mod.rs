//! Schedule data models and the capability they share.
//!
//! Two schedule kinds produce a year of values: [`ScheduleFixedInterval`]
//! stores them explicitly, while [`ScheduleRuleset`] derives them from
//! day-level [`ScheduleDay`] profiles chosen by prioritized [`ScheduleRule`]s.
//! Both implement [`YearlyValues`], which is all that averaging needs.

pub mod day;
pub mod fixedinterval;
pub mod rule;
pub mod ruleset;
pub mod typelimit;

use std::sync::Arc;

use serde_json::Value;

use crate::error::{Result, ScheduleError};

pub use day::{ScheduleDay, ScheduleDayDict};
pub use fixedinterval::{ScheduleFixedInterval, ScheduleFixedIntervalDict, VALID_TIMESTEPS};
pub use rule::{ScheduleRule, ScheduleRuleDict};
pub use ruleset::{ScheduleRuleset, ScheduleRulesetDict};
pub use typelimit::{
    NumericType, ScheduleTypeLimit, ScheduleTypeLimitDict, TypeLimitLookup, TypeLimitRef, UnitType,
};

/// A schedule that can render a full year of values at a requested timestep.
pub trait YearlyValues {
    fn identifier(&self) -> &str;

    fn schedule_type_limit(&self) -> Option<&Arc<ScheduleTypeLimit>>;

    /// Timestep the values are stored at, if the schedule has one.
    fn native_timestep(&self) -> Option<u32> {
        None
    }

    /// Leap-year context fixed by the schedule itself, if any.
    fn native_leap_year(&self) -> Option<bool> {
        None
    }

    /// Every value of the year at `timestep`.
    ///
    /// Schedules with their own leap context ignore `leap_year`.
    ///
    /// # Errors
    ///
    /// Returns resampling errors for timesteps the schedule cannot produce.
    fn yearly_values(&self, timestep: u32, leap_year: bool) -> Result<Vec<f64>>;
}

/// Checks that `timestep` is one of [`VALID_TIMESTEPS`].
///
/// # Errors
///
/// Returns [`ScheduleError::InvalidTimestep`] otherwise.
pub fn validate_timestep(timestep: u32) -> Result<u32> {
    if VALID_TIMESTEPS.contains(&timestep) {
        Ok(timestep)
    } else {
        Err(ScheduleError::InvalidTimestep {
            timestep,
            allowed: &VALID_TIMESTEPS,
        })
    }
}

/// Either kind of yearly schedule, as read from a dictionary.
#[derive(Debug, Clone, PartialEq)]
pub enum Schedule {
    FixedInterval(ScheduleFixedInterval),
    Ruleset(ScheduleRuleset),
}

impl Schedule {
    /// Builds a schedule from a dictionary, dispatching on its `type` tag.
    ///
    /// Abridged dictionaries resolve type limits through `type_limits`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Parse`] for a missing or unknown `type`, JSON
    /// errors for malformed fields, and any construction or lookup error.
    pub fn from_value(value: &Value, type_limits: &TypeLimitLookup) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ScheduleError::Parse("schedule dictionary has no \"type\"".to_string()))?;
        match kind {
            "ScheduleFixedInterval" => {
                let dict: ScheduleFixedIntervalDict = serde_json::from_value(value.clone())?;
                Ok(Self::FixedInterval(ScheduleFixedInterval::from_dict(&dict)?))
            }
            "ScheduleFixedIntervalAbridged" => {
                let dict: ScheduleFixedIntervalDict = serde_json::from_value(value.clone())?;
                Ok(Self::FixedInterval(ScheduleFixedInterval::from_dict_abridged(
                    &dict,
                    type_limits,
                )?))
            }
            "ScheduleRuleset" => {
                let dict: ScheduleRulesetDict = serde_json::from_value(value.clone())?;
                Ok(Self::Ruleset(ScheduleRuleset::from_dict(&dict)?))
            }
            "ScheduleRulesetAbridged" => {
                let dict: ScheduleRulesetDict = serde_json::from_value(value.clone())?;
                Ok(Self::Ruleset(ScheduleRuleset::from_dict_abridged(&dict, type_limits)?))
            }
            other => Err(ScheduleError::Parse(format!("unknown schedule type \"{other}\""))),
        }
    }

    /// Parses JSON text; see [`Schedule::from_value`].
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Json`] for invalid JSON plus any
    /// [`Schedule::from_value`] error.
    pub fn from_json(text: &str, type_limits: &TypeLimitLookup) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value, type_limits)
    }

    /// Dictionary form of the wrapped schedule.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Json`] if serialization fails.
    pub fn to_value(&self, abridged: bool) -> Result<Value> {
        Ok(match self {
            Self::FixedInterval(s) => serde_json::to_value(s.to_dict(abridged))?,
            Self::Ruleset(s) => serde_json::to_value(s.to_dict(abridged))?,
        })
    }

    /// JSON text of the dictionary form.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Json`] if serialization fails.
    pub fn to_json(&self, abridged: bool) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value(abridged)?)?)
    }

    pub fn identifier(&self) -> &str {
        self.as_yearly().identifier()
    }

    /// Locks the wrapped schedule against further edits.
    pub fn lock(&mut self) {
        match self {
            Self::FixedInterval(s) => s.lock(),
            Self::Ruleset(s) => s.lock(),
        }
    }

    pub fn is_locked(&self) -> bool {
        match self {
            Self::FixedInterval(s) => s.is_locked(),
            Self::Ruleset(s) => s.is_locked(),
        }
    }

    /// The wrapped schedule through the shared capability.
    pub fn as_yearly(&self) -> &dyn YearlyValues {
        match self {
            Self::FixedInterval(s) => s,
            Self::Ruleset(s) => s,
        }
    }
}
