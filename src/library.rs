//! Registry of shared type limits and published schedules.
//!
//! Schedules reference type limits by identifier in their abridged
//! dictionaries, so the library is what turns those names back into shared
//! objects. Registered schedules are locked and handed out as `Arc`s.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::config::{ConfigError, LibraryConfig};
use crate::error::{Result, ScheduleError};
use crate::schedule::{NumericType, Schedule, ScheduleTypeLimit, TypeLimitLookup, UnitType};

type StandardLimit = (&'static str, Option<f64>, Option<f64>, NumericType, UnitType);

const STANDARD_TYPE_LIMITS: [StandardLimit; 8] = [
    ("Fractional", Some(0.0), Some(1.0), NumericType::Continuous, UnitType::Dimensionless),
    ("On-Off", Some(0.0), Some(1.0), NumericType::Discrete, UnitType::Control),
    ("Temperature", Some(-273.15), None, NumericType::Continuous, UnitType::Temperature),
    ("Activity Level", Some(0.0), None, NumericType::Continuous, UnitType::ActivityLevel),
    ("Power", None, None, NumericType::Continuous, UnitType::Power),
    ("Humidity", Some(0.0), Some(100.0), NumericType::Continuous, UnitType::Percent),
    ("Angle", Some(0.0), Some(180.0), NumericType::Continuous, UnitType::Angle),
    ("Delta Temperature", None, None, NumericType::Continuous, UnitType::DeltaTemperature),
];

/// Type limits and schedules keyed by identifier.
#[derive(Debug, Clone, Default)]
pub struct ScheduleLibrary {
    type_limits: TypeLimitLookup,
    schedules: BTreeMap<String, Arc<Schedule>>,
}

impl ScheduleLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// A library holding the standard type limits.
    pub fn with_defaults() -> Self {
        let mut library = Self::new();
        for (id, lower, upper, numeric_type, unit_type) in STANDARD_TYPE_LIMITS {
            // The standard table only holds valid limits.
            if let Ok(limit) = ScheduleTypeLimit::new(id, lower, upper, numeric_type, unit_type) {
                library.type_limits.insert(id.to_string(), Arc::new(limit));
            }
        }
        library
    }

    /// Builds a library from a validated configuration.
    ///
    /// Configured type limits replace standard ones with the same identifier.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` from an invalid type limit entry.
    pub fn from_config(config: &LibraryConfig) -> std::result::Result<Self, ConfigError> {
        let mut library = if config.include_defaults {
            Self::with_defaults()
        } else {
            Self::new()
        };
        for (i, entry) in config.type_limits.iter().enumerate() {
            library.add_type_limit(entry.to_type_limit(i)?);
        }
        info!(
            type_limits = library.type_limits.len(),
            include_defaults = config.include_defaults,
            "schedule library loaded"
        );
        Ok(library)
    }

    /// Registers a type limit, replacing any with the same identifier.
    pub fn add_type_limit(&mut self, limit: ScheduleTypeLimit) -> Arc<ScheduleTypeLimit> {
        let limit = Arc::new(limit);
        if self
            .type_limits
            .insert(limit.identifier().to_string(), Arc::clone(&limit))
            .is_some()
        {
            debug!(type_limit = limit.identifier(), "replaced type limit");
        }
        limit
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingReference`] for an unknown identifier.
    pub fn type_limit(&self, identifier: &str) -> Result<Arc<ScheduleTypeLimit>> {
        self.type_limits
            .get(identifier)
            .cloned()
            .ok_or_else(|| ScheduleError::MissingReference {
                kind: "schedule type limit",
                identifier: identifier.to_string(),
            })
    }

    /// Lookup table for abridged dictionaries.
    pub fn type_limits(&self) -> &TypeLimitLookup {
        &self.type_limits
    }

    /// Locks `schedule` and publishes it.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if a schedule with the same
    /// identifier is already registered.
    pub fn add_schedule(&mut self, mut schedule: Schedule) -> Result<Arc<Schedule>> {
        let id = schedule.identifier().to_string();
        if self.schedules.contains_key(&id) {
            return Err(ScheduleError::Validation(format!(
                "a schedule named \"{id}\" is already in the library"
            )));
        }
        schedule.lock();
        let schedule = Arc::new(schedule);
        self.schedules.insert(id, Arc::clone(&schedule));
        Ok(schedule)
    }

    /// Parses a schedule dictionary against this library's type limits and
    /// registers it.
    ///
    /// # Errors
    ///
    /// Any [`Schedule::from_value`] or [`ScheduleLibrary::add_schedule`] error.
    pub fn load_schedule(&mut self, value: &Value) -> Result<Arc<Schedule>> {
        let schedule = Schedule::from_value(value, &self.type_limits)?;
        self.add_schedule(schedule)
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingReference`] for an unknown identifier.
    pub fn schedule(&self, identifier: &str) -> Result<Arc<Schedule>> {
        self.schedules
            .get(identifier)
            .cloned()
            .ok_or_else(|| ScheduleError::MissingReference {
                kind: "schedule",
                identifier: identifier.to_string(),
            })
    }

    /// Registered schedules in identifier order.
    pub fn schedules(&self) -> impl Iterator<Item = &Arc<Schedule>> {
        self.schedules.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypeLimitConfig;
    use crate::schedule::ScheduleRuleset;

    #[test]
    fn defaults_hold_standard_limits() {
        let lib = ScheduleLibrary::with_defaults();
        assert_eq!(lib.type_limits().len(), 8);
        let temp = lib.type_limit("Temperature").unwrap();
        assert_eq!(temp.lower_limit(), Some(-273.15));
        assert_eq!(temp.upper_limit(), None);
        let on_off = lib.type_limit("On-Off").unwrap();
        assert_eq!(on_off.numeric_type(), NumericType::Discrete);
        assert!(matches!(
            lib.type_limit("Speed"),
            Err(ScheduleError::MissingReference { kind: "schedule type limit", .. })
        ));
    }

    #[test]
    fn config_limits_override_defaults() {
        let config = LibraryConfig {
            type_limits: vec![TypeLimitConfig {
                identifier: "Fractional".to_string(),
                lower_limit: Some(0.0),
                upper_limit: Some(2.0),
                ..TypeLimitConfig::default()
            }],
            ..LibraryConfig::default()
        };
        let lib = ScheduleLibrary::from_config(&config).unwrap();
        assert_eq!(lib.type_limits().len(), 8);
        assert_eq!(lib.type_limit("Fractional").unwrap().upper_limit(), Some(2.0));

        let bare = LibraryConfig {
            include_defaults: false,
            ..config
        };
        assert_eq!(ScheduleLibrary::from_config(&bare).unwrap().type_limits().len(), 1);
    }

    #[test]
    fn registered_schedules_are_locked_and_shared() {
        let mut lib = ScheduleLibrary::with_defaults();
        let sched = ScheduleRuleset::from_constant_value("Always On", 1.0, None).unwrap();
        let shared = lib.add_schedule(Schedule::Ruleset(sched.clone())).unwrap();
        assert!(shared.is_locked());
        assert!(Arc::ptr_eq(&shared, &lib.schedule("Always On").unwrap()));
        assert!(lib.add_schedule(Schedule::Ruleset(sched)).is_err());
        assert!(matches!(
            lib.schedule("Always Off"),
            Err(ScheduleError::MissingReference { kind: "schedule", .. })
        ));
    }

    #[test]
    fn load_resolves_abridged_type_limits() {
        let mut lib = ScheduleLibrary::with_defaults();
        let value = serde_json::json!({
            "type": "ScheduleFixedIntervalAbridged",
            "identifier": "Occupancy",
            "values": vec![0.5; 24],
            "schedule_type_limit": "Fractional",
        });
        let sched = lib.load_schedule(&value).unwrap();
        let limit = sched.as_yearly().schedule_type_limit().unwrap();
        assert!(Arc::ptr_eq(limit, &lib.type_limit("Fractional").unwrap()));
    }
}
