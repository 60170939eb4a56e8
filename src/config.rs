//! TOML-based schedule library configuration.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::valid_identifier;
use crate::schedule::{NumericType, ScheduleTypeLimit, UnitType};

/// Top-level library configuration parsed from TOML.
///
/// Every field has a default, so an empty file is a valid configuration.
/// Load with [`LibraryConfig::from_toml_file`] and check with
/// [`LibraryConfig::validate`] before building a library from it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LibraryConfig {
    /// Directory that Schedule:File CSVs are written to.
    pub schedule_directory: PathBuf,
    /// Whether the standard type limits are registered.
    pub include_defaults: bool,
    /// Additional type limits, one `[[type_limits]]` table each.
    pub type_limits: Vec<TypeLimitConfig>,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            schedule_directory: PathBuf::from("schedules"),
            include_defaults: true,
            type_limits: Vec::new(),
        }
    }
}

/// A user-defined schedule type limit.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TypeLimitConfig {
    pub identifier: String,
    /// Lower bound; omit for no limit.
    pub lower_limit: Option<f64>,
    /// Upper bound; omit for no limit.
    pub upper_limit: Option<f64>,
    /// `"Continuous"` or `"Discrete"`.
    pub numeric_type: String,
    /// One of the unit categories, e.g. `"Temperature"`.
    pub unit_type: String,
}

impl Default for TypeLimitConfig {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            lower_limit: None,
            upper_limit: None,
            numeric_type: "Continuous".to_string(),
            unit_type: "Dimensionless".to_string(),
        }
    }
}

impl TypeLimitConfig {
    /// Builds the type limit this entry describes.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first invalid field.
    pub fn to_type_limit(&self, index: usize) -> Result<ScheduleTypeLimit, ConfigError> {
        let field = |name: &str| format!("type_limits[{index}].{name}");
        let numeric_type: NumericType = self.numeric_type.parse().map_err(|e| ConfigError {
            field: field("numeric_type"),
            message: format!("{e}"),
        })?;
        let unit_type: UnitType = self.unit_type.parse().map_err(|e| ConfigError {
            field: field("unit_type"),
            message: format!("{e}"),
        })?;
        ScheduleTypeLimit::new(
            &self.identifier,
            self.lower_limit,
            self.upper_limit,
            numeric_type,
            unit_type,
        )
        .map_err(|e| ConfigError {
            field: field("identifier"),
            message: e.to_string(),
        })
    }
}

/// A configuration validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"type_limits[0].unit_type"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

impl LibraryConfig {
    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Checks every field and returns all problems found.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.schedule_directory.as_os_str().is_empty() {
            errors.push(ConfigError {
                field: "schedule_directory".to_string(),
                message: "must not be empty".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, tl) in self.type_limits.iter().enumerate() {
            if let Err(e) = valid_identifier(&tl.identifier, "type limit identifier") {
                errors.push(ConfigError {
                    field: format!("type_limits[{i}].identifier"),
                    message: e.to_string(),
                });
            } else if !seen.insert(tl.identifier.as_str()) {
                errors.push(ConfigError {
                    field: format!("type_limits[{i}].identifier"),
                    message: format!("\"{}\" is defined more than once", tl.identifier),
                });
            }
            if let (Some(lo), Some(hi)) = (tl.lower_limit, tl.upper_limit) {
                if lo > hi {
                    errors.push(ConfigError {
                        field: format!("type_limits[{i}].lower_limit"),
                        message: format!("must not exceed upper_limit ({lo} > {hi})"),
                    });
                }
            }
            if tl.numeric_type.parse::<NumericType>().is_err() {
                errors.push(ConfigError {
                    field: format!("type_limits[{i}].numeric_type"),
                    message: format!(
                        "must be \"Continuous\" or \"Discrete\", got \"{}\"",
                        tl.numeric_type
                    ),
                });
            }
            if tl.unit_type.parse::<UnitType>().is_err() {
                errors.push(ConfigError {
                    field: format!("type_limits[{i}].unit_type"),
                    message: format!("unknown unit type \"{}\"", tl.unit_type),
                });
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_valid() {
        let errors = LibraryConfig::default().validate();
        assert!(errors.is_empty(), "default config should be valid: {errors:?}");
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
schedule_directory = "out/schedules"
include_defaults = false

[[type_limits]]
identifier = "Clothing"
lower_limit = 0.0
upper_limit = 4.0
unit_type = "Dimensionless"

[[type_limits]]
identifier = "Setpoint"
numeric_type = "Continuous"
unit_type = "Temperature"
"#;
        let cfg = LibraryConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(cfg.schedule_directory, PathBuf::from("out/schedules"));
        assert!(!cfg.include_defaults);
        assert_eq!(cfg.type_limits.len(), 2);
        assert_eq!(cfg.type_limits[1].lower_limit, None);
        let errors = cfg.validate();
        assert!(errors.is_empty(), "should be valid: {errors:?}");

        let limit = cfg.type_limits[1].to_type_limit(1).unwrap();
        assert_eq!(limit.unit_type(), UnitType::Temperature);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = LibraryConfig::from_toml_str("").expect("empty config should parse");
        assert!(cfg.include_defaults);
        assert_eq!(cfg.schedule_directory, PathBuf::from("schedules"));
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let err = LibraryConfig::from_toml_str("bogus = 1").unwrap_err();
        assert_eq!(err.field, "toml");
        assert!(err.to_string().starts_with("config error: toml"));
    }

    #[test]
    fn validation_catches_bad_type_limits() {
        let toml = r#"
[[type_limits]]
identifier = "Bad, Name"

[[type_limits]]
identifier = "Flipped"
lower_limit = 5.0
upper_limit = 1.0
numeric_type = "Integer"
unit_type = "Furlongs"

[[type_limits]]
identifier = "Flipped"
"#;
        let errors = LibraryConfig::from_toml_str(toml).unwrap().validate();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "type_limits[0].identifier",
                "type_limits[1].lower_limit",
                "type_limits[1].numeric_type",
                "type_limits[1].unit_type",
                "type_limits[2].identifier",
            ]
        );
    }

    #[test]
    fn missing_file_is_reported() {
        let err = LibraryConfig::from_toml_file(Path::new("/nonexistent/library.toml")).unwrap_err();
        assert_eq!(err.field, "config");
    }
}
