//! Schedule type limits: value bounds plus the physical quantity a schedule carries.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError, valid_identifier};
use crate::io::idf::{clean_idf_file_contents, extract_objects, generate_idf_string, parse_idf_string};

const IDF_COMMENTS: [&str; 5] = [
    "name",
    "lower limit value",
    "upper limit value",
    "numeric type",
    "unit type",
];

/// Whether schedule values may be fractional or must be whole numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NumericType {
    #[default]
    Continuous,
    Discrete,
}

impl NumericType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continuous => "Continuous",
            Self::Discrete => "Discrete",
        }
    }
}

impl FromStr for NumericType {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "continuous" => Ok(Self::Continuous),
            "discrete" => Ok(Self::Discrete),
            other => Err(ScheduleError::Validation(format!(
                "\"{other}\" is not an acceptable numeric type; choose Continuous or Discrete"
            ))),
        }
    }
}

/// The unit categories understood by the simulation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UnitType {
    #[default]
    Dimensionless,
    Temperature,
    DeltaTemperature,
    PrecipitationRate,
    Angle,
    ConvectionCoefficient,
    ActivityLevel,
    Velocity,
    Capacity,
    Power,
    Availability,
    Percent,
    Control,
    Mode,
}

impl UnitType {
    pub const ALL: [UnitType; 14] = [
        Self::Dimensionless,
        Self::Temperature,
        Self::DeltaTemperature,
        Self::PrecipitationRate,
        Self::Angle,
        Self::ConvectionCoefficient,
        Self::ActivityLevel,
        Self::Velocity,
        Self::Capacity,
        Self::Power,
        Self::Availability,
        Self::Percent,
        Self::Control,
        Self::Mode,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dimensionless => "Dimensionless",
            Self::Temperature => "Temperature",
            Self::DeltaTemperature => "DeltaTemperature",
            Self::PrecipitationRate => "PrecipitationRate",
            Self::Angle => "Angle",
            Self::ConvectionCoefficient => "ConvectionCoefficient",
            Self::ActivityLevel => "ActivityLevel",
            Self::Velocity => "Velocity",
            Self::Capacity => "Capacity",
            Self::Power => "Power",
            Self::Availability => "Availability",
            Self::Percent => "Percent",
            Self::Control => "Control",
            Self::Mode => "Mode",
        }
    }

    /// Physical quantity and unit attached to values of this category.
    pub fn data_type_and_unit(&self) -> (&'static str, &'static str) {
        match self {
            Self::Dimensionless | Self::Availability | Self::Control | Self::Mode => {
                ("Fraction", "fraction")
            }
            Self::Percent => ("Fraction", "%"),
            Self::Temperature => ("Temperature", "C"),
            Self::DeltaTemperature => ("TemperatureDelta", "dC"),
            Self::PrecipitationRate => ("Distance", "m"),
            Self::Angle => ("Angle", "degrees"),
            Self::ConvectionCoefficient => ("ConvectionCoefficient", "W/m2-K"),
            Self::ActivityLevel => ("ActivityLevel", "W"),
            Self::Velocity => ("Speed", "m/s"),
            Self::Capacity | Self::Power => ("Power", "W"),
        }
    }
}

impl FromStr for UnitType {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        let clean = s.trim();
        if clean.is_empty() {
            return Ok(Self::Dimensionless);
        }
        Self::ALL
            .into_iter()
            .find(|u| u.as_str().eq_ignore_ascii_case(clean))
            .ok_or_else(|| ScheduleError::Validation(format!("unit_type {clean} is not recognized")))
    }
}

/// Serialized form of a single limit: a number or `{"type": "NoLimit"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LimitDict {
    Value(f64),
    NoLimit {
        #[serde(rename = "type")]
        kind: String,
    },
}

impl LimitDict {
    fn no_limit() -> Self {
        Self::NoLimit { kind: "NoLimit".to_string() }
    }

    fn from_limit(limit: Option<f64>) -> Self {
        limit.map_or_else(Self::no_limit, Self::Value)
    }

    fn to_limit(&self) -> Result<Option<f64>> {
        match self {
            Self::Value(v) => Ok(Some(*v)),
            Self::NoLimit { kind } if kind == "NoLimit" => Ok(None),
            Self::NoLimit { kind } => Err(ScheduleError::Parse(format!(
                "expected a number or NoLimit for a type limit bound; got {kind}"
            ))),
        }
    }
}

impl Default for LimitDict {
    fn default() -> Self {
        Self::no_limit()
    }
}

fn continuous() -> String {
    NumericType::Continuous.as_str().to_string()
}

fn dimensionless() -> String {
    UnitType::Dimensionless.as_str().to_string()
}

/// Dictionary form of a [`ScheduleTypeLimit`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleTypeLimitDict {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub lower_limit: LimitDict,
    #[serde(default)]
    pub upper_limit: LimitDict,
    #[serde(default = "continuous")]
    pub numeric_type: String,
    #[serde(default = "dimensionless")]
    pub unit_type: String,
}

/// Type limits keyed by identifier, used to resolve abridged dictionaries.
pub type TypeLimitLookup = HashMap<String, Arc<ScheduleTypeLimit>>;

/// A type limit inside a schedule dictionary: embedded in full, or by identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeLimitRef {
    Full(ScheduleTypeLimitDict),
    Identifier(String),
}

impl TypeLimitRef {
    pub fn full(limit: &ScheduleTypeLimit) -> Self {
        Self::Full(limit.to_dict())
    }

    pub fn identifier(limit: &ScheduleTypeLimit) -> Self {
        Self::Identifier(limit.identifier().to_string())
    }

    /// Turns the reference into a shared type limit.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingReference`] if an identifier is not in
    /// `lookup` (or no lookup was given), and propagates dict validation errors.
    pub fn resolve(&self, lookup: Option<&TypeLimitLookup>) -> Result<Arc<ScheduleTypeLimit>> {
        match self {
            Self::Full(dict) => Ok(Arc::new(ScheduleTypeLimit::from_dict(dict)?)),
            Self::Identifier(id) => lookup
                .and_then(|l| l.get(id))
                .cloned()
                .ok_or_else(|| ScheduleError::MissingReference {
                    kind: "schedule type limit",
                    identifier: id.clone(),
                }),
        }
    }
}

/// Bounds, numeric type, and unit category shared by many schedules.
///
/// Equality ignores the display name.
#[derive(Debug, Clone)]
pub struct ScheduleTypeLimit {
    identifier: String,
    display_name: Option<String>,
    lower_limit: Option<f64>,
    upper_limit: Option<f64>,
    numeric_type: NumericType,
    unit_type: UnitType,
}

impl ScheduleTypeLimit {
    /// Creates a type limit. `None` bounds mean "no limit".
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] for an invalid identifier,
    /// a non-finite bound, or a lower bound above the upper bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use energy_schedules::schedule::{NumericType, ScheduleTypeLimit, UnitType};
    ///
    /// let frac = ScheduleTypeLimit::new(
    ///     "Fractional", Some(0.0), Some(1.0), NumericType::Continuous, UnitType::Dimensionless,
    /// ).unwrap();
    /// assert_eq!(frac.unit(), "fraction");
    /// ```
    pub fn new(
        identifier: &str,
        lower_limit: Option<f64>,
        upper_limit: Option<f64>,
        numeric_type: NumericType,
        unit_type: UnitType,
    ) -> Result<Self> {
        let identifier = valid_identifier(identifier, "schedule type identifier")?;
        for bound in [lower_limit, upper_limit].into_iter().flatten() {
            if !bound.is_finite() {
                return Err(ScheduleError::Validation(format!(
                    "type limit bounds must be finite; got {bound}"
                )));
            }
        }
        if let (Some(lo), Some(hi)) = (lower_limit, upper_limit) {
            if lo > hi {
                return Err(ScheduleError::Validation(format!(
                    "ScheduleTypeLimit lower_limit must be less than upper_limit. {lo} > {hi}"
                )));
            }
        }
        Ok(Self {
            identifier,
            display_name: None,
            lower_limit,
            upper_limit,
            numeric_type,
            unit_type,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Display name, falling back to the identifier when unset.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn set_display_name(&mut self, name: impl Into<String>) {
        self.display_name = Some(name.into());
    }

    pub fn lower_limit(&self) -> Option<f64> {
        self.lower_limit
    }

    pub fn upper_limit(&self) -> Option<f64> {
        self.upper_limit
    }

    pub fn numeric_type(&self) -> NumericType {
        self.numeric_type
    }

    pub fn unit_type(&self) -> UnitType {
        self.unit_type
    }

    /// Name of the physical quantity the values represent.
    pub fn data_type(&self) -> &'static str {
        self.unit_type.data_type_and_unit().0
    }

    /// Unit of the schedule values (e.g. `"C"`, `"W"`).
    pub fn unit(&self) -> &'static str {
        self.unit_type.data_type_and_unit().1
    }

    /// Whether `value` sits inside the bounds.
    pub fn contains(&self, value: f64) -> bool {
        self.lower_limit.is_none_or(|lo| value >= lo) && self.upper_limit.is_none_or(|hi| value <= hi)
    }

    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    /// Parses a `ScheduleTypeLimits` IDF object. Blank bounds mean no limit.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed text and a validation error for
    /// unusable field values.
    pub fn from_idf(idf_string: &str) -> Result<Self> {
        let fields = parse_idf_string(idf_string, Some("ScheduleTypeLimits"))?;
        let field = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");
        let parse_bound = |text: &str| -> Result<Option<f64>> {
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .map(Some)
                .map_err(|_| ScheduleError::Parse(format!("invalid type limit bound \"{text}\"")))
        };
        Self::new(
            field(0),
            parse_bound(field(1))?,
            parse_bound(field(2))?,
            field(3).parse()?,
            field(4).parse()?,
        )
    }

    /// `ScheduleTypeLimits` IDF text for this object.
    pub fn to_idf(&self) -> String {
        let bound = |b: Option<f64>| b.map(|v| v.to_string()).unwrap_or_default();
        let fields = vec![
            self.identifier.clone(),
            bound(self.lower_limit),
            bound(self.upper_limit),
            self.numeric_type.as_str().to_string(),
            self.unit_type.as_str().to_string(),
        ];
        generate_idf_string("ScheduleTypeLimits", &fields, Some(&IDF_COMMENTS))
    }

    /// Reads every `ScheduleTypeLimits` object in an IDF file.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures and the first object that fails to parse.
    pub fn extract_all_from_idf_file(path: &Path) -> Result<Vec<Self>> {
        let contents = clean_idf_file_contents(path)?;
        extract_objects(&contents, "ScheduleTypeLimits")
            .iter()
            .map(|s| Self::from_idf(s))
            .collect()
    }

    /// Builds a type limit from its dictionary form.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Parse`] if `kind` is not `ScheduleTypeLimit`.
    pub fn from_dict(data: &ScheduleTypeLimitDict) -> Result<Self> {
        if data.kind != "ScheduleTypeLimit" {
            return Err(ScheduleError::Parse(format!(
                "expected ScheduleTypeLimit dictionary; got {}",
                data.kind
            )));
        }
        let mut limit = Self::new(
            &data.identifier,
            data.lower_limit.to_limit()?,
            data.upper_limit.to_limit()?,
            data.numeric_type.parse()?,
            data.unit_type.parse()?,
        )?;
        limit.display_name = data.display_name.clone();
        Ok(limit)
    }

    pub fn to_dict(&self) -> ScheduleTypeLimitDict {
        ScheduleTypeLimitDict {
            kind: "ScheduleTypeLimit".to_string(),
            identifier: self.identifier.clone(),
            display_name: self.display_name.clone(),
            lower_limit: LimitDict::from_limit(self.lower_limit),
            upper_limit: LimitDict::from_limit(self.upper_limit),
            numeric_type: self.numeric_type.as_str().to_string(),
            unit_type: self.unit_type.as_str().to_string(),
        }
    }
}

impl PartialEq for ScheduleTypeLimit {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.lower_limit == other.lower_limit
            && self.upper_limit == other.upper_limit
            && self.numeric_type == other.numeric_type
            && self.unit_type == other.unit_type
    }
}

impl fmt::Display for ScheduleTypeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_idf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temperature() -> ScheduleTypeLimit {
        ScheduleTypeLimit::new(
            "Temperature",
            Some(-273.15),
            None,
            NumericType::Continuous,
            UnitType::Temperature,
        )
        .unwrap()
    }

    #[test]
    fn rejects_inverted_limits() {
        let r = ScheduleTypeLimit::new("Bad", Some(2.0), Some(1.0), NumericType::Continuous, UnitType::Power);
        assert!(matches!(r, Err(ScheduleError::Validation(_))));
    }

    #[test]
    fn rejects_bad_identifier() {
        let r = ScheduleTypeLimit::new("a;b", None, None, NumericType::Continuous, UnitType::Power);
        assert!(r.is_err());
    }

    #[test]
    fn unit_type_is_case_insensitive() {
        assert_eq!("activitylevel".parse::<UnitType>().ok(), Some(UnitType::ActivityLevel));
        assert!("Furlongs".parse::<UnitType>().is_err());
        assert_eq!("DISCRETE".parse::<NumericType>().ok(), Some(NumericType::Discrete));
    }

    #[test]
    fn data_type_and_unit() {
        let t = temperature();
        assert_eq!(t.data_type(), "Temperature");
        assert_eq!(t.unit(), "C");
        assert!(t.contains(20.0));
        assert!(!t.contains(-300.0));
    }

    #[test]
    fn idf_round_trip_keeps_no_limit() {
        let t = temperature();
        let idf = t.to_idf();
        let back = ScheduleTypeLimit::from_idf(&idf).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.upper_limit(), None);
    }

    #[test]
    fn dict_round_trip_through_json() {
        let mut t = temperature();
        t.set_display_name("Air Temperature");
        let json = serde_json::to_string(&t.to_dict()).unwrap();
        assert!(json.contains("\"NoLimit\""));
        let dict: ScheduleTypeLimitDict = serde_json::from_str(&json).unwrap();
        let back = ScheduleTypeLimit::from_dict(&dict).unwrap();
        assert_eq!(back, t);
        assert_eq!(back.display_name(), "Air Temperature");
    }

    #[test]
    fn reference_resolution() {
        let t = Arc::new(temperature());
        let mut lookup = TypeLimitLookup::new();
        lookup.insert("Temperature".to_string(), Arc::clone(&t));
        let by_id = TypeLimitRef::identifier(&t).resolve(Some(&lookup)).unwrap();
        assert!(Arc::ptr_eq(&by_id, &t));
        let missing = TypeLimitRef::Identifier("Nope".to_string()).resolve(Some(&lookup));
        assert!(matches!(missing, Err(ScheduleError::MissingReference { .. })));
        let full = TypeLimitRef::full(&t).resolve(None).unwrap();
        assert_eq!(*full, *t);
    }

    #[test]
    fn dict_defaults_fill_missing_fields() {
        let dict: ScheduleTypeLimitDict =
            serde_json::from_str(r#"{"type": "ScheduleTypeLimit", "identifier": "Any"}"#).unwrap();
        let t = ScheduleTypeLimit::from_dict(&dict).unwrap();
        assert_eq!(t.lower_limit(), None);
        assert_eq!(t.unit_type(), UnitType::Dimensionless);
        assert_eq!(t.numeric_type(), NumericType::Continuous);
    }
}
