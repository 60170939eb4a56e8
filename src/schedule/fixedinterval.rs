//! Fixed-interval schedules: one explicit value per timestep over part or all of a year.
//!
//! Values can be resampled to any other valid timestep and aligned to an
//! arbitrary date window of the year. Schedules whose start date sits late in
//! the year wrap around Dec 31 into January.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dt::{Date, DateTime, days_in_year};
use crate::error::{Result, ScheduleError, valid_identifier};
use crate::io::idf::{clean_idf_file_contents, extract_objects, generate_idf_string, parse_idf_string};
use crate::io::schedule_file::{CsvLayout, export_schedule_csv, read_csv_column};
use crate::schedule::typelimit::{ScheduleTypeLimit, TypeLimitLookup, TypeLimitRef};
use crate::schedule::{YearlyValues, validate_timestep};

/// Steps per hour accepted by the simulation engine.
pub const VALID_TIMESTEPS: [u32; 12] = [1, 2, 3, 4, 5, 6, 10, 12, 15, 20, 30, 60];

const SCHEDULE_FILE_COMMENTS: [&str; 9] = [
    "schedule name",
    "schedule type limits",
    "file name",
    "column number",
    "rows to skip",
    "number of hours of data",
    "column separator",
    "interpolate to timestep",
    "minutes per item",
];

fn one() -> u32 {
    1
}

/// Dictionary form of a [`ScheduleFixedInterval`], full or abridged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFixedIntervalDict {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_type_limit: Option<TypeLimitRef>,
    #[serde(default = "one")]
    pub timestep: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub placeholder_value: f64,
    #[serde(default)]
    pub interpolate: bool,
}

/// A schedule defined by an explicit list of values at a fixed timestep.
///
/// The number of values must cover at least one day and at most one year:
/// `timestep * 24 <= len <= timestep * 8760` (8784 in a leap year). Equality
/// ignores the display name and the lock flag.
#[derive(Debug, Clone)]
pub struct ScheduleFixedInterval {
    identifier: String,
    display_name: Option<String>,
    values: Vec<f64>,
    schedule_type_limit: Option<Arc<ScheduleTypeLimit>>,
    timestep: u32,
    start_date: Date,
    placeholder_value: f64,
    interpolate: bool,
    locked: bool,
}

impl ScheduleFixedInterval {
    /// Creates a fixed-interval schedule.
    ///
    /// The leap-year context of the schedule is taken from `start_date`.
    /// The placeholder value defaults to 0 and interpolation is off.
    ///
    /// # Errors
    ///
    /// * [`ScheduleError::InvalidTimestep`] if `timestep` is not a valid step count.
    /// * [`ScheduleError::ValueCount`] if the number of values is out of bounds.
    /// * [`ScheduleError::Validation`] for a bad identifier or non-finite value.
    ///
    /// # Examples
    ///
    /// ```
    /// use energy_schedules::dt::Date;
    /// use energy_schedules::schedule::ScheduleFixedInterval;
    ///
    /// let values: Vec<f64> = (0..24).map(|h| h as f64 / 23.0).collect();
    /// let sched = ScheduleFixedInterval::new(
    ///     "Solstice Increasing", values, None, 1, Date::new(6, 21, false).unwrap(),
    /// ).unwrap();
    /// assert_eq!(sched.values_at_timestep(1, None, None).unwrap().len(), 8760);
    /// ```
    pub fn new(
        identifier: &str,
        values: Vec<f64>,
        schedule_type_limit: Option<Arc<ScheduleTypeLimit>>,
        timestep: u32,
        start_date: Date,
    ) -> Result<Self> {
        let timestep = validate_timestep(timestep)?;
        let identifier = valid_identifier(identifier, "schedule identifier")?;
        let values = check_values(values, timestep, start_date.leap_year())?;
        Ok(Self {
            identifier,
            display_name: None,
            values,
            schedule_type_limit,
            timestep,
            start_date,
            placeholder_value: 0.0,
            interpolate: false,
            locked: false,
        })
    }

    /// Sets the value used for times the schedule does not cover.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if the value is not finite.
    pub fn with_placeholder_value(mut self, value: f64) -> Result<Self> {
        self.placeholder_value = check_placeholder(value)?;
        Ok(self)
    }

    /// Sets whether refined timesteps interpolate between values.
    pub fn with_interpolate(mut self, interpolate: bool) -> Self {
        self.interpolate = interpolate;
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Display name, falling back to the identifier when unset.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.values.iter()
    }

    pub fn schedule_type_limit(&self) -> Option<&Arc<ScheduleTypeLimit>> {
        self.schedule_type_limit.as_ref()
    }

    pub fn timestep(&self) -> u32 {
        self.timestep
    }

    pub fn start_date(&self) -> Date {
        self.start_date
    }

    pub fn placeholder_value(&self) -> f64 {
        self.placeholder_value
    }

    pub fn interpolate(&self) -> bool {
        self.interpolate
    }

    pub fn is_leap_year(&self) -> bool {
        self.start_date.leap_year()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether every value is identical.
    pub fn is_constant(&self) -> bool {
        self.values.windows(2).all(|w| w[0] == w[1])
    }

    /// Date and time of the last value, wrapped into the schedule's year.
    pub fn end_date_time(&self) -> DateTime {
        let start_moy = (self.start_date.doy() as u64 - 1) * 1440;
        let span = (self.values.len() as u64 - 1) * 60 / self.timestep as u64;
        DateTime::from_moy(start_moy + span, self.is_leap_year())
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    fn check_unlocked(&self) -> Result<()> {
        if self.locked {
            return Err(ScheduleError::Locked(self.identifier.clone()));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the schedule is locked or the identifier is invalid.
    pub fn set_identifier(&mut self, identifier: &str) -> Result<()> {
        self.check_unlocked()?;
        self.identifier = valid_identifier(identifier, "schedule identifier")?;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the schedule is locked.
    pub fn set_display_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.check_unlocked()?;
        self.display_name = Some(name.into());
        Ok(())
    }

    /// Replaces all values, re-checking the length bounds.
    ///
    /// # Errors
    ///
    /// Fails if the schedule is locked or the values are out of bounds.
    pub fn set_values(&mut self, values: Vec<f64>) -> Result<()> {
        self.check_unlocked()?;
        self.values = check_values(values, self.timestep, self.is_leap_year())?;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the schedule is locked.
    pub fn set_schedule_type_limit(&mut self, limit: Option<Arc<ScheduleTypeLimit>>) -> Result<()> {
        self.check_unlocked()?;
        self.schedule_type_limit = limit;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the schedule is locked or the value is not finite.
    pub fn set_placeholder_value(&mut self, value: f64) -> Result<()> {
        self.check_unlocked()?;
        self.placeholder_value = check_placeholder(value)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if the schedule is locked.
    pub fn set_interpolate(&mut self, interpolate: bool) -> Result<()> {
        self.check_unlocked()?;
        self.interpolate = interpolate;
        Ok(())
    }

    /// An unlocked copy of this schedule.
    pub fn duplicate(&self) -> Self {
        let mut dup = self.clone();
        dup.locked = false;
        dup
    }

    /// Schedule values at `timestep` over a window of the year.
    ///
    /// `start_date` defaults to Jan 1 and `end_date` to Dec 31. Dates whose
    /// leap flag differs from the schedule's are re-read in the schedule's
    /// leap context. Positions the schedule does not cover hold the
    /// placeholder value. A schedule that runs past Dec 31 continues at
    /// Jan 1.
    ///
    /// The result always holds `(end.doy - start.doy + 1) * 24 * timestep`
    /// values.
    ///
    /// # Errors
    ///
    /// * [`ScheduleError::InvalidTimestep`] for an unknown target timestep.
    /// * [`ScheduleError::TimestepConversion`] if the timesteps do not divide.
    /// * [`ScheduleError::Validation`] if `start_date` is after `end_date` or a
    ///   date does not exist in the schedule's year.
    pub fn values_at_timestep(
        &self,
        timestep: u32,
        start_date: Option<Date>,
        end_date: Option<Date>,
    ) -> Result<Vec<f64>> {
        let leap = self.is_leap_year();
        let start_date = match start_date {
            Some(d) => d.with_leap_year(leap)?,
            None => Date::jan_1(leap),
        };
        let end_date = match end_date {
            Some(d) => d.with_leap_year(leap)?,
            None => Date::dec_31(leap),
        };
        if start_date > end_date {
            return Err(ScheduleError::Validation(format!(
                "start_date must come before end_date; {start_date} comes after {end_date}"
            )));
        }

        let at_step = self.convert_timestep(timestep)?;
        let steps_per_day = 24 * timestep as usize;
        let year_len = days_in_year(leap) as usize * steps_per_day;
        let sched_start = (self.start_date.doy() as usize - 1) * steps_per_day;
        let window_start = (start_date.doy() as usize - 1) * steps_per_day;
        let count = (end_date.doy() - start_date.doy() + 1) as usize * steps_per_day;
        debug!(
            schedule = %self.identifier,
            timestep,
            %start_date,
            %end_date,
            count,
            "aligning fixed-interval values"
        );

        Ok((0..count)
            .map(|j| {
                let offset = (window_start + j + year_len - sched_start) % year_len;
                at_step.get(offset).copied().unwrap_or(self.placeholder_value)
            })
            .collect())
    }

    /// The stored values resampled to `timestep`, without date alignment.
    fn convert_timestep(&self, timestep: u32) -> Result<Vec<f64>> {
        let target = validate_timestep(timestep)?;
        let native = self.timestep;
        if target == native {
            return Ok(self.values.clone());
        }
        if target < native {
            if native % target != 0 {
                return Err(ScheduleError::TimestepConversion { native, target });
            }
            let ratio = (native / target) as usize;
            return Ok(self.values.iter().step_by(ratio).take(self.values.len() / ratio).copied().collect());
        }
        if target % native != 0 {
            return Err(ScheduleError::TimestepConversion { native, target });
        }
        let ratio = (target / native) as usize;
        let n = self.values.len();
        let mut out = Vec::with_capacity(n * ratio);
        if self.interpolate {
            for (d, &start) in self.values.iter().enumerate() {
                let end = self.values[(d + 1) % n];
                let step = (end - start) / ratio as f64;
                out.extend((0..ratio).map(|i| start + i as f64 * step));
            }
        } else {
            for &v in &self.values {
                out.extend(std::iter::repeat_n(v, ratio));
            }
        }
        Ok(out)
    }

    /// Weighted average of several schedules as a new fixed-interval schedule.
    ///
    /// Without `weights` every schedule counts equally. The result uses the
    /// largest timestep among fixed-interval inputs (1 if there are none),
    /// starts on Jan 1 of their shared leap context, and carries the first
    /// input's type limit.
    ///
    /// # Errors
    ///
    /// * [`ScheduleError::Validation`] for an empty input or mismatched weight count.
    /// * [`ScheduleError::WeightSum`] if weights do not sum to 1 within 1e-9.
    /// * [`ScheduleError::LeapYearMismatch`] if fixed-interval inputs disagree
    ///   on the leap year.
    /// * Any resampling error raised by an input.
    pub fn average_schedules(
        identifier: &str,
        schedules: &[&dyn YearlyValues],
        weights: Option<&[f64]>,
    ) -> Result<Self> {
        let first = schedules.first().ok_or_else(|| {
            ScheduleError::Validation("average_schedules needs at least one schedule".to_string())
        })?;
        let weights = match weights {
            None => vec![1.0 / schedules.len() as f64; schedules.len()],
            Some(w) => {
                if w.len() != schedules.len() {
                    return Err(ScheduleError::Validation(format!(
                        "expected {} averaging weights; got {}",
                        schedules.len(),
                        w.len()
                    )));
                }
                let total: f64 = w.iter().sum();
                if (total - 1.0).abs() > 1e-9 {
                    return Err(ScheduleError::WeightSum(total));
                }
                w.to_vec()
            }
        };

        let timestep = schedules.iter().filter_map(|s| s.native_timestep()).fold(1, u32::max);
        let mut leap_flags = schedules.iter().filter_map(|s| s.native_leap_year());
        let leap = leap_flags.next().unwrap_or(false);
        if leap_flags.any(|lp| lp != leap) {
            return Err(ScheduleError::LeapYearMismatch);
        }
        debug!(identifier, inputs = schedules.len(), timestep, leap, "averaging schedules");

        let mut totals = vec![0.0; days_in_year(leap) as usize * 24 * timestep as usize];
        for (sched, weight) in schedules.iter().zip(&weights) {
            let vals = sched.yearly_values(timestep, leap)?;
            for (total, v) in totals.iter_mut().zip(vals) {
                *total += v * weight;
            }
        }

        Self::new(
            identifier,
            totals,
            first.schedule_type_limit().cloned(),
            timestep,
            Date::jan_1(leap),
        )
    }

    /// Builds a schedule from its full dictionary form.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Parse`] for the wrong `type` tag or an
    /// identifier-only type limit, plus any construction error.
    pub fn from_dict(data: &ScheduleFixedIntervalDict) -> Result<Self> {
        if data.kind != "ScheduleFixedInterval" {
            return Err(ScheduleError::Parse(format!(
                "expected ScheduleFixedInterval dictionary; got {}",
                data.kind
            )));
        }
        if let Some(TypeLimitRef::Identifier(id)) = &data.schedule_type_limit {
            return Err(ScheduleError::Parse(format!(
                "full ScheduleFixedInterval dictionary references type limit \"{id}\" by identifier"
            )));
        }
        Self::build_from_dict(data, None)
    }

    /// Builds a schedule from its abridged dictionary form.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingReference`] if the type limit
    /// identifier is not in `type_limits`, plus any construction error.
    pub fn from_dict_abridged(
        data: &ScheduleFixedIntervalDict,
        type_limits: &TypeLimitLookup,
    ) -> Result<Self> {
        if data.kind != "ScheduleFixedIntervalAbridged" {
            return Err(ScheduleError::Parse(format!(
                "expected ScheduleFixedIntervalAbridged dictionary; got {}",
                data.kind
            )));
        }
        Self::build_from_dict(data, Some(type_limits))
    }

    fn build_from_dict(
        data: &ScheduleFixedIntervalDict,
        type_limits: Option<&TypeLimitLookup>,
    ) -> Result<Self> {
        let limit = data
            .schedule_type_limit
            .as_ref()
            .map(|r| r.resolve(type_limits))
            .transpose()?;
        let start_date = data.start_date.unwrap_or_else(|| Date::jan_1(false));
        let mut sched = Self::new(&data.identifier, data.values.clone(), limit, data.timestep, start_date)?
            .with_interpolate(data.interpolate)
            .with_placeholder_value(data.placeholder_value)?;
        sched.display_name = data.display_name.clone();
        Ok(sched)
    }

    /// Dictionary form; `abridged` references the type limit by identifier.
    pub fn to_dict(&self, abridged: bool) -> ScheduleFixedIntervalDict {
        let kind = if abridged {
            "ScheduleFixedIntervalAbridged"
        } else {
            "ScheduleFixedInterval"
        };
        ScheduleFixedIntervalDict {
            kind: kind.to_string(),
            identifier: self.identifier.clone(),
            display_name: self.display_name.clone(),
            values: self.values.clone(),
            schedule_type_limit: self.schedule_type_limit.as_deref().map(|t| {
                if abridged {
                    TypeLimitRef::identifier(t)
                } else {
                    TypeLimitRef::full(t)
                }
            }),
            timestep: self.timestep,
            start_date: Some(self.start_date),
            placeholder_value: self.placeholder_value,
            interpolate: self.interpolate,
        }
    }

    /// Writes the schedule's year of values to `<directory>/<identifier>.csv`
    /// and returns the `Schedule:File` object that references it.
    ///
    /// With `include_datetimes` the CSV gets a leading date-time column.
    ///
    /// # Errors
    ///
    /// Propagates resampling and file-writing errors.
    pub fn to_idf(&self, directory: &Path, include_datetimes: bool) -> Result<String> {
        let values = self.values_at_timestep(self.timestep, None, None)?;
        let path = csv_path(directory, &self.identifier);
        let datetimes = include_datetimes.then(|| step_datetimes(self.timestep, self.is_leap_year()));
        let layout = CsvLayout { header: None, datetimes: datetimes.as_deref() };
        export_schedule_csv(&[values], &layout, &path)?;

        let column = if include_datetimes { 2 } else { 1 };
        Ok(self.schedule_file_string(&path, column, 0, self.timestep))
    }

    fn schedule_file_string(&self, path: &Path, column: usize, rows_to_skip: usize, timestep: u32) -> String {
        let fields = vec![
            self.identifier.clone(),
            self.schedule_type_limit.as_ref().map(|t| t.identifier().to_string()).unwrap_or_default(),
            path.display().to_string(),
            column.to_string(),
            rows_to_skip.to_string(),
            (days_in_year(self.is_leap_year()) * 24).to_string(),
            "Comma".to_string(),
            if self.interpolate { "Yes" } else { "No" }.to_string(),
            (60 / timestep).to_string(),
        ];
        generate_idf_string("Schedule:File", &fields, Some(&SCHEDULE_FILE_COMMENTS))
    }

    /// Reads a schedule from `Schedule:File` text and the CSV it references.
    ///
    /// # Errors
    ///
    /// Returns parse errors for malformed text or CSV content and I/O errors
    /// if the CSV cannot be read.
    pub fn from_idf(idf_string: &str, schedule_type_limit: Option<Arc<ScheduleTypeLimit>>) -> Result<Self> {
        let fields = parse_idf_string(idf_string, Some("Schedule:File"))?;
        let field = |i: usize| fields.get(i).map(String::as_str).unwrap_or("");
        let parse_usize = |i: usize, default: usize| -> Result<usize> {
            match field(i) {
                "" => Ok(default),
                text => text.parse().map_err(|_| {
                    ScheduleError::Parse(format!("Schedule:File field {} is not an integer: \"{text}\"", i + 1))
                }),
            }
        };
        let timestep = match parse_usize(8, 60)? {
            0 => return Err(ScheduleError::Parse("minutes per item must be positive".to_string())),
            minutes => (60 / minutes) as u32,
        };
        let leap = field(5) != "8760";
        let interpolate = field(7).eq_ignore_ascii_case("yes");
        let column = parse_usize(3, 1)?.max(1) - 1;
        let rows_to_skip = parse_usize(4, 0)?;
        let values = read_csv_column(Path::new(field(2)), column, rows_to_skip)?;
        Ok(Self::new(field(0), values, schedule_type_limit, timestep, Date::jan_1(leap))?.with_interpolate(interpolate))
    }

    /// A self-contained `Schedule:Compact` object holding every value of the year.
    ///
    /// # Errors
    ///
    /// Propagates resampling errors.
    pub fn to_idf_compact(&self) -> Result<String> {
        let values = self.values_at_timestep(self.timestep, None, None)?;
        let steps_per_day = 24 * self.timestep as usize;
        let minutes_per_step = 60 / self.timestep as usize;
        let mut fields = vec![
            self.identifier.clone(),
            self.schedule_type_limit.as_ref().map(|t| t.identifier().to_string()).unwrap_or_default(),
        ];
        for (i, val) in values.iter().enumerate() {
            let step_of_day = i % steps_per_day;
            if step_of_day == 0 {
                let date = Date::from_doy((i / steps_per_day) as u32 + 1, self.is_leap_year())?;
                fields.push(format!("Through: {}/{}", date.month(), date.day()));
                fields.push("For: AllDays".to_string());
            }
            let until = (step_of_day + 1) * minutes_per_step;
            fields.push(format!("Until: {}:{:02}", until / 60, until % 60));
            fields.push(val.to_string());
        }
        Ok(generate_idf_string("Schedule:Compact", &fields, None))
    }

    /// Writes several schedules as columns of one CSV and returns a
    /// `Schedule:File` object for each.
    ///
    /// Values are written at the largest participant timestep under a header
    /// row of identifiers.
    ///
    /// # Errors
    ///
    /// * [`ScheduleError::LeapYearMismatch`] if the leap flags differ.
    /// * Resampling and file-writing errors.
    pub fn to_idf_collective_csv(
        schedules: &[&ScheduleFixedInterval],
        directory: &Path,
        file_name: &str,
        include_datetimes: bool,
    ) -> Result<Vec<String>> {
        let Some(first) = schedules.first() else {
            return Ok(Vec::new());
        };
        let leap = first.is_leap_year();
        if schedules.iter().any(|s| s.is_leap_year() != leap) {
            return Err(ScheduleError::LeapYearMismatch);
        }
        let timestep = schedules.iter().map(|s| s.timestep).max().unwrap_or(1);
        let columns = schedules
            .iter()
            .map(|s| s.values_at_timestep(timestep, None, None))
            .collect::<Result<Vec<_>>>()?;
        let header: Vec<String> = schedules.iter().map(|s| s.identifier.clone()).collect();
        let datetimes = include_datetimes.then(|| step_datetimes(timestep, leap));
        let layout = CsvLayout { header: Some(&header), datetimes: datetimes.as_deref() };
        let path = csv_path(directory, file_name);
        export_schedule_csv(&columns, &layout, &path)?;

        let first_column = if include_datetimes { 2 } else { 1 };
        Ok(schedules
            .iter()
            .enumerate()
            .map(|(i, s)| s.schedule_file_string(&path, first_column + i, 1, timestep))
            .collect())
    }

    /// Reads every `Schedule:File` object of an IDF file, resolving type
    /// limits from the `ScheduleTypeLimits` objects in the same file.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::MissingReference`] for a type limit that the
    /// file does not define, plus any parse or I/O error.
    pub fn extract_all_from_idf_file(path: &Path) -> Result<Vec<Self>> {
        let contents = clean_idf_file_contents(path)?;
        let mut type_limits = TypeLimitLookup::new();
        for text in extract_objects(&contents, "ScheduleTypeLimits") {
            let limit = ScheduleTypeLimit::from_idf(&text)?;
            type_limits.insert(limit.identifier().to_string(), Arc::new(limit));
        }
        extract_objects(&contents, "Schedule:File")
            .iter()
            .map(|text| {
                let fields = parse_idf_string(text, None)?;
                let limit = match fields.get(1).map(String::as_str) {
                    None | Some("") => None,
                    Some(id) => Some(TypeLimitRef::Identifier(id.to_string()).resolve(Some(&type_limits))?),
                };
                Self::from_idf(text, limit)
            })
            .collect()
    }
}

fn check_values(values: Vec<f64>, timestep: u32, leap_year: bool) -> Result<Vec<f64>> {
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(ScheduleError::Validation(format!(
            "schedule values must be finite numbers; got {bad}"
        )));
    }
    let min = timestep as usize * 24;
    let max = timestep as usize * days_in_year(leap_year) as usize * 24;
    if !(min..=max).contains(&values.len()) {
        return Err(ScheduleError::ValueCount {
            min,
            max,
            timestep,
            leap_year,
            got: values.len(),
        });
    }
    Ok(values)
}

fn check_placeholder(value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(ScheduleError::Validation(format!(
            "placeholder value must be finite; got {value}"
        )));
    }
    Ok(value)
}

fn csv_path(directory: &Path, name: &str) -> PathBuf {
    directory.join(format!("{}.csv", name.replace(' ', "_")))
}

/// Date-time label for the start of every step of the year.
fn step_datetimes(timestep: u32, leap_year: bool) -> Vec<String> {
    let minutes = 60 / timestep as u64;
    let count = days_in_year(leap_year) as u64 * 24 * timestep as u64;
    (0..count).map(|i| DateTime::from_moy(i * minutes, leap_year).to_string()).collect()
}

impl PartialEq for ScheduleFixedInterval {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.values == other.values
            && self.schedule_type_limit.as_deref() == other.schedule_type_limit.as_deref()
            && self.timestep == other.timestep
            && self.start_date == other.start_date
            && self.placeholder_value == other.placeholder_value
            && self.interpolate == other.interpolate
    }
}

impl YearlyValues for ScheduleFixedInterval {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn schedule_type_limit(&self) -> Option<&Arc<ScheduleTypeLimit>> {
        self.schedule_type_limit.as_ref()
    }

    fn native_timestep(&self) -> Option<u32> {
        Some(self.timestep)
    }

    fn native_leap_year(&self) -> Option<bool> {
        Some(self.is_leap_year())
    }

    fn yearly_values(&self, timestep: u32, _leap_year: bool) -> Result<Vec<f64>> {
        self.values_at_timestep(timestep, None, None)
    }
}
