//! Single-day schedule profiles made of values that take effect at given times.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dt::Time;
use crate::error::{Result, ScheduleError, valid_identifier};
use crate::io::idf::{generate_idf_string, parse_idf_string};
use crate::schedule::typelimit::ScheduleTypeLimit;
use crate::schedule::validate_timestep;

/// Dictionary form of a [`ScheduleDay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleDayDict {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times: Option<Vec<Time>>,
    #[serde(default)]
    pub interpolate: bool,
}

/// A day of values, each applied from its start time until the next one.
///
/// The first time is always 0:00 and times stay in chronological order.
/// Equality ignores the display name and the lock flag.
#[derive(Debug, Clone)]
pub struct ScheduleDay {
    identifier: String,
    display_name: Option<String>,
    values: Vec<f64>,
    times: Vec<Time>,
    interpolate: bool,
    locked: bool,
}

impl ScheduleDay {
    /// Creates a day schedule. `times` defaults to a single 0:00 entry.
    ///
    /// Unordered times are sorted together with their values.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if the values and times differ
    /// in length, there are no values, a value is not finite, two times
    /// coincide, or the earliest time is not 0:00.
    ///
    /// # Examples
    ///
    /// ```
    /// use energy_schedules::dt::Time;
    /// use energy_schedules::schedule::ScheduleDay;
    ///
    /// let times = vec![Time::MIDNIGHT, Time::new(9, 0).unwrap(), Time::new(17, 0).unwrap()];
    /// let occ = ScheduleDay::new("Office Occupancy", vec![0.0, 1.0, 0.0], Some(times), false).unwrap();
    /// let hourly = occ.values_at_timestep(1).unwrap();
    /// assert_eq!(hourly[8], 0.0);
    /// assert_eq!(hourly[9], 1.0);
    /// ```
    pub fn new(
        identifier: &str,
        values: Vec<f64>,
        times: Option<Vec<Time>>,
        interpolate: bool,
    ) -> Result<Self> {
        let identifier = valid_identifier(identifier, "schedule day identifier")?;
        let times = times.unwrap_or_else(|| vec![Time::MIDNIGHT]);
        let (values, times) = check_values_and_times(values, times)?;
        Ok(Self {
            identifier,
            display_name: None,
            values,
            times,
            interpolate,
            locked: false,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn interpolate(&self) -> bool {
        self.interpolate
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether the day holds a single value.
    pub fn is_constant(&self) -> bool {
        self.values.len() == 1
    }

    pub fn is_locked(&self) -> bool {
        self.locked
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
    /// Fails if locked or the identifier is invalid.
    pub fn set_identifier(&mut self, identifier: &str) -> Result<()> {
        self.check_unlocked()?;
        self.identifier = valid_identifier(identifier, "schedule day identifier")?;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if locked.
    pub fn set_display_name(&mut self, name: impl Into<String>) -> Result<()> {
        self.check_unlocked()?;
        self.display_name = Some(name.into());
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if locked.
    pub fn set_interpolate(&mut self, interpolate: bool) -> Result<()> {
        self.check_unlocked()?;
        self.interpolate = interpolate;
        Ok(())
    }

    /// Replaces values and times together.
    ///
    /// # Errors
    ///
    /// Fails if locked or the pair is invalid (see [`ScheduleDay::new`]).
    pub fn set_values_and_times(&mut self, values: Vec<f64>, times: Vec<Time>) -> Result<()> {
        self.check_unlocked()?;
        let (values, times) = check_values_and_times(values, times)?;
        self.values = values;
        self.times = times;
        Ok(())
    }

    /// Adds a value taking effect at `time`.
    ///
    /// # Errors
    ///
    /// Fails if locked, the value is not finite, or `time` is already used.
    pub fn add_value(&mut self, value: f64, time: Time) -> Result<()> {
        self.check_unlocked()?;
        check_value(value)?;
        let pos = match self.times.binary_search(&time) {
            Ok(_) => {
                return Err(ScheduleError::Validation(format!(
                    "schedule day \"{}\" already has a value at {time}",
                    self.identifier
                )));
            }
            Err(pos) => pos,
        };
        self.times.insert(pos, time);
        self.values.insert(pos, value);
        Ok(())
    }

    /// Removes the value at `index`. The 0:00 value cannot be removed.
    ///
    /// # Errors
    ///
    /// Fails if locked, `index` is 0 or out of range.
    pub fn remove_value(&mut self, index: usize) -> Result<()> {
        self.check_unlocked()?;
        if index == 0 || index >= self.values.len() {
            return Err(ScheduleError::Validation(format!(
                "cannot remove value {index} from schedule day \"{}\" with {} values",
                self.identifier,
                self.values.len()
            )));
        }
        self.values.remove(index);
        self.times.remove(index);
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if no value starts at `time` or removal is not allowed.
    pub fn remove_value_by_time(&mut self, time: Time) -> Result<()> {
        let index = self.index_of(time)?;
        self.remove_value(index)
    }

    /// # Errors
    ///
    /// Fails if locked, `index` is out of range, or the value is not finite.
    pub fn replace_value(&mut self, index: usize, value: f64) -> Result<()> {
        self.check_unlocked()?;
        check_value(value)?;
        let slot = self.values.get_mut(index).ok_or_else(|| {
            ScheduleError::Validation(format!("schedule day value index {index} is out of range"))
        })?;
        *slot = value;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if no value starts at `time` or replacement is not allowed.
    pub fn replace_value_by_time(&mut self, time: Time, value: f64) -> Result<()> {
        let index = self.index_of(time)?;
        self.replace_value(index, value)
    }

    fn index_of(&self, time: Time) -> Result<usize> {
        self.times.binary_search(&time).map_err(|_| {
            ScheduleError::Validation(format!(
                "schedule day \"{}\" has no value at {time}",
                self.identifier
            ))
        })
    }

    /// Minute of the day at which the value at `index - 1` stops applying.
    fn until_mod(&self, index: usize) -> u32 {
        self.times.get(index).map_or(1440, Time::mod_)
    }

    /// The day's values at `timestep`, one per step starting at 0:00.
    ///
    /// Without interpolation each step holds the value in effect at its
    /// start. With interpolation values ramp linearly from one change time
    /// to the next, and the sequence ends on the last value.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimestep`] for an unknown timestep.
    pub fn values_at_timestep(&self, timestep: u32) -> Result<Vec<f64>> {
        let timestep = validate_timestep(timestep)?;
        let steps = 24 * timestep as usize;
        let minute_delta = 60 / timestep;
        let mut values = Vec::with_capacity(steps + 1);
        let mut mod_ = 0;
        let mut index = 1;
        let mut until = self.until_mod(index);

        if !self.interpolate {
            for _ in 0..steps {
                while mod_ >= until {
                    index += 1;
                    until = self.until_mod(index);
                }
                values.push(self.values[index - 1]);
                mod_ += minute_delta;
            }
            return Ok(values);
        }

        let mut i = 0.0;
        let mut delta = 0.0;
        let mut n_steps = 1.0;
        for _ in 0..steps {
            if mod_ >= until {
                i = 0.0;
                delta = self.values[index] - self.values[index - 1];
                until = self.until_mod(index + 1);
                n_steps = (until - self.times[index].mod_()) as f64 / minute_delta as f64;
                values.push(self.values[index - 1]);
                index += 1;
            } else if index == 1 {
                values.push(self.values[0]);
            } else {
                i += 1.0;
                values.push(self.values[index - 2] + (i / n_steps) * delta);
            }
            mod_ += minute_delta;
        }
        values.remove(0);
        values.push(self.values[self.values.len() - 1]);
        Ok(values)
    }

    /// Builds a day schedule from one value per step.
    ///
    /// With `remove_repeated`, consecutive equal values collapse into one
    /// entry, giving a compact schedule.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid timestep or if `values` does not hold
    /// exactly `24 * timestep` numbers.
    pub fn from_values_at_timestep(
        identifier: &str,
        values: &[f64],
        timestep: u32,
        remove_repeated: bool,
    ) -> Result<Self> {
        let timestep = validate_timestep(timestep)?;
        let n_vals = 24 * timestep as usize;
        if values.len() != n_vals {
            return Err(ScheduleError::Validation(format!(
                "there must be {n_vals} schedule day values when the timestep is {timestep}; got {}",
                values.len()
            )));
        }
        let minute_delta = 60 / timestep;
        let mut sched_values = vec![values[0]];
        let mut sched_times = vec![Time::MIDNIGHT];
        for (i, &v) in values.iter().enumerate().skip(1) {
            if remove_repeated && sched_values.last() == Some(&v) {
                continue;
            }
            sched_times.push(Time::from_mod(i as u32 * minute_delta)?);
            sched_values.push(v);
        }
        Self::new(identifier, sched_values, Some(sched_times), false)
    }

    /// A copy with values rotated by `step_count` steps of `timestep`.
    ///
    /// Positive counts shift values later in the day. The new identifier is
    /// `<identifier>_Shift_<minutes>mins`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::InvalidTimestep`] for an unknown timestep.
    pub fn shift_by_step(&self, step_count: i32, timestep: u32) -> Result<Self> {
        let mut values = self.values_at_timestep(timestep)?;
        let n = values.len() as i64;
        values.rotate_right((step_count as i64).rem_euclid(n) as usize);
        let minutes = (60 / timestep) as i64 * step_count as i64;
        let new_id = format!("{}_Shift_{minutes}mins", self.identifier);
        Self::from_values_at_timestep(&new_id, &values, timestep, true)
    }

    /// Weighted average of several day schedules at `timestep_resolution`.
    ///
    /// # Errors
    ///
    /// Fails for an empty input, a weight count mismatch, weights that do
    /// not sum to 1, or an invalid timestep.
    pub fn average_schedules(
        identifier: &str,
        schedules: &[&ScheduleDay],
        weights: Option<&[f64]>,
        timestep_resolution: u32,
    ) -> Result<Self> {
        if schedules.is_empty() {
            return Err(ScheduleError::Validation(
                "average_schedules needs at least one schedule day".to_string(),
            ));
        }
        let weights = match weights {
            None => vec![1.0 / schedules.len() as f64; schedules.len()],
            Some(w) if w.len() != schedules.len() => {
                return Err(ScheduleError::Validation(format!(
                    "expected {} averaging weights; got {}",
                    schedules.len(),
                    w.len()
                )));
            }
            Some(w) => {
                let total: f64 = w.iter().sum();
                if (total - 1.0).abs() > 1e-9 {
                    return Err(ScheduleError::WeightSum(total));
                }
                w.to_vec()
            }
        };
        let mut totals = vec![0.0; 24 * timestep_resolution as usize];
        for (sched, weight) in schedules.iter().zip(&weights) {
            for (total, v) in totals.iter_mut().zip(sched.values_at_timestep(timestep_resolution)?) {
                *total += v * weight;
            }
        }
        Self::from_values_at_timestep(identifier, &totals, timestep_resolution, true)
    }

    /// An unlocked copy.
    pub fn duplicate(&self) -> Self {
        let mut dup = self.clone();
        dup.locked = false;
        dup
    }

    /// `Schedule:Day:Interval` IDF text.
    pub fn to_idf(&self, schedule_type_limit: Option<&ScheduleTypeLimit>) -> String {
        let mut fields = vec![
            self.identifier.clone(),
            schedule_type_limit.map(|t| t.identifier().to_string()).unwrap_or_default(),
            if self.interpolate { "Linear" } else { "No" }.to_string(),
        ];
        let mut comments = vec![
            "schedule name".to_string(),
            "schedule type limits".to_string(),
            "interpolate to timestep".to_string(),
        ];
        for (i, value) in self.values.iter().enumerate() {
            let count = i + 1;
            fields.push(
                self.times
                    .get(count)
                    .map_or_else(|| "24:00".to_string(), Time::to_string),
            );
            comments.push(format!("time {count} {{hh:mm}}"));
            fields.push(value.to_string());
            comments.push(format!("value until time {count}"));
        }
        let comments: Vec<&str> = comments.iter().map(String::as_str).collect();
        generate_idf_string("Schedule:Day:Interval", &fields, Some(&comments))
    }

    /// Reads `Schedule:Day:Interval`, `Schedule:Day:Hourly`, or
    /// `Schedule:Day:List` IDF text.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Parse`] for malformed text.
    pub fn from_idf(idf_string: &str) -> Result<Self> {
        let head = idf_string.trim_start().split(',').next().unwrap_or("").trim();
        if head.eq_ignore_ascii_case("Schedule:Day:Hourly") {
            let fields = parse_idf_string(idf_string, None)?;
            let values = parse_numbers(fields.get(2..).unwrap_or_default())?;
            return Self::from_values_at_timestep(field(&fields, 0), &values, 1, true);
        }
        if head.eq_ignore_ascii_case("Schedule:Day:List") {
            let fields = parse_idf_string(idf_string, None)?;
            let interpolate = parse_interpolate(field(&fields, 2));
            let minutes: u32 = field(&fields, 3)
                .parse()
                .map_err(|_| ScheduleError::Parse("invalid Schedule:Day:List minutes per item".to_string()))?;
            if minutes == 0 {
                return Err(ScheduleError::Parse("minutes per item must be positive".to_string()));
            }
            let values = parse_numbers(fields.get(4..).unwrap_or_default())?;
            let mut day = Self::from_values_at_timestep(field(&fields, 0), &values, 60 / minutes, !interpolate)?;
            day.interpolate = interpolate;
            return Ok(day);
        }
        let fields = parse_idf_string(idf_string, Some("Schedule:Day:Interval"))?;
        let interpolate = parse_interpolate(field(&fields, 2));
        let mut times = vec![Time::MIDNIGHT];
        let mut values = Vec::new();
        for pair in fields.get(3..).unwrap_or_default().chunks(2) {
            let [time, value] = pair else {
                return Err(ScheduleError::Parse(
                    "Schedule:Day:Interval times and values must come in pairs".to_string(),
                ));
            };
            values.push(parse_number(value)?);
            if let Some(t) = parse_until_time(time)? {
                times.push(t);
            }
        }
        times.truncate(values.len());
        Self::new(field(&fields, 0), values, Some(times), interpolate)
    }

    /// # Errors
    ///
    /// Returns [`ScheduleError::Parse`] if `kind` is not `ScheduleDay`.
    pub fn from_dict(data: &ScheduleDayDict) -> Result<Self> {
        if data.kind != "ScheduleDay" {
            return Err(ScheduleError::Parse(format!(
                "expected ScheduleDay dictionary; got {}",
                data.kind
            )));
        }
        let mut day = Self::new(&data.identifier, data.values.clone(), data.times.clone(), data.interpolate)?;
        day.display_name = data.display_name.clone();
        Ok(day)
    }

    pub fn to_dict(&self) -> ScheduleDayDict {
        ScheduleDayDict {
            kind: "ScheduleDay".to_string(),
            identifier: self.identifier.clone(),
            display_name: self.display_name.clone(),
            values: self.values.clone(),
            times: Some(self.times.clone()),
            interpolate: self.interpolate,
        }
    }
}

impl PartialEq for ScheduleDay {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
            && self.values == other.values
            && self.times == other.times
            && self.interpolate == other.interpolate
    }
}

impl fmt::Display for ScheduleDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_idf(None))
    }
}

fn check_value(value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ScheduleError::Validation(format!(
            "schedule day values must be finite numbers; got {value}"
        )))
    }
}

fn check_values_and_times(values: Vec<f64>, times: Vec<Time>) -> Result<(Vec<f64>, Vec<Time>)> {
    if values.is_empty() {
        return Err(ScheduleError::Validation(
            "schedule day must include at least one value".to_string(),
        ));
    }
    if values.len() != times.len() {
        return Err(ScheduleError::Validation(format!(
            "length of values must match length of times; {} != {}",
            values.len(),
            times.len()
        )));
    }
    for &v in &values {
        check_value(v)?;
    }
    let mut pairs: Vec<(Time, f64)> = times.into_iter().zip(values).collect();
    pairs.sort_by_key(|(t, _)| *t);
    if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
        return Err(ScheduleError::Validation(
            "schedule day times must not repeat".to_string(),
        ));
    }
    if pairs[0].0 != Time::MIDNIGHT {
        return Err(ScheduleError::Validation(format!(
            "schedule day times must start with 0:00; got {}",
            pairs[0].0
        )));
    }
    Ok(pairs.into_iter().map(|(t, v)| (v, t)).unzip())
}

fn field(fields: &[String], i: usize) -> &str {
    fields.get(i).map(String::as_str).unwrap_or("")
}

fn parse_interpolate(text: &str) -> bool {
    !(text.is_empty() || text.eq_ignore_ascii_case("no"))
}

fn parse_number(text: &str) -> Result<f64> {
    text.trim()
        .parse()
        .map_err(|_| ScheduleError::Parse(format!("\"{text}\" is not a number")))
}

fn parse_numbers(texts: &[String]) -> Result<Vec<f64>> {
    texts.iter().filter(|t| !t.is_empty()).map(|t| parse_number(t)).collect()
}

/// Parses an `H:MM` time; `24:00` marks the end of the day and yields `None`.
fn parse_until_time(text: &str) -> Result<Option<Time>> {
    let bad = || ScheduleError::Parse(format!("\"{text}\" is not a valid time"));
    let text = text.trim().trim_start_matches("Until:").trim();
    let (h, m) = text.split_once(':').ok_or_else(bad)?;
    let hour: u32 = h.trim().parse().map_err(|_| bad())?;
    let minute: u32 = m.trim().parse().map_err(|_| bad())?;
    if hour == 24 && minute == 0 {
        return Ok(None);
    }
    Time::new(hour, minute).map(Some)
}
