//! Rule-based yearly schedules built from prioritized day profiles.

use std::collections::HashMap;
use std::sync::Arc;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dt::Date;
use crate::error::{Result, ScheduleError, valid_identifier};
use crate::schedule::day::{ScheduleDay, ScheduleDayDict};
use crate::schedule::rule::{ScheduleDayRef, ScheduleRule, ScheduleRuleDict};
use crate::schedule::typelimit::{ScheduleTypeLimit, TypeLimitLookup, TypeLimitRef};
use crate::schedule::{YearlyValues, validate_timestep};

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
];

/// Dictionary form of a [`ScheduleRuleset`], full or abridged.
///
/// Day schedules are listed once and referenced by identifier elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRulesetDict {
    #[serde(rename = "type")]
    pub kind: String,
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub day_schedules: Vec<ScheduleDayDict>,
    pub default_day_schedule: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_rules: Option<Vec<ScheduleRuleDict>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summer_designday_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winter_designday_schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_type_limit: Option<TypeLimitRef>,
}

/// A yearly schedule: a default day plus rules that override it.
///
/// Rules earlier in the list take priority. Day schedules are shared
/// through `Arc` and never modified in place.
#[derive(Debug, Clone)]
pub struct ScheduleRuleset {
    identifier: String,
    display_name: Option<String>,
    default_day_schedule: Arc<ScheduleDay>,
    schedule_rules: Vec<ScheduleRule>,
    schedule_type_limit: Option<Arc<ScheduleTypeLimit>>,
    holiday_schedule: Option<Arc<ScheduleDay>>,
    summer_designday_schedule: Option<Arc<ScheduleDay>>,
    winter_designday_schedule: Option<Arc<ScheduleDay>>,
    locked: bool,
}

impl ScheduleRuleset {
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] for an invalid identifier.
    pub fn new(
        identifier: &str,
        default_day_schedule: Arc<ScheduleDay>,
        schedule_rules: Vec<ScheduleRule>,
        schedule_type_limit: Option<Arc<ScheduleTypeLimit>>,
    ) -> Result<Self> {
        Ok(Self {
            identifier: valid_identifier(identifier, "schedule identifier")?,
            display_name: None,
            default_day_schedule,
            schedule_rules,
            schedule_type_limit,
            holiday_schedule: None,
            summer_designday_schedule: None,
            winter_designday_schedule: None,
            locked: false,
        })
    }

    /// A ruleset holding one value all year.
    ///
    /// # Errors
    ///
    /// Fails for an invalid identifier or a non-finite value.
    ///
    /// # Examples
    ///
    /// ```
    /// use energy_schedules::schedule::ScheduleRuleset;
    ///
    /// let always_on = ScheduleRuleset::from_constant_value("Always On", 1.0, None).unwrap();
    /// assert!(always_on.is_constant());
    /// assert_eq!(always_on.default_day_schedule().identifier(), "Always On_Day Schedule");
    /// ```
    pub fn from_constant_value(
        identifier: &str,
        value: f64,
        schedule_type_limit: Option<Arc<ScheduleTypeLimit>>,
    ) -> Result<Self> {
        let day = ScheduleDay::new(&format!("{identifier}_Day Schedule"), vec![value], None, false)?;
        Self::new(identifier, Arc::new(day), Vec::new(), schedule_type_limit)
    }

    /// A ruleset repeating one day of `24 * timestep` values.
    ///
    /// # Errors
    ///
    /// Fails for an invalid timestep or value count.
    pub fn from_daily_values(
        identifier: &str,
        daily_values: &[f64],
        timestep: u32,
        schedule_type_limit: Option<Arc<ScheduleTypeLimit>>,
    ) -> Result<Self> {
        let day = ScheduleDay::from_values_at_timestep(
            &format!("{identifier}_Day Schedule"),
            daily_values,
            timestep,
            true,
        )?;
        Self::new(identifier, Arc::new(day), Vec::new(), schedule_type_limit)
    }

    /// A ruleset from one day of values per weekday (Sunday first) plus holidays.
    ///
    /// Identical weekdays share one rule. Without explicit design-day values
    /// the summer design day copies the weekday with the highest mean and the
    /// winter design day the one with the lowest.
    ///
    /// # Errors
    ///
    /// Fails for an invalid timestep or value count.
    pub fn from_week_daily_values(
        identifier: &str,
        week_values: [&[f64]; 7],
        holiday_values: &[f64],
        timestep: u32,
        schedule_type_limit: Option<Arc<ScheduleTypeLimit>>,
        design_day_values: (Option<&[f64]>, Option<&[f64]>),
    ) -> Result<Self> {
        let mut rules: Vec<ScheduleRule> = Vec::new();
        let mut distinct: Vec<&[f64]> = Vec::new();
        for (i, day_vals) in week_values.into_iter().enumerate() {
            let dow = i as u32 + 1;
            match distinct.iter().position(|d| *d == day_vals) {
                Some(pos) => rules[pos].apply_day_by_dow(dow)?,
                None => {
                    let id = format!("{identifier}_{}", WEEKDAY_NAMES[i]);
                    let day = ScheduleDay::from_values_at_timestep(&id, day_vals, timestep, true)?;
                    let mut rule = ScheduleRule::new(Arc::new(day));
                    rule.apply_day_by_dow(dow)?;
                    rules.push(rule);
                    distinct.push(day_vals);
                }
            }
        }

        let holiday = ScheduleDay::from_values_at_timestep(
            &format!("{identifier}_Hol"),
            holiday_values,
            timestep,
            true,
        )?;
        let means: Vec<f64> = distinct
            .iter()
            .map(|v| v.iter().sum::<f64>() / v.len().max(1) as f64)
            .collect();
        let pick = |want_max: bool| {
            let mut best = 0;
            for (i, m) in means.iter().enumerate() {
                if (want_max && *m > means[best]) || (!want_max && *m < means[best]) {
                    best = i;
                }
            }
            best
        };
        let design_day = |values: Option<&[f64]>, suffix: &str, want_max: bool| -> Result<ScheduleDay> {
            match values {
                Some(v) => ScheduleDay::from_values_at_timestep(&format!("{identifier}_{suffix}"), v, timestep, true),
                None => {
                    let mut day = rules[pick(want_max)].schedule_day().duplicate();
                    let id = format!("{}_{suffix}", day.identifier());
                    day.set_identifier(&id)?;
                    Ok(day)
                }
            }
        };
        let summer = design_day(design_day_values.0, "SmrDsn", true)?;
        let winter = design_day(design_day_values.1, "WntrDsn", false)?;

        let default_day = Arc::clone(rules[0].schedule_day());
        let mut ruleset = Self::new(identifier, default_day, rules.split_off(1), schedule_type_limit)?;
        ruleset.holiday_schedule = Some(Arc::new(holiday));
        ruleset.summer_designday_schedule = Some(Arc::new(summer));
        ruleset.winter_designday_schedule = Some(Arc::new(winter));
        Ok(ruleset)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.identifier)
    }

    pub fn default_day_schedule(&self) -> &Arc<ScheduleDay> {
        &self.default_day_schedule
    }

    pub fn schedule_rules(&self) -> &[ScheduleRule] {
        &self.schedule_rules
    }

    pub fn schedule_type_limit(&self) -> Option<&Arc<ScheduleTypeLimit>> {
        self.schedule_type_limit.as_ref()
    }

    pub fn holiday_schedule(&self) -> Option<&Arc<ScheduleDay>> {
        self.holiday_schedule.as_ref()
    }

    pub fn summer_designday_schedule(&self) -> Option<&Arc<ScheduleDay>> {
        self.summer_designday_schedule.as_ref()
    }

    pub fn winter_designday_schedule(&self) -> Option<&Arc<ScheduleDay>> {
        self.winter_designday_schedule.as_ref()
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Every distinct day schedule, default first.
    pub fn day_schedules(&self) -> Vec<&Arc<ScheduleDay>> {
        let mut days = vec![&self.default_day_schedule];
        let extras = [
            self.summer_designday_schedule.as_ref(),
            self.winter_designday_schedule.as_ref(),
            self.holiday_schedule.as_ref(),
        ];
        let candidates = extras
            .into_iter()
            .flatten()
            .chain(self.schedule_rules.iter().map(ScheduleRule::schedule_day));
        for day in candidates {
            if !days.iter().any(|d| Arc::ptr_eq(d, day)) {
                days.push(day);
            }
        }
        days
    }

    /// Whether the ruleset reduces to a single value.
    pub fn is_constant(&self) -> bool {
        self.default_day_schedule.is_constant()
            && self.schedule_rules.is_empty()
            && self.holiday_schedule.is_none()
            && self.summer_designday_schedule.is_none()
            && self.winter_designday_schedule.is_none()
    }

    /// Whether a single week describes the whole year.
    pub fn is_single_week(&self) -> bool {
        self.schedule_rules
            .iter()
            .all(|r| r.start_doy() == 1 && r.end_doy() == 365)
    }

    /// Locks the ruleset and its rules.
    pub fn lock(&mut self) {
        self.locked = true;
        for rule in &mut self.schedule_rules {
            rule.lock();
        }
    }

    pub fn unlock(&mut self) {
        self.locked = false;
        for rule in &mut self.schedule_rules {
            rule.unlock();
        }
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
        self.identifier = valid_identifier(identifier, "schedule identifier")?;
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
    pub fn set_default_day_schedule(&mut self, day: Arc<ScheduleDay>) -> Result<()> {
        self.check_unlocked()?;
        self.default_day_schedule = day;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if locked.
    pub fn set_schedule_type_limit(&mut self, limit: Option<Arc<ScheduleTypeLimit>>) -> Result<()> {
        self.check_unlocked()?;
        self.schedule_type_limit = limit;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if locked.
    pub fn set_holiday_schedule(&mut self, day: Option<Arc<ScheduleDay>>) -> Result<()> {
        self.check_unlocked()?;
        self.holiday_schedule = day;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if locked.
    pub fn set_summer_designday_schedule(&mut self, day: Option<Arc<ScheduleDay>>) -> Result<()> {
        self.check_unlocked()?;
        self.summer_designday_schedule = day;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if locked.
    pub fn set_winter_designday_schedule(&mut self, day: Option<Arc<ScheduleDay>>) -> Result<()> {
        self.check_unlocked()?;
        self.winter_designday_schedule = day;
        Ok(())
    }

    /// Adds a rule at the highest priority.
    ///
    /// # Errors
    ///
    /// Fails if locked.
    pub fn add_rule(&mut self, rule: ScheduleRule) -> Result<()> {
        self.check_unlocked()?;
        self.schedule_rules.insert(0, rule);
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if locked or `index` is out of range.
    pub fn remove_rule(&mut self, index: usize) -> Result<ScheduleRule> {
        self.check_unlocked()?;
        self.check_rule_index(index)?;
        Ok(self.schedule_rules.remove(index))
    }

    /// Moves the rule at `index` to `new_index` in the priority list.
    ///
    /// # Errors
    ///
    /// Fails if locked or either index is out of range.
    pub fn reorder_rule(&mut self, index: usize, new_index: usize) -> Result<()> {
        self.check_unlocked()?;
        self.check_rule_index(index)?;
        self.check_rule_index(new_index)?;
        let rule = self.schedule_rules.remove(index);
        self.schedule_rules.insert(new_index, rule);
        Ok(())
    }

    fn check_rule_index(&self, index: usize) -> Result<()> {
        if index >= self.schedule_rules.len() {
            return Err(ScheduleError::Validation(format!(
                "rule index {index} is out of range for {} rules",
                self.schedule_rules.len()
            )));
        }
        Ok(())
    }

    /// Values from `start_date` through `end_date` at `timestep`.
    ///
    /// `start_dow` is the day of the week of `start_date` (1 = Sunday ...
    /// 7 = Saturday). Days listed in `holidays` use the holiday schedule, or
    /// the default day when there is none. Other days use the first rule
    /// that applies, falling back to the default day.
    ///
    /// # Errors
    ///
    /// Fails for an invalid timestep, `start_dow` outside 1-7, a start date
    /// after the end date, or a Feb 29 date outside a leap year.
    pub fn values(
        &self,
        timestep: u32,
        start_date: Option<Date>,
        end_date: Option<Date>,
        start_dow: u32,
        holidays: &[Date],
        leap_year: bool,
    ) -> Result<Vec<f64>> {
        let timestep = validate_timestep(timestep)?;
        if !(1..=7).contains(&start_dow) {
            return Err(ScheduleError::Validation(format!(
                "start day of week {start_dow} is out of range; use 1-7"
            )));
        }
        let start_date = start_date.unwrap_or_else(|| Date::jan_1(leap_year)).with_leap_year(leap_year)?;
        let end_date = end_date.unwrap_or_else(|| Date::dec_31(leap_year)).with_leap_year(leap_year)?;
        if start_date > end_date {
            return Err(ScheduleError::Validation(format!(
                "start_date must come before end_date; {start_date} comes after {end_date}"
            )));
        }
        let holiday_doys = holidays
            .iter()
            .map(|d| d.with_leap_year(leap_year).map(|d| d.doy()))
            .collect::<Result<Vec<_>>>()?;

        let rule_values = self
            .schedule_rules
            .iter()
            .map(|r| r.schedule_day().values_at_timestep(timestep))
            .collect::<Result<Vec<_>>>()?;
        let default_values = self.default_day_schedule.values_at_timestep(timestep)?;
        let holiday_values = match &self.holiday_schedule {
            Some(day) if !holidays.is_empty() => day.values_at_timestep(timestep)?,
            _ => default_values.clone(),
        };
        debug!(
            schedule = %self.identifier,
            timestep,
            %start_date,
            %end_date,
            rules = self.schedule_rules.len(),
            "evaluating ruleset"
        );

        let days = (end_date.doy() - start_date.doy() + 1) as usize;
        let mut values = Vec::with_capacity(days * 24 * timestep as usize);
        let mut dow = start_dow;
        for doy in start_date.doy()..=end_date.doy() {
            let day_values = if holiday_doys.contains(&doy) {
                &holiday_values
            } else {
                self.schedule_rules
                    .iter()
                    .position(|r| {
                        if leap_year {
                            r.does_rule_apply_leap_year(doy, Some(dow))
                        } else {
                            r.does_rule_apply(doy, Some(dow))
                        }
                    })
                    .map_or(&default_values, |i| &rule_values[i])
            };
            values.extend_from_slice(day_values);
            dow = dow % 7 + 1;
        }
        Ok(values)
    }

    /// A copy whose day schedules are all rotated by `step_count` steps.
    ///
    /// The new identifier is `<identifier>_Shift_<minutes>mins`.
    ///
    /// # Errors
    ///
    /// Fails for an invalid timestep.
    pub fn shift_by_step(&self, step_count: i32, timestep: u32) -> Result<Self> {
        let mut shifted: Vec<(Arc<ScheduleDay>, Arc<ScheduleDay>)> = Vec::new();
        for day in self.day_schedules() {
            shifted.push((Arc::clone(day), Arc::new(day.shift_by_step(step_count, timestep)?)));
        }
        let lookup = |day: &Arc<ScheduleDay>| {
            shifted
                .iter()
                .find(|(orig, _)| Arc::ptr_eq(orig, day))
                .map(|(_, new)| Arc::clone(new))
                .unwrap_or_else(|| Arc::clone(day))
        };

        let mut rules = Vec::with_capacity(self.schedule_rules.len());
        for rule in &self.schedule_rules {
            let mut new_rule = rule.duplicate();
            new_rule.set_schedule_day(lookup(rule.schedule_day()))?;
            rules.push(new_rule);
        }
        let minutes = (60 / timestep) as i64 * step_count as i64;
        let mut ruleset = Self::new(
            &format!("{}_Shift_{minutes}mins", self.identifier),
            lookup(&self.default_day_schedule),
            rules,
            self.schedule_type_limit.clone(),
        )?;
        ruleset.holiday_schedule = self.holiday_schedule.as_ref().map(&lookup);
        ruleset.summer_designday_schedule = self.summer_designday_schedule.as_ref().map(&lookup);
        ruleset.winter_designday_schedule = self.winter_designday_schedule.as_ref().map(&lookup);
        Ok(ruleset)
    }

    /// Derives `count` variants of this schedule for load diversity.
    ///
    /// Each variant is shifted `schedule_offset` steps behind (index 0),
    /// left as is (index 1), or shifted ahead (index 2). Indices come from
    /// `schedule_indices` when given, otherwise from a random generator
    /// seeded with `seed`.
    ///
    /// # Errors
    ///
    /// Fails for an invalid timestep, an index above 2, or an index list
    /// whose length differs from `count`.
    pub fn diversify(
        &self,
        count: usize,
        schedule_offset: u32,
        timestep: u32,
        schedule_indices: Option<&[usize]>,
        seed: u64,
    ) -> Result<Vec<Self>> {
        let offset = schedule_offset as i32;
        let variants = [
            self.shift_by_step(-offset, timestep)?,
            self.clone(),
            self.shift_by_step(offset, timestep)?,
        ];
        let indices: Vec<usize> = match schedule_indices {
            Some(idx) if idx.len() != count => {
                return Err(ScheduleError::Validation(format!(
                    "expected {count} schedule indices; got {}",
                    idx.len()
                )));
            }
            Some(idx) => idx.to_vec(),
            None => {
                let mut rng = StdRng::seed_from_u64(seed);
                (0..count).map(|_| rng.random_range(0..3)).collect()
            }
        };
        indices
            .into_iter()
            .map(|i| {
                variants.get(i).cloned().ok_or_else(|| {
                    ScheduleError::Validation(format!("schedule index {i} must be 0, 1, or 2"))
                })
            })
            .collect()
    }

    /// An unlocked copy.
    pub fn duplicate(&self) -> Self {
        let mut dup = self.clone();
        dup.unlock();
        dup
    }

    /// # Errors
    ///
    /// Fails for the wrong `type` tag, an identifier-only type limit, a day
    /// reference that is not listed in `day_schedules`, or invalid content.
    pub fn from_dict(data: &ScheduleRulesetDict) -> Result<Self> {
        if data.kind != "ScheduleRuleset" {
            return Err(ScheduleError::Parse(format!(
                "expected ScheduleRuleset dictionary; got {}",
                data.kind
            )));
        }
        if let Some(TypeLimitRef::Identifier(id)) = &data.schedule_type_limit {
            return Err(ScheduleError::Parse(format!(
                "full ScheduleRuleset dictionary references type limit \"{id}\" by identifier"
            )));
        }
        Self::build_from_dict(data, None)
    }

    /// # Errors
    ///
    /// As [`ScheduleRuleset::from_dict`], plus
    /// [`ScheduleError::MissingReference`] for a type limit not in `type_limits`.
    pub fn from_dict_abridged(data: &ScheduleRulesetDict, type_limits: &TypeLimitLookup) -> Result<Self> {
        if data.kind != "ScheduleRulesetAbridged" {
            return Err(ScheduleError::Parse(format!(
                "expected ScheduleRulesetAbridged dictionary; got {}",
                data.kind
            )));
        }
        Self::build_from_dict(data, Some(type_limits))
    }

    fn build_from_dict(data: &ScheduleRulesetDict, type_limits: Option<&TypeLimitLookup>) -> Result<Self> {
        let mut days: HashMap<&str, Arc<ScheduleDay>> = HashMap::new();
        for day in &data.day_schedules {
            days.insert(day.identifier.as_str(), Arc::new(ScheduleDay::from_dict(day)?));
        }
        let get_day = |id: &str| {
            days.get(id).cloned().ok_or_else(|| ScheduleError::MissingReference {
                kind: "schedule day",
                identifier: id.to_string(),
            })
        };

        let mut rules = Vec::new();
        for rule in data.schedule_rules.iter().flatten() {
            let day = match &rule.schedule_day {
                ScheduleDayRef::Identifier(id) => get_day(id.as_str())?,
                ScheduleDayRef::Full(dict) => Arc::new(ScheduleDay::from_dict(dict)?),
            };
            let mut abridged = rule.clone();
            abridged.kind = "ScheduleRuleAbridged".to_string();
            rules.push(ScheduleRule::from_dict_abridged(&abridged, day)?);
        }
        let limit = data
            .schedule_type_limit
            .as_ref()
            .map(|r| r.resolve(type_limits))
            .transpose()?;

        let mut ruleset = Self::new(&data.identifier, get_day(data.default_day_schedule.as_str())?, rules, limit)?;
        ruleset.holiday_schedule = data.holiday_schedule.as_deref().map(&get_day).transpose()?;
        ruleset.summer_designday_schedule =
            data.summer_designday_schedule.as_deref().map(&get_day).transpose()?;
        ruleset.winter_designday_schedule =
            data.winter_designday_schedule.as_deref().map(&get_day).transpose()?;
        ruleset.display_name = data.display_name.clone();
        Ok(ruleset)
    }

    pub fn to_dict(&self, abridged: bool) -> ScheduleRulesetDict {
        let kind = if abridged {
            "ScheduleRulesetAbridged"
        } else {
            "ScheduleRuleset"
        };
        let rules = (!self.schedule_rules.is_empty())
            .then(|| self.schedule_rules.iter().map(|r| r.to_dict(true)).collect());
        let id = |day: &Option<Arc<ScheduleDay>>| day.as_ref().map(|d| d.identifier().to_string());
        ScheduleRulesetDict {
            kind: kind.to_string(),
            identifier: self.identifier.clone(),
            display_name: self.display_name.clone(),
            day_schedules: self.day_schedules().iter().map(|d| d.to_dict()).collect(),
            default_day_schedule: self.default_day_schedule.identifier().to_string(),
            schedule_rules: rules,
            holiday_schedule: id(&self.holiday_schedule),
            summer_designday_schedule: id(&self.summer_designday_schedule),
            winter_designday_schedule: id(&self.winter_designday_schedule),
            schedule_type_limit: self.schedule_type_limit.as_deref().map(|t| {
                if abridged {
                    TypeLimitRef::identifier(t)
                } else {
                    TypeLimitRef::full(t)
                }
            }),
        }
    }
}

impl PartialEq for ScheduleRuleset {
    fn eq(&self, other: &Self) -> bool {
        let same_day = |a: &Option<Arc<ScheduleDay>>, b: &Option<Arc<ScheduleDay>>| {
            a.as_deref() == b.as_deref()
        };
        self.identifier == other.identifier
            && *self.default_day_schedule == *other.default_day_schedule
            && self.schedule_rules == other.schedule_rules
            && self.schedule_type_limit.as_deref() == other.schedule_type_limit.as_deref()
            && same_day(&self.holiday_schedule, &other.holiday_schedule)
            && same_day(&self.summer_designday_schedule, &other.summer_designday_schedule)
            && same_day(&self.winter_designday_schedule, &other.winter_designday_schedule)
    }
}

impl YearlyValues for ScheduleRuleset {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn schedule_type_limit(&self) -> Option<&Arc<ScheduleTypeLimit>> {
        self.schedule_type_limit.as_ref()
    }

    fn yearly_values(&self, timestep: u32, leap_year: bool) -> Result<Vec<f64>> {
        self.values(timestep, None, None, 1, &[], leap_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dt::Time;

    fn office_ruleset() -> ScheduleRuleset {
        let weekday = ScheduleDay::new(
            "Office Weekday",
            vec![0.0, 1.0, 0.0],
            Some(vec![Time::MIDNIGHT, Time::new(9, 0).unwrap(), Time::new(17, 0).unwrap()]),
            false,
        )
        .unwrap();
        let rule = ScheduleRule::from_days_applied(Arc::new(weekday), &["weekday"], None, None).unwrap();
        let off = ScheduleDay::new("Office Off", vec![0.0], None, false).unwrap();
        ScheduleRuleset::new("Office Occupancy", Arc::new(off), vec![rule], None).unwrap()
    }

    #[test]
    fn constant_ruleset_values() {
        let r = ScheduleRuleset::from_constant_value("Const", 0.3, None).unwrap();
        let v = r.values(1, None, None, 1, &[], false).unwrap();
        assert_eq!(v.len(), 8760);
        assert!(v.iter().all(|&x| x == 0.3));
        let v = r.values(4, None, None, 1, &[], true).unwrap();
        assert_eq!(v.len(), 8784 * 4);
    }

    #[test]
    fn weekday_rule_follows_day_of_week() {
        let r = office_ruleset();
        // Starting on a Sunday: day 1 is off, day 2 (Monday) is occupied at 10:00.
        let v = r.values(1, None, Some(Date::new(1, 7, false).unwrap()), 1, &[], false).unwrap();
        assert_eq!(v.len(), 7 * 24);
        assert_eq!(v[10], 0.0);
        assert_eq!(v[24 + 10], 1.0);
        assert_eq!(v[6 * 24 + 10], 0.0);
        // Starting on a Saturday shifts the week.
        let v = r.values(1, None, Some(Date::new(1, 3, false).unwrap()), 7, &[], false).unwrap();
        assert_eq!(v[10], 0.0);
        assert_eq!(v[24 + 10], 0.0);
        assert_eq!(v[48 + 10], 1.0);
    }

    #[test]
    fn thursday_and_friday_map_to_their_own_days() {
        let r = office_ruleset();
        // Jan 5 is a Thursday and Jan 6 a Friday when Jan 1 is a Sunday.
        let v = r.values(1, Some(Date::new(1, 5, false).unwrap()), Some(Date::new(1, 6, false).unwrap()), 5, &[], false).unwrap();
        assert_eq!(v[10], 1.0);
        assert_eq!(v[24 + 10], 1.0);
    }

    #[test]
    fn holidays_use_holiday_schedule() {
        let mut r = office_ruleset();
        let hol = ScheduleDay::new("Holiday", vec![0.5], None, false).unwrap();
        r.set_holiday_schedule(Some(Arc::new(hol))).unwrap();
        let jan_2 = Date::new(1, 2, false).unwrap();
        let v = r.values(1, None, Some(Date::new(1, 3, false).unwrap()), 1, &[jan_2], false).unwrap();
        assert_eq!(v[24 + 10], 0.5);
        assert_eq!(v[48 + 10], 1.0);
    }

    #[test]
    fn rule_priority_and_reordering() {
        let mut r = office_ruleset();
        let closed = ScheduleDay::new("Closed", vec![0.0], None, false).unwrap();
        let mut rule = ScheduleRule::new(Arc::new(closed));
        rule.apply_day_by_name("all").unwrap();
        r.add_rule(rule).unwrap();
        let v = r.values(1, None, Some(Date::new(1, 2, false).unwrap()), 1, &[], false).unwrap();
        assert_eq!(v[24 + 10], 0.0);
        r.reorder_rule(1, 0).unwrap();
        let v = r.values(1, None, Some(Date::new(1, 2, false).unwrap()), 1, &[], false).unwrap();
        assert_eq!(v[24 + 10], 1.0);
        assert!(r.reorder_rule(5, 0).is_err());
        assert!(r.remove_rule(0).is_ok());
        assert_eq!(r.schedule_rules().len(), 1);
    }

    #[test]
    fn single_week_and_constant_flags() {
        let mut r = office_ruleset();
        assert!(r.is_single_week());
        assert!(!r.is_constant());
        let mut summer = ScheduleRule::new(Arc::new(ScheduleDay::new("S", vec![1.0], None, false).unwrap()));
        summer.set_start_date(Date::new(6, 1, false).unwrap()).unwrap();
        r.add_rule(summer).unwrap();
        assert!(!r.is_single_week());
    }

    #[test]
    fn lock_covers_rules() {
        let mut r = office_ruleset();
        r.lock();
        let rule = r.schedule_rules()[0].clone();
        assert!(matches!(r.add_rule(rule), Err(ScheduleError::Locked(_))));
        assert!(r.schedule_rules()[0].is_locked());
        let dup = r.duplicate();
        assert!(!dup.is_locked());
        assert!(!dup.schedule_rules()[0].is_locked());
    }

    #[test]
    fn week_daily_values_share_rules() {
        let work = vec![1.0; 24];
        let off = vec![0.0; 24];
        let week: [&[f64]; 7] = [&off, &work, &work, &work, &work, &work, &off];
        let r = ScheduleRuleset::from_week_daily_values("Week", week, &off, 1, None, (None, None)).unwrap();
        // Sunday's day becomes the default and the weekday rule remains.
        assert_eq!(r.default_day_schedule().identifier(), "Week_Sunday");
        assert_eq!(r.schedule_rules().len(), 1);
        assert!(r.schedule_rules()[0].apply_weekday());
        assert_eq!(r.summer_designday_schedule().map(|d| d.values()[0]), Some(1.0));
        assert_eq!(r.winter_designday_schedule().map(|d| d.values()[0]), Some(0.0));
    }

    #[test]
    fn shift_renames_every_day() {
        let r = office_ruleset();
        let s = r.shift_by_step(1, 1).unwrap();
        assert_eq!(s.identifier(), "Office Occupancy_Shift_60mins");
        assert_eq!(s.schedule_rules()[0].schedule_day().identifier(), "Office Weekday_Shift_60mins");
        assert_eq!(s.schedule_rules()[0].schedule_day().times()[1], Time::new(10, 0).unwrap());
    }

    #[test]
    fn diversify_is_reproducible() {
        let r = office_ruleset();
        let a = r.diversify(6, 1, 1, None, 7).unwrap();
        let b = r.diversify(6, 1, 1, None, 7).unwrap();
        assert_eq!(a.len(), 6);
        assert_eq!(a, b);
        let picked = r.diversify(3, 1, 1, Some(&[0, 1, 2]), 0).unwrap();
        assert_eq!(picked[0].identifier(), "Office Occupancy_Shift_-60mins");
        assert_eq!(picked[1].identifier(), "Office Occupancy");
        assert_eq!(picked[2].identifier(), "Office Occupancy_Shift_60mins");
        assert!(r.diversify(1, 1, 1, Some(&[3]), 0).is_err());
    }

    #[test]
    fn dict_round_trips() {
        let mut r = office_ruleset();
        let limit = Arc::new(
            ScheduleTypeLimit::new("Fractional", Some(0.0), Some(1.0), Default::default(), Default::default())
                .unwrap(),
        );
        r.set_schedule_type_limit(Some(Arc::clone(&limit))).unwrap();
        let json = serde_json::to_string(&r.to_dict(false)).unwrap();
        let dict: ScheduleRulesetDict = serde_json::from_str(&json).unwrap();
        assert_eq!(ScheduleRuleset::from_dict(&dict).unwrap(), r);

        let abridged = r.to_dict(true);
        let mut lookup = TypeLimitLookup::new();
        assert!(matches!(
            ScheduleRuleset::from_dict_abridged(&abridged, &lookup),
            Err(ScheduleError::MissingReference { .. })
        ));
        lookup.insert("Fractional".to_string(), limit);
        assert_eq!(ScheduleRuleset::from_dict_abridged(&abridged, &lookup).unwrap(), r);
    }

    #[test]
    fn missing_day_reference_is_reported() {
        let mut dict = office_ruleset().to_dict(false);
        dict.default_day_schedule = "Nope".to_string();
        assert!(matches!(
            ScheduleRuleset::from_dict(&dict),
            Err(ScheduleError::MissingReference { kind: "schedule day", .. })
        ));
    }
}
