//! Rules that apply a day schedule on chosen weekdays within a date range.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dt::Date;
use crate::error::{Result, ScheduleError};
use crate::schedule::day::{ScheduleDay, ScheduleDayDict};

/// Day schedule reference inside a rule dictionary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScheduleDayRef {
    Full(ScheduleDayDict),
    Identifier(String),
}

fn jan_1() -> Date {
    Date::jan_1(false)
}

fn dec_31() -> Date {
    Date::dec_31(false)
}

/// Dictionary form of a [`ScheduleRule`]; abridged rules name their day schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRuleDict {
    #[serde(rename = "type")]
    pub kind: String,
    pub schedule_day: ScheduleDayRef,
    #[serde(default)]
    pub apply_sunday: bool,
    #[serde(default)]
    pub apply_monday: bool,
    #[serde(default)]
    pub apply_tuesday: bool,
    #[serde(default)]
    pub apply_wednesday: bool,
    #[serde(default)]
    pub apply_thursday: bool,
    #[serde(default)]
    pub apply_friday: bool,
    #[serde(default)]
    pub apply_saturday: bool,
    #[serde(default = "jan_1")]
    pub start_date: Date,
    #[serde(default = "dec_31")]
    pub end_date: Date,
}

/// A [`ScheduleDay`] applied on selected days of the week between two dates.
///
/// Dates are kept in a non-leap context. A start date after the end date
/// makes the rule wrap across the new year.
#[derive(Debug, Clone)]
pub struct ScheduleRule {
    schedule_day: Arc<ScheduleDay>,
    week_apply: [bool; 7],
    start_date: Date,
    end_date: Date,
    locked: bool,
}

impl ScheduleRule {
    /// Creates a rule that applies on no day of the week, Jan 1 to Dec 31.
    pub fn new(schedule_day: Arc<ScheduleDay>) -> Self {
        Self {
            schedule_day,
            week_apply: [false; 7],
            start_date: jan_1(),
            end_date: dec_31(),
            locked: false,
        }
    }

    /// Creates a rule from day names such as `"monday"` or `"weekend"`.
    ///
    /// # Errors
    ///
    /// Fails for an unknown day name or an invalid date.
    pub fn from_days_applied(
        schedule_day: Arc<ScheduleDay>,
        applicable_days: &[&str],
        start_date: Option<Date>,
        end_date: Option<Date>,
    ) -> Result<Self> {
        let mut rule = Self::new(schedule_day);
        if let Some(start) = start_date {
            rule.set_start_date(start)?;
        }
        if let Some(end) = end_date {
            rule.set_end_date(end)?;
        }
        for day in applicable_days {
            rule.apply_day_by_name(day)?;
        }
        Ok(rule)
    }

    pub fn schedule_day(&self) -> &Arc<ScheduleDay> {
        &self.schedule_day
    }

    /// Apply flags with Sunday first.
    pub fn week_apply(&self) -> [bool; 7] {
        self.week_apply
    }

    pub fn start_date(&self) -> Date {
        self.start_date
    }

    pub fn end_date(&self) -> Date {
        self.end_date
    }

    /// Non-leap day of the year the rule starts on.
    pub fn start_doy(&self) -> u32 {
        self.start_date.doy()
    }

    /// Non-leap day of the year the rule ends on.
    pub fn end_doy(&self) -> u32 {
        self.end_date.doy()
    }

    /// Whether the rule wraps from late in the year into the next January.
    pub fn is_reversed(&self) -> bool {
        self.start_date > self.end_date
    }

    pub fn apply_weekday(&self) -> bool {
        self.week_apply[1..6].iter().all(|&b| b)
    }

    pub fn apply_weekend(&self) -> bool {
        self.week_apply[0] && self.week_apply[6]
    }

    pub fn apply_all(&self) -> bool {
        self.week_apply.iter().all(|&b| b)
    }

    /// Names of the days the rule applies to, Sunday first.
    pub fn days_applied(&self) -> Vec<&'static str> {
        const NAMES: [&str; 7] = [
            "sunday", "monday", "tuesday", "wednesday", "thursday", "friday", "saturday",
        ];
        NAMES
            .iter()
            .zip(self.week_apply)
            .filter_map(|(name, on)| on.then_some(*name))
            .collect()
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
            return Err(ScheduleError::Locked(format!(
                "rule for {}",
                self.schedule_day.identifier()
            )));
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if locked.
    pub fn set_schedule_day(&mut self, schedule_day: Arc<ScheduleDay>) -> Result<()> {
        self.check_unlocked()?;
        self.schedule_day = schedule_day;
        Ok(())
    }

    /// Sets the first day the rule applies. Leap dates are moved to the
    /// non-leap calendar.
    ///
    /// # Errors
    ///
    /// Fails if locked or the date is Feb 29.
    pub fn set_start_date(&mut self, date: Date) -> Result<()> {
        self.check_unlocked()?;
        self.start_date = date.with_leap_year(false)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Fails if locked or the date is Feb 29.
    pub fn set_end_date(&mut self, date: Date) -> Result<()> {
        self.check_unlocked()?;
        self.end_date = date.with_leap_year(false)?;
        Ok(())
    }

    /// Sets the apply flag for one day of the week (1 = Sunday ... 7 = Saturday).
    ///
    /// # Errors
    ///
    /// Fails if locked or `dow` is outside 1-7.
    pub fn set_apply_dow(&mut self, dow: u32, apply: bool) -> Result<()> {
        self.check_unlocked()?;
        if !(1..=7).contains(&dow) {
            return Err(ScheduleError::Validation(format!(
                "\"{dow}\" is not an acceptable day of the week; use 1-7"
            )));
        }
        self.week_apply[dow as usize - 1] = apply;
        Ok(())
    }

    /// Turns the rule on for a day of the week (1 = Sunday ... 7 = Saturday).
    ///
    /// # Errors
    ///
    /// Fails if locked or `dow` is outside 1-7.
    pub fn apply_day_by_dow(&mut self, dow: u32) -> Result<()> {
        self.set_apply_dow(dow, true)
    }

    /// Turns the rule on for a named day, `weekday`, `weekend`, or `all`.
    ///
    /// # Errors
    ///
    /// Fails if locked or the name is not recognized.
    pub fn apply_day_by_name(&mut self, day_name: &str) -> Result<()> {
        let dows: &[u32] = match day_name.to_ascii_lowercase().as_str() {
            "sunday" => &[1],
            "monday" => &[2],
            "tuesday" => &[3],
            "wednesday" => &[4],
            "thursday" => &[5],
            "friday" => &[6],
            "saturday" => &[7],
            "weekday" => &[2, 3, 4, 5, 6],
            "weekend" => &[1, 7],
            "all" => &[1, 2, 3, 4, 5, 6, 7],
            _ => {
                return Err(ScheduleError::Validation(format!(
                    "\"{day_name}\" is not an acceptable day name"
                )));
            }
        };
        for &dow in dows {
            self.apply_day_by_dow(dow)?;
        }
        Ok(())
    }

    /// Whether the rule covers a non-leap `doy` on day of week `dow`.
    ///
    /// Without `dow` the year is assumed to start on a Sunday.
    pub fn does_rule_apply(&self, doy: u32, dow: Option<u32>) -> bool {
        self.does_rule_apply_doy(doy) && self.applies_on(dow.unwrap_or_else(|| dow_from_doy(doy)))
    }

    /// Like [`ScheduleRule::does_rule_apply`] with `doy` counted in a leap year.
    pub fn does_rule_apply_leap_year(&self, doy: u32, dow: Option<u32>) -> bool {
        self.does_rule_apply_doy_leap_year(doy)
            && self.applies_on(dow.unwrap_or_else(|| dow_from_doy(doy)))
    }

    /// Whether a non-leap `doy` falls inside the rule's date range.
    pub fn does_rule_apply_doy(&self, doy: u32) -> bool {
        in_range(doy, self.start_doy(), self.end_doy(), self.is_reversed())
    }

    /// Whether a leap-year `doy` falls inside the rule's date range.
    pub fn does_rule_apply_doy_leap_year(&self, doy: u32) -> bool {
        let shift = |date: Date| date.doy() + u32::from(date.month() > 2);
        in_range(doy, shift(self.start_date), shift(self.end_date), self.is_reversed())
    }

    fn applies_on(&self, dow: u32) -> bool {
        (1..=7).contains(&dow) && self.week_apply[dow as usize - 1]
    }

    /// An unlocked copy sharing the same day schedule.
    pub fn duplicate(&self) -> Self {
        let mut dup = self.clone();
        dup.locked = false;
        dup
    }

    /// Builds a rule from a dictionary holding the full day schedule.
    ///
    /// # Errors
    ///
    /// Fails for the wrong `type` tag, a day given by identifier, or an
    /// invalid day schedule.
    pub fn from_dict(data: &ScheduleRuleDict) -> Result<Self> {
        if data.kind != "ScheduleRule" {
            return Err(ScheduleError::Parse(format!(
                "expected ScheduleRule dictionary; got {}",
                data.kind
            )));
        }
        let ScheduleDayRef::Full(day) = &data.schedule_day else {
            return Err(ScheduleError::Parse(
                "ScheduleRule dictionary must embed its schedule_day".to_string(),
            ));
        };
        Self::with_dict_fields(Arc::new(ScheduleDay::from_dict(day)?), data)
    }

    /// Builds a rule from an abridged dictionary, using `schedule_day` for
    /// the referenced day.
    ///
    /// # Errors
    ///
    /// Fails for the wrong `type` tag or invalid dates.
    pub fn from_dict_abridged(data: &ScheduleRuleDict, schedule_day: Arc<ScheduleDay>) -> Result<Self> {
        if data.kind != "ScheduleRuleAbridged" {
            return Err(ScheduleError::Parse(format!(
                "expected ScheduleRuleAbridged dictionary; got {}",
                data.kind
            )));
        }
        Self::with_dict_fields(schedule_day, data)
    }

    fn with_dict_fields(schedule_day: Arc<ScheduleDay>, data: &ScheduleRuleDict) -> Result<Self> {
        let mut rule = Self::new(schedule_day);
        rule.week_apply = [
            data.apply_sunday,
            data.apply_monday,
            data.apply_tuesday,
            data.apply_wednesday,
            data.apply_thursday,
            data.apply_friday,
            data.apply_saturday,
        ];
        rule.set_start_date(data.start_date)?;
        rule.set_end_date(data.end_date)?;
        Ok(rule)
    }

    pub fn to_dict(&self, abridged: bool) -> ScheduleRuleDict {
        let [sun, mon, tue, wed, thu, fri, sat] = self.week_apply;
        ScheduleRuleDict {
            kind: if abridged { "ScheduleRuleAbridged" } else { "ScheduleRule" }.to_string(),
            schedule_day: if abridged {
                ScheduleDayRef::Identifier(self.schedule_day.identifier().to_string())
            } else {
                ScheduleDayRef::Full(self.schedule_day.to_dict())
            },
            apply_sunday: sun,
            apply_monday: mon,
            apply_tuesday: tue,
            apply_wednesday: wed,
            apply_thursday: thu,
            apply_friday: fri,
            apply_saturday: sat,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

impl PartialEq for ScheduleRule {
    fn eq(&self, other: &Self) -> bool {
        *self.schedule_day == *other.schedule_day
            && self.week_apply == other.week_apply
            && self.start_date == other.start_date
            && self.end_date == other.end_date
    }
}

fn dow_from_doy(doy: u32) -> u32 {
    match doy % 7 {
        0 => 7,
        r => r,
    }
}

fn in_range(doy: u32, start: u32, end: u32, reversed: bool) -> bool {
    if reversed {
        doy <= end || start <= doy
    } else {
        start <= doy && doy <= end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dt::Time;

    fn day() -> Arc<ScheduleDay> {
        let times = vec![Time::MIDNIGHT, Time::new(9, 0).unwrap()];
        Arc::new(ScheduleDay::new("Weekday Occ", vec![0.0, 1.0], Some(times), false).unwrap())
    }

    #[test]
    fn day_names_set_flags() {
        let rule = ScheduleRule::from_days_applied(day(), &["weekday"], None, None).unwrap();
        assert!(rule.apply_weekday());
        assert!(!rule.apply_weekend());
        assert_eq!(rule.days_applied().len(), 5);
        let mut rule = ScheduleRule::new(day());
        rule.apply_day_by_name("all").unwrap();
        assert!(rule.apply_all());
        assert!(rule.apply_day_by_name("someday").is_err());
        assert!(rule.apply_day_by_dow(8).is_err());
    }

    #[test]
    fn doy_range_and_reversed_rules() {
        let mut rule = ScheduleRule::new(day());
        rule.apply_day_by_name("all").unwrap();
        rule.set_start_date(Date::new(6, 1, false).unwrap()).unwrap();
        rule.set_end_date(Date::new(8, 31, false).unwrap()).unwrap();
        assert!(!rule.is_reversed());
        assert!(rule.does_rule_apply(Date::new(7, 4, false).unwrap().doy(), None));
        assert!(!rule.does_rule_apply(1, None));

        rule.set_start_date(Date::new(11, 1, false).unwrap()).unwrap();
        rule.set_end_date(Date::new(2, 28, false).unwrap()).unwrap();
        assert!(rule.is_reversed());
        assert!(rule.does_rule_apply(1, None));
        assert!(rule.does_rule_apply(365, None));
        assert!(!rule.does_rule_apply(180, None));
    }

    #[test]
    fn leap_year_doy_shifts_after_february() {
        let mut rule = ScheduleRule::new(day());
        rule.apply_day_by_name("all").unwrap();
        rule.set_start_date(Date::new(3, 1, false).unwrap()).unwrap();
        // Mar 1 is doy 60 in a common year and doy 61 in a leap year.
        assert!(rule.does_rule_apply(60, None));
        assert!(!rule.does_rule_apply_leap_year(60, None));
        assert!(rule.does_rule_apply_leap_year(61, None));
    }

    #[test]
    fn default_dow_assumes_sunday_start() {
        let mut rule = ScheduleRule::new(day());
        rule.apply_day_by_dow(7).unwrap();
        assert!(rule.does_rule_apply(7, None));
        assert!(!rule.does_rule_apply(1, None));
        assert!(rule.does_rule_apply(1, Some(7)));
    }

    #[test]
    fn locked_rule_rejects_edits() {
        let mut rule = ScheduleRule::new(day());
        rule.lock();
        assert!(matches!(rule.apply_day_by_dow(2), Err(ScheduleError::Locked(_))));
        assert!(rule.duplicate().apply_day_by_dow(2).is_ok());
    }

    #[test]
    fn dict_round_trip() {
        let rule = ScheduleRule::from_days_applied(
            day(),
            &["monday", "friday"],
            Some(Date::new(12, 1, false).unwrap()),
            Some(Date::new(1, 31, false).unwrap()),
        )
        .unwrap();
        let json = serde_json::to_string(&rule.to_dict(false)).unwrap();
        let dict: ScheduleRuleDict = serde_json::from_str(&json).unwrap();
        assert_eq!(ScheduleRule::from_dict(&dict).unwrap(), rule);

        let abridged = rule.to_dict(true);
        assert_eq!(abridged.schedule_day, ScheduleDayRef::Identifier("Weekday Occ".to_string()));
        assert!(ScheduleRule::from_dict(&abridged).is_err());
        assert_eq!(ScheduleRule::from_dict_abridged(&abridged, day()).unwrap(), rule);
    }
}
