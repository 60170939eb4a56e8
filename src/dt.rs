//! Leap-aware calendar primitives used by every schedule.
//!
//! A [`Date`] is a month/day pair tagged with a leap-year flag. Calendar
//! arithmetic is delegated to `chrono` using 2016 as the leap reference year
//! and 2017 as the non-leap one, so a `Date` never carries an actual year.

use std::cmp::Ordering;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ScheduleError};

const LEAP_REFERENCE_YEAR: i32 = 2016;
const COMMON_REFERENCE_YEAR: i32 = 2017;

/// Number of days in the reference year for the given leap flag.
pub fn days_in_year(leap_year: bool) -> u32 {
    if leap_year { 366 } else { 365 }
}

fn reference_year(leap_year: bool) -> i32 {
    if leap_year {
        LEAP_REFERENCE_YEAR
    } else {
        COMMON_REFERENCE_YEAR
    }
}

/// A calendar date without a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    inner: NaiveDate,
    leap_year: bool,
}

impl Date {
    /// Creates a date from a month and day.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if the month/day pair does not
    /// exist in the reference year (e.g. Feb 29 in a non-leap year).
    ///
    /// # Examples
    ///
    /// ```
    /// use energy_schedules::dt::Date;
    ///
    /// let d = Date::new(3, 1, true).unwrap();
    /// assert_eq!(d.doy(), 61);
    /// ```
    pub fn new(month: u32, day: u32, leap_year: bool) -> Result<Self> {
        NaiveDate::from_ymd_opt(reference_year(leap_year), month, day)
            .map(|inner| Self { inner, leap_year })
            .ok_or_else(|| {
                ScheduleError::Validation(format!(
                    "{month}/{day} is not a valid date (leap year: {leap_year})"
                ))
            })
    }

    /// January 1st of the given leap context.
    pub fn jan_1(leap_year: bool) -> Self {
        Self {
            inner: NaiveDate::from_yo_opt(reference_year(leap_year), 1)
                .unwrap_or(NaiveDate::MIN),
            leap_year,
        }
    }

    /// December 31st of the given leap context.
    pub fn dec_31(leap_year: bool) -> Self {
        Self {
            inner: NaiveDate::from_yo_opt(reference_year(leap_year), days_in_year(leap_year))
                .unwrap_or(NaiveDate::MIN),
            leap_year,
        }
    }

    /// Creates a date from a 1-based day of the year.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] if `doy` is outside the year.
    pub fn from_doy(doy: u32, leap_year: bool) -> Result<Self> {
        NaiveDate::from_yo_opt(reference_year(leap_year), doy)
            .map(|inner| Self { inner, leap_year })
            .ok_or_else(|| {
                ScheduleError::Validation(format!(
                    "day of year {doy} is out of range (leap year: {leap_year})"
                ))
            })
    }

    /// Creates a date from `[month, day]` or `[month, day, leap]`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Parse`] for arrays of the wrong length, or a
    /// validation error for impossible dates.
    pub fn from_array(values: &[u32]) -> Result<Self> {
        match values {
            [m, d] => Self::new(*m, *d, false),
            [m, d, leap] => Self::new(*m, *d, *leap != 0),
            _ => Err(ScheduleError::Parse(format!(
                "date arrays need 2 or 3 items; got {values:?}"
            ))),
        }
    }

    /// `[month, day]` for non-leap dates and `[month, day, 1]` for leap dates.
    pub fn to_array(&self) -> Vec<u32> {
        if self.leap_year {
            vec![self.month(), self.day(), 1]
        } else {
            vec![self.month(), self.day()]
        }
    }

    pub fn month(&self) -> u32 {
        self.inner.month()
    }

    pub fn day(&self) -> u32 {
        self.inner.day()
    }

    pub fn leap_year(&self) -> bool {
        self.leap_year
    }

    /// 1-based day of the year within this date's leap context.
    pub fn doy(&self) -> u32 {
        self.inner.ordinal()
    }

    /// Day of the week with Sunday as 1 and Saturday as 7.
    pub fn dow(&self) -> u32 {
        self.inner.weekday().number_from_sunday()
    }

    /// The same month and day re-interpreted in another leap context.
    ///
    /// # Errors
    ///
    /// Fails for Feb 29 when moving into a non-leap context.
    pub fn with_leap_year(&self, leap_year: bool) -> Result<Self> {
        if leap_year == self.leap_year {
            return Ok(*self);
        }
        Self::new(self.month(), self.day(), leap_year)
    }
}

impl Ord for Date {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.month(), self.day(), self.leap_year).cmp(&(other.month(), other.day(), other.leap_year))
    }
}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.format("%d %b"))
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let values = Vec::<u32>::deserialize(deserializer)?;
        Date::from_array(&values).map_err(serde::de::Error::custom)
    }
}

/// A time of day with minute resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Time {
    hour: u32,
    minute: u32,
}

impl Time {
    /// Creates a time of day.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Validation`] unless `hour < 24` and `minute < 60`.
    pub fn new(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(ScheduleError::Validation(format!(
                "{hour}:{minute:02} is not a valid time of day"
            )));
        }
        Ok(Self { hour, minute })
    }

    pub const MIDNIGHT: Time = Time { hour: 0, minute: 0 };

    /// Creates a time from minutes past midnight.
    ///
    /// # Errors
    ///
    /// Fails if `mod_` is 1440 or more.
    pub fn from_mod(mod_: u32) -> Result<Self> {
        Self::new(mod_ / 60, mod_ % 60)
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Minutes past midnight.
    pub fn mod_(&self) -> u32 {
        self.hour * 60 + self.minute
    }

    /// Fractional hours past midnight.
    pub fn hod(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0
    }

    pub fn to_array(&self) -> [u32; 2] {
        [self.hour, self.minute]
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let [hour, minute] = <[u32; 2]>::deserialize(deserializer)?;
        Time::new(hour, minute).map_err(serde::de::Error::custom)
    }
}

/// A date and time of day within a leap context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTime {
    pub date: Date,
    pub time: Time,
}

impl DateTime {
    pub fn new(date: Date, time: Time) -> Self {
        Self { date, time }
    }

    /// Creates a date-time from minutes past midnight on Jan 1.
    ///
    /// Values beyond the end of the year wrap back to the start.
    pub fn from_moy(moy: u64, leap_year: bool) -> Self {
        let minutes_in_year = days_in_year(leap_year) as u64 * 1440;
        let moy = moy % minutes_in_year;
        let doy = (moy / 1440) as u32 + 1;
        let mod_ = (moy % 1440) as u32;
        Self {
            date: Date::from_doy(doy, leap_year).unwrap_or_else(|_| Date::jan_1(leap_year)),
            time: Time::from_mod(mod_).unwrap_or(Time::MIDNIGHT),
        }
    }

    /// Minutes past midnight on Jan 1.
    pub fn moy(&self) -> u64 {
        (self.date.doy() as u64 - 1) * 1440 + self.time.mod_() as u64
    }

    /// Fractional hour of the year.
    pub fn hoy(&self) -> f64 {
        self.moy() as f64 / 60.0
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:02}:{:02}", self.date, self.time.hour(), self.time.minute())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doy_respects_leap_flag() {
        let d = Date::new(3, 1, false).ok();
        assert_eq!(d.map(|d| d.doy()), Some(60));
        let d = Date::new(3, 1, true).ok();
        assert_eq!(d.map(|d| d.doy()), Some(61));
    }

    #[test]
    fn ordering_agrees_with_equality() {
        let common = Date::new(3, 1, false).unwrap();
        let leap = Date::new(3, 1, true).unwrap();
        assert_ne!(common, leap);
        assert_ne!(common.cmp(&leap), Ordering::Equal);
        assert!(common < leap);
        assert_eq!(common.cmp(&Date::new(3, 1, false).unwrap()), Ordering::Equal);
        assert!(Date::new(2, 28, true).unwrap() < common);
    }

    #[test]
    fn feb_29_requires_leap() {
        assert!(Date::new(2, 29, false).is_err());
        assert!(Date::new(2, 29, true).is_ok());
        let d = Date::new(2, 29, true).ok();
        assert!(d.map(|d| d.with_leap_year(false).is_err()).unwrap_or(false));
    }

    #[test]
    fn from_doy_bounds() {
        assert!(Date::from_doy(365, false).is_ok());
        assert!(Date::from_doy(366, false).is_err());
        assert!(Date::from_doy(366, true).is_ok());
        assert!(Date::from_doy(0, true).is_err());
        assert_eq!(Date::dec_31(true).doy(), 366);
    }

    #[test]
    fn array_round_trip() {
        let d = Date::new(6, 21, true).ok();
        assert_eq!(d.map(|d| d.to_array()), Some(vec![6, 21, 1]));
        let back = Date::from_array(&[6, 21, 1]).ok();
        assert_eq!(back, d);
        assert_eq!(Date::jan_1(false).to_array(), vec![1, 1]);
    }

    #[test]
    fn dow_of_reference_years() {
        // 2017-01-01 was a Sunday.
        assert_eq!(Date::jan_1(false).dow(), 1);
        // 2016-01-01 was a Friday.
        assert_eq!(Date::jan_1(true).dow(), 6);
    }

    #[test]
    fn datetime_from_moy_wraps() {
        let dt = DateTime::from_moy(365 * 1440 + 90, false);
        assert_eq!(dt.date.doy(), 1);
        assert_eq!(dt.time.to_array(), [1, 30]);
        let dt = DateTime::from_moy(365 * 1440, true);
        assert_eq!(dt.date.doy(), 366);
    }

    #[test]
    fn display_formats() {
        assert_eq!(Date::jan_1(false).to_string(), "01 Jan");
        let t = Time::new(7, 5).ok();
        assert_eq!(t.map(|t| t.to_string()), Some("7:05".to_string()));
    }
}
