//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use energy_schedules::dt::{Date, Time};
use energy_schedules::schedule::{
    NumericType, ScheduleDay, ScheduleFixedInterval, ScheduleRule, ScheduleRuleset,
    ScheduleTypeLimit, UnitType,
};

/// Fractional type limit (0 to 1, continuous, dimensionless).
pub fn fractional() -> Arc<ScheduleTypeLimit> {
    Arc::new(
        ScheduleTypeLimit::new(
            "Fractional",
            Some(0.0),
            Some(1.0),
            NumericType::Continuous,
            UnitType::Dimensionless,
        )
        .unwrap(),
    )
}

/// Temperature type limit (-273.15 lower bound, no upper bound).
pub fn temperature() -> Arc<ScheduleTypeLimit> {
    Arc::new(
        ScheduleTypeLimit::new(
            "Temperature",
            Some(-273.15),
            None,
            NumericType::Continuous,
            UnitType::Temperature,
        )
        .unwrap(),
    )
}

/// One day ramping 0/23 .. 23/23 at hourly steps, starting on `start`.
pub fn increasing_day(identifier: &str, start: Date) -> ScheduleFixedInterval {
    let values: Vec<f64> = (0..24u32).map(|h| f64::from(h) / 23.0).collect();
    ScheduleFixedInterval::new(identifier, values, Some(fractional()), 1, start).unwrap()
}

/// A full non-leap year of hourly values cycling 0..=23 each day.
pub fn hour_of_day_year(identifier: &str) -> ScheduleFixedInterval {
    let values: Vec<f64> = (0..8760u32).map(|i| f64::from(i % 24)).collect();
    ScheduleFixedInterval::new(identifier, values, None, 1, Date::jan_1(false)).unwrap()
}

/// Office occupancy: 1 on weekdays 9:00-17:00, otherwise 0.
pub fn office_occupancy() -> ScheduleRuleset {
    let weekday = ScheduleDay::new(
        "Office Weekday Occ",
        vec![0.0, 1.0, 0.0],
        Some(vec![
            Time::MIDNIGHT,
            Time::new(9, 0).unwrap(),
            Time::new(17, 0).unwrap(),
        ]),
        false,
    )
    .unwrap();
    let rule =
        ScheduleRule::from_days_applied(Arc::new(weekday), &["weekday"], None, None).unwrap();
    let off = ScheduleDay::new("Office Off Occ", vec![0.0], None, false).unwrap();
    ScheduleRuleset::new("Office Occupancy", Arc::new(off), vec![rule], Some(fractional()))
        .unwrap()
}
