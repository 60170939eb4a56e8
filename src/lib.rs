//! Building-energy schedules: fixed-interval value series and rule-based
//! rulesets, resampled and averaged over a simulation year.

pub mod cli;
pub mod config;
/// Calendar dates, times of day, and minute-of-year arithmetic.
pub mod dt;
pub mod error;
pub mod io;
pub mod library;
pub mod schedule;

pub use error::{Result, ScheduleError};
pub use library::ScheduleLibrary;
pub use schedule::{Schedule, ScheduleFixedInterval, ScheduleRuleset, YearlyValues};
