//! Integration tests for resampling fixed-interval schedules onto a year.

mod common;

use energy_schedules::dt::Date;
use energy_schedules::schedule::ScheduleFixedInterval;
use energy_schedules::ScheduleError;

#[test]
fn single_day_lands_on_its_start_date() {
    let solstice = Date::new(6, 21, false).unwrap();
    let sched = common::increasing_day("Solstice Increasing", solstice);
    let year = sched.values_at_timestep(1, None, None).unwrap();
    assert_eq!(year.len(), 8760);

    let offset = (solstice.doy() as usize - 1) * 24;
    assert_eq!(&year[offset..offset + 24], sched.values());
    assert!(year[..offset].iter().all(|&v| v == 0.0));
    assert!(year[offset + 24..].iter().all(|&v| v == 0.0));
}

#[test]
fn schedule_running_past_dec_31_wraps_to_jan_1() {
    let values: Vec<f64> = (0..48u32).map(f64::from).collect();
    let sched = ScheduleFixedInterval::new("Wrap", values, None, 1, Date::new(12, 31, false).unwrap())
        .unwrap()
        .with_placeholder_value(-1.0)
        .unwrap();

    let year = sched.values_at_timestep(1, None, None).unwrap();
    assert_eq!(year.len(), 8760);
    // Second day of data opens the year; first day closes it.
    assert_eq!(year[0], 24.0);
    assert_eq!(year[23], 47.0);
    assert_eq!(year[24], -1.0);
    assert_eq!(year[8736], 0.0);
    assert_eq!(year[8759], 23.0);

    assert_eq!(sched.end_date_time().to_string(), "01 Jan 23:00");
}

#[test]
fn single_day_windows_on_a_wrapped_schedule() {
    let values: Vec<f64> = (0..48u32).map(f64::from).collect();
    let sched = ScheduleFixedInterval::new("Wrap", values, None, 1, Date::new(12, 31, false).unwrap())
        .unwrap()
        .with_placeholder_value(-1.0)
        .unwrap();
    let dec_31 = Date::new(12, 31, false).unwrap();
    let jan_1 = Date::jan_1(false);
    let jan_2 = Date::new(1, 2, false).unwrap();

    let last_day = sched.values_at_timestep(1, Some(dec_31), Some(dec_31)).unwrap();
    assert_eq!(last_day.len(), 24);
    assert_eq!((last_day[0], last_day[23]), (0.0, 23.0));

    let first_day = sched.values_at_timestep(1, Some(jan_1), Some(jan_1)).unwrap();
    assert_eq!(first_day.len(), 24);
    assert_eq!((first_day[0], first_day[23]), (24.0, 47.0));

    let uncovered = sched.values_at_timestep(1, Some(jan_2), Some(jan_2)).unwrap();
    assert_eq!(uncovered.len(), 24);
    assert!(uncovered.iter().all(|&v| v == -1.0));

    for (day, first, last) in [(dec_31, 0.0, 23.0), (jan_1, 24.0, 47.0), (jan_2, -1.0, -1.0)] {
        let quarter = sched.values_at_timestep(4, Some(day), Some(day)).unwrap();
        assert_eq!(quarter.len(), 24 * 4, "{day}");
        assert_eq!(&quarter[..4], &[first; 4], "{day}");
        assert_eq!(&quarter[92..], &[last; 4], "{day}");
    }
}

#[test]
fn leap_year_schedules_cover_366_days() {
    let sched = common::increasing_day("Leap Day", Date::new(2, 29, true).unwrap());
    assert!(sched.is_leap_year());
    let year = sched.values_at_timestep(1, None, None).unwrap();
    assert_eq!(year.len(), 8784);
    assert_eq!(year[59 * 24 + 23], 1.0);

    let window = sched
        .values_at_timestep(1, Some(Date::new(2, 29, true).unwrap()), Some(Date::new(3, 1, true).unwrap()))
        .unwrap();
    assert_eq!(window.len(), 48);
    assert_eq!(&window[..24], sched.values());
}

#[test]
fn windows_at_a_finer_timestep() {
    let sched = common::increasing_day("Solstice Increasing", Date::new(6, 21, false).unwrap())
        .with_placeholder_value(0.5)
        .unwrap();
    let window = sched
        .values_at_timestep(4, Some(Date::new(6, 21, false).unwrap()), Some(Date::new(6, 22, false).unwrap()))
        .unwrap();
    assert_eq!(window.len(), 2 * 24 * 4);
    assert_eq!(&window[4..8], &[1.0 / 23.0; 4]);
    assert!(window[96..].iter().all(|&v| v == 0.5));
}

#[test]
fn coarsening_a_quarter_hour_year() {
    let values: Vec<f64> = (0..8760u32 * 4).map(|i| f64::from(i % 4)).collect();
    let sched = ScheduleFixedInterval::new("Quarter", values, None, 4, Date::jan_1(false)).unwrap();
    let hourly = sched.values_at_timestep(1, None, None).unwrap();
    assert_eq!(hourly.len(), 8760);
    assert!(hourly.iter().all(|&v| v == 0.0));
    let half_hourly = sched.values_at_timestep(2, None, None).unwrap();
    assert_eq!(&half_hourly[..4], &[0.0, 2.0, 0.0, 2.0]);
}

#[test]
fn incompatible_timesteps_and_dates_are_rejected() {
    let sched = ScheduleFixedInterval::new("Quarter", vec![0.0; 96], None, 4, Date::jan_1(false)).unwrap();
    assert!(matches!(
        sched.values_at_timestep(3, None, None),
        Err(ScheduleError::TimestepConversion { native: 4, target: 3 })
    ));
    assert!(matches!(
        sched.values_at_timestep(6, None, None),
        Err(ScheduleError::TimestepConversion { native: 4, target: 6 })
    ));
    assert!(matches!(
        sched.values_at_timestep(7, None, None),
        Err(ScheduleError::InvalidTimestep { timestep: 7, .. })
    ));
    assert!(sched
        .values_at_timestep(1, Some(Date::new(2, 29, true).unwrap()), None)
        .is_err());
    assert!(sched
        .values_at_timestep(1, Some(Date::new(3, 2, false).unwrap()), Some(Date::new(3, 1, false).unwrap()))
        .is_err());
}
