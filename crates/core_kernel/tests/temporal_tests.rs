//! Tests for timezone-aware date resolution
//!
//! The scheduling math lives entirely in `Timezone`; these tests pin the
//! end-of-local-day convention (23:59:00 local) and its behavior across
//! daylight-saving transitions.

use chrono::{NaiveDate, TimeZone, Timelike, Utc};
use proptest::prelude::*;

use core_kernel::{TemporalError, Timezone, DEFAULT_TIMEZONE};

fn new_york() -> Timezone {
    DEFAULT_TIMEZONE
}

mod defaults_and_parsing {
    use super::*;

    #[test]
    fn test_default_timezone_is_new_york() {
        assert_eq!(Timezone::default().0.name(), "America/New_York");
    }

    #[test]
    fn test_parse_timezone() {
        let tz: Timezone = "America/Chicago".parse().unwrap();
        assert_eq!(tz.0.name(), "America/Chicago");
    }

    #[test]
    fn test_invalid_timezone_error() {
        let err = "Not/AZone".parse::<Timezone>().unwrap_err();
        assert_eq!(err, TemporalError::InvalidTimezone("Not/AZone".into()));
        assert_eq!(err.to_string(), "Invalid timezone: Not/AZone");
    }

    #[test]
    fn test_serde_round_trip() {
        let tz: Timezone = "Europe/London".parse().unwrap();
        let json = serde_json::to_string(&tz).unwrap();
        assert_eq!(json, "\"Europe/London\"");
        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tz);
    }
}

mod end_of_day {
    use super::*;

    #[test]
    fn test_end_of_local_day_standard_time() {
        // EST is UTC-5: 23:59 local on Jan 10 is 04:59 UTC on Jan 11
        let date = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let instant = new_york().end_of_local_day(date);
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 1, 11, 4, 59, 0).unwrap());
    }

    #[test]
    fn test_end_of_local_day_daylight_time() {
        // EDT is UTC-4
        let date = NaiveDate::from_ymd_opt(2024, 7, 10).unwrap();
        let instant = new_york().end_of_local_day(date);
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 7, 11, 3, 59, 0).unwrap());
    }

    #[test]
    fn test_end_of_day_containing() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 10, 18, 30, 0).unwrap();
        let cutoff = new_york().end_of_day_containing(instant);
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2024, 1, 11, 4, 59, 0).unwrap());
    }

    #[test]
    fn test_local_date_near_midnight() {
        // 03:00 UTC on Jan 11 is still Jan 10 in New York
        let instant = Utc.with_ymd_and_hms(2024, 1, 11, 3, 0, 0).unwrap();
        let date = new_york().local_date(instant);
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
    }
}

mod day_offsets {
    use super::*;

    #[test]
    fn test_add_days_end_of_day() {
        // Jan 8 10:00 EST, plus 7 days -> Jan 15 23:59 EST
        let base = Utc.with_ymd_and_hms(2024, 1, 8, 15, 0, 0).unwrap();
        let result = new_york().add_days_end_of_day(base, 7);
        assert_eq!(result, Utc.with_ymd_and_hms(2024, 1, 16, 4, 59, 0).unwrap());
    }

    #[test]
    fn test_add_zero_days_clamps_to_end_of_today() {
        let base = Utc.with_ymd_and_hms(2024, 1, 8, 15, 0, 0).unwrap();
        let result = new_york().add_days_end_of_day(base, 0);
        assert_eq!(result, Utc.with_ymd_and_hms(2024, 1, 9, 4, 59, 0).unwrap());
    }

    #[test]
    fn test_add_days_crosses_spring_forward() {
        // Base in EST, result lands after the March 10 transition into EDT
        let base = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();
        let result = new_york().add_days_end_of_day(base, 3);
        assert_eq!(result, Utc.with_ymd_and_hms(2024, 3, 12, 3, 59, 0).unwrap());
    }

    #[test]
    fn test_add_days_crosses_fall_back() {
        // Nov 3 2024 is the fall-back transition out of EDT
        let base = Utc.with_ymd_and_hms(2024, 11, 1, 12, 0, 0).unwrap();
        let result = new_york().add_days_end_of_day(base, 3);
        assert_eq!(result, Utc.with_ymd_and_hms(2024, 11, 5, 4, 59, 0).unwrap());
    }
}

mod wall_clock_conversion {
    use super::*;

    #[test]
    fn test_at_local_time() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let instant = new_york().at_local_time(date, 16, 0);
        // 16:00 EST is 21:00 UTC
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap());
    }

    #[test]
    fn test_to_utc_resolves_local_wall_clock() {
        let local = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let instant = new_york().to_utc(local);
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 2, 1, 15, 0, 0).unwrap());
    }

    #[test]
    fn test_nonexistent_local_time_rolls_forward() {
        // 02:30 on March 10 2024 does not exist in New York; it resolves
        // past the spring-forward gap instead of failing
        let local = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let instant = new_york().to_utc(local);
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap());
    }

    #[test]
    fn test_ambiguous_local_time_takes_earliest() {
        // 01:30 on Nov 3 2024 occurs twice; the EDT occurrence wins
        let local = NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        let instant = new_york().to_utc(local);
        assert_eq!(instant, Utc.with_ymd_and_hms(2024, 11, 3, 5, 30, 0).unwrap());
    }
}

proptest! {
    /// End-of-day resolution always lands at 23:59 on the same local date,
    /// whatever the UTC offset happens to be that day.
    #[test]
    fn prop_end_of_local_day_stays_on_its_date(days in 0i64..730) {
        let tz = new_york();
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
            + chrono::Duration::days(days);
        let instant = tz.end_of_local_day(date);
        let local = tz.to_local(instant);
        prop_assert_eq!(local.date_naive(), date);
        prop_assert_eq!((local.hour(), local.minute()), (23, 59));
    }
}
