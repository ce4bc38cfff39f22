//! Timezone-aware date resolution
//!
//! Every due-date computation in the system routes through this module so
//! that daylight-saving transitions and cross-timezone storage are handled
//! in one place. Dates are always persisted as absolute UTC instants; a
//! hospital's local day ends at 23:59:00 local time.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use thiserror::Error;

/// Fallback timezone when neither the request nor the hospital supplies one.
pub const DEFAULT_TIMEZONE: Timezone = Timezone(chrono_tz::America::New_York);

/// Timezone wrapper for hospital-local date arithmetic
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Tz::from_str(&s)
            .map(Timezone)
            .map_err(|_| serde::de::Error::custom(format!("Invalid timezone: {}", s)))
    }
}

impl FromStr for Timezone {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tz::from_str(s)
            .map(Timezone)
            .map_err(|_| TemporalError::InvalidTimezone(s.to_string()))
    }
}

impl Default for Timezone {
    fn default() -> Self {
        DEFAULT_TIMEZONE
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Converts a UTC instant to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// The local calendar date containing the given instant
    pub fn local_date(&self, utc: DateTime<Utc>) -> NaiveDate {
        self.to_local(utc).date_naive()
    }

    /// End of the local day (23:59:00) for a local date, as a UTC instant
    pub fn end_of_local_day(&self, date: NaiveDate) -> DateTime<Utc> {
        self.resolve_local(date.and_hms_opt(23, 59, 0).unwrap_or_else(|| {
            // 23:59:00 is always a representable wall-clock time
            date.and_time(chrono::NaiveTime::MIN)
        }))
    }

    /// End of the local day containing the given instant
    pub fn end_of_day_containing(&self, utc: DateTime<Utc>) -> DateTime<Utc> {
        self.end_of_local_day(self.local_date(utc))
    }

    /// Re-bases the instant to the local calendar, adds `days`, then clamps
    /// to 23:59:00 local and converts back to UTC
    pub fn add_days_end_of_day(&self, base: DateTime<Utc>, days: i64) -> DateTime<Utc> {
        let local_date = self.local_date(base) + Duration::days(days);
        self.end_of_local_day(local_date)
    }

    /// Converts a local wall-clock datetime to a UTC instant
    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        self.resolve_local(local)
    }

    /// A specific wall-clock time on a local date, as a UTC instant
    pub fn at_local_time(&self, date: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
        let naive = date
            .and_hms_opt(hour, minute, 0)
            .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN));
        self.resolve_local(naive)
    }

    /// Resolves a local wall-clock time to a UTC instant.
    ///
    /// Ambiguous times (fall-back overlap) resolve to the earliest instant;
    /// nonexistent times (spring-forward gap) roll forward past the gap.
    fn resolve_local(&self, naive: NaiveDateTime) -> DateTime<Utc> {
        self.0
            .from_local_datetime(&naive)
            .earliest()
            .or_else(|| {
                self.0
                    .from_local_datetime(&(naive + Duration::hours(1)))
                    .earliest()
            })
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}
