//! Pre-built test fixtures
//!
//! Consistent, predictable instants and identifiers for unit tests. The
//! temporal fixtures are anchored in January 2024 Eastern time so that
//! end-of-day and DST behavior is stable.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use once_cell::sync::Lazy;

use core_kernel::{HospitalId, PatientId, StaffId, Timezone};

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The default test timezone (America/New_York)
    pub fn eastern() -> Timezone {
        Timezone::default()
    }

    /// A reference "now": Jan 8 2024, 10:00 Eastern (15:00 UTC)
    pub fn admission_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 8, 15, 0, 0).unwrap()
    }

    /// Jan 10 2024 as a local date
    pub fn jan_10() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    /// End of local day Jan 10 2024 Eastern, as a UTC instant
    pub fn jan_10_end_of_day() -> DateTime<Utc> {
        Self::eastern().end_of_local_day(Self::jan_10())
    }

    /// An instant well after Jan 10's local-day cutoff
    pub fn after_jan_10_cutoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 12, 15, 0, 0).unwrap()
    }
}

/// Fixture for stable identifiers
pub struct IdFixtures;

static HOSPITAL: Lazy<HospitalId> = Lazy::new(HospitalId::new);
static OTHER_HOSPITAL: Lazy<HospitalId> = Lazy::new(HospitalId::new);
static STAFF: Lazy<StaffId> = Lazy::new(StaffId::new);
static PATIENT: Lazy<PatientId> = Lazy::new(PatientId::new);

impl IdFixtures {
    /// The caller's hospital, stable within a test process
    pub fn hospital_id() -> HospitalId {
        *HOSPITAL
    }

    /// A different hospital, for scoping-failure tests
    pub fn other_hospital_id() -> HospitalId {
        *OTHER_HOSPITAL
    }

    pub fn staff_id() -> StaffId {
        *STAFF
    }

    pub fn patient_id() -> PatientId {
        *PATIENT
    }
}

/// Fixture for free-text fields
pub struct TextFixtures;

impl TextFixtures {
    /// A plausible missed-task reason
    pub fn missed_reason() -> String {
        Sentence(3..8).fake()
    }

    /// A plausible follow-up reason
    pub fn follow_up_reason() -> String {
        Sentence(3..8).fake()
    }
}
