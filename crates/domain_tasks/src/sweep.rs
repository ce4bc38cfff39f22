//! Sweep predicates for the periodic background triggers
//!
//! The timers live at the interface layer; the decisions live here so they
//! are deterministic given a supplied instant.

use chrono::{DateTime, Duration, Utc};

use core_kernel::Timezone;

use crate::catalog::CourtDateTarget;
use crate::instance::{TaskInstance, TaskStatus};
use crate::patient::PatientProfile;

/// Local wall-clock hour after which the overdue sweep runs
const AUTO_MISS_HOUR: u32 = 16;

/// How far ahead the court-date reminder looks
const COURT_DATE_REMINDER_DAYS: i64 = 3;

/// The auto-miss cutoff for the local day containing `now`.
///
/// Returns None before 16:00 local time; the sweep only fires once the local
/// day has passed the cutoff.
pub fn auto_miss_cutoff(now: DateTime<Utc>, timezone: Timezone) -> Option<DateTime<Utc>> {
    let cutoff = timezone.at_local_time(timezone.local_date(now), AUTO_MISS_HOUR, 0);
    (now >= cutoff).then_some(cutoff)
}

/// Whether an instance should be auto-missed against the given cutoff
pub fn is_overdue(instance: &TaskInstance, cutoff: DateTime<Utc>) -> bool {
    matches!(instance.status, TaskStatus::Pending | TaskStatus::InProgress)
        && instance.due_date.is_some_and(|due| due <= cutoff)
}

/// Court dates on the patient record that fall within the reminder window
pub fn court_dates_due_soon(
    patient: &PatientProfile,
    now: DateTime<Utc>,
) -> Vec<(CourtDateTarget, DateTime<Utc>)> {
    let horizon = now + Duration::days(COURT_DATE_REMINDER_DAYS);
    let mut due = Vec::new();
    if let Some(when) = patient.guardianship_court_datetime {
        if when > now && when <= horizon {
            due.push((CourtDateTarget::Guardianship, when));
        }
    }
    if let Some(when) = patient.ltc_court_datetime {
        if when > now && when <= horizon {
            due.push((CourtDateTarget::Ltc, when));
        }
    }
    due
}
