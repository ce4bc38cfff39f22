//! Task instantiation - deriving the initial task set at admission
//!
//! A fixed decision table over patient flags chooses template names and
//! per-template day offsets. Re-invocation is idempotent: templates with an
//! existing instance for the patient are skipped.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::warn;

use core_kernel::{TaskTemplateId, Timezone};

use crate::catalog::{names, TaskCatalog};
use crate::instance::TaskInstance;
use crate::patient::PatientProfile;

/// A candidate from the decision table: template name plus the due-date
/// offset in days from admission
struct Candidate {
    name: &'static str,
    offset_days: i64,
}

/// Derives the initial task instances for a freshly admitted patient.
///
/// `existing` holds the template ids of instances the patient already has;
/// those candidates are skipped so re-invocation never duplicates tasks.
/// Patients without an assigned staff member get no tasks (logged, not an
/// error). Unresolved template names are logged and skipped.
///
/// The result is ordered by due date ascending.
pub fn initial_tasks(
    patient: &PatientProfile,
    catalog: &TaskCatalog,
    existing: &HashSet<TaskTemplateId>,
    timezone: Timezone,
    now: DateTime<Utc>,
) -> Vec<TaskInstance> {
    if patient.assigned_staff_id.is_none() {
        warn!(patient_id = %patient.id, "skipping task instantiation: no assigned staff");
        return Vec::new();
    }

    let mut instances = Vec::new();
    let mut seen: HashSet<TaskTemplateId> = existing.clone();

    for candidate in decision_table(patient) {
        let Some(template) = catalog.find_by_name(candidate.name) else {
            warn!(template = candidate.name, "skipping unknown task template");
            continue;
        };
        if !seen.insert(template.id) {
            continue;
        }
        let due = timezone.add_days_end_of_day(now, candidate.offset_days);
        instances.push(TaskInstance::new(
            patient.id,
            template.id,
            Some(due),
            Some(due),
            now,
        ));
    }

    instances.sort_by_key(|instance| instance.due_date);
    instances
}

fn decision_table(patient: &PatientProfile) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut add = |name: &'static str, offset_days: i64| {
        candidates.push(Candidate { name, offset_days });
    };

    if patient.is_behavioral {
        add(names::BEHAVIORAL_CONTRACT, 2);
        add(names::MEDICATION_ASSESSMENT, 1);
        add(names::DAILY_NURSING_DOCUMENTATION, 0);
        if patient.is_restrained {
            add(names::ASSESSMENT_OF_APPROPRIATENESS, 0);
        }
        if patient.is_behavioral_team {
            add(names::BEHAVIORAL_INTERVENTION_TEAM, 0);
        }
        if patient.age < 65 || !patient.is_geriatric_psych_available {
            add(names::PSYCHIATRY_CONSULT, 2);
        } else {
            add(names::GERIATRIC_PSYCHIATRY_CONSULT, 2);
        }
    }

    if patient.is_guardianship_financial || patient.is_guardianship_person {
        if patient.is_guardianship_emergency {
            add(names::OFFICE_CONTACTED, 1);
            add(names::COURT_PETITION_INITIATED, 2);
        } else {
            add(names::IDENTIFY_GUARDIAN, 3);
            add(names::OFFICE_CONTACTED, 5);
            add(names::COURT_PETITION_INITIATED, 7);
        }
        if patient.is_guardianship_financial {
            add(names::FINANCIAL_INVENTORY, 2);
        }
    }

    if patient.is_ltc {
        add(names::LTC_INITIATE_APPLICATION, 2);
        if patient.is_ltc_medical {
            add(names::LTC_COMPILE_MEDICAL, 5);
        }
        if patient.is_ltc_financial {
            add(names::LTC_FINANCIAL_SCREENING, 3);
        }
    }

    candidates
}
