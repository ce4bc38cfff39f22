//! Dependency and recurrence scheduling
//!
//! Runs after a non-non-blocking completion. Two independent sub-algorithms:
//! same-task recurrence, then dependent-task unlocking. All date arithmetic
//! goes through the timezone resolver so the results are absolute instants
//! clamped to end of local day.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::debug;

use core_kernel::{TaskTemplateId, Timezone};

use crate::catalog::{names, TaskCatalog, TaskTemplate};
use crate::instance::TaskInstance;
use crate::patient::PatientProfile;

/// Everything the cascade needs to decide what to create
pub struct CascadeInput<'a> {
    /// The just-completed instance (already transitioned)
    pub completed: &'a TaskInstance,
    pub template: &'a TaskTemplate,
    pub patient: &'a PatientProfile,
    pub catalog: &'a TaskCatalog,
    /// Templates with a Pending/In Progress instance for this patient
    pub active_templates: &'a HashSet<TaskTemplateId>,
    /// How many instances have ever been created for (patient, template),
    /// including the completed one; bounds recurrence via max_repeats
    pub same_template_instance_count: u32,
    pub timezone: Timezone,
    pub now: DateTime<Utc>,
}

/// Computes the instances a completion creates: the recurrence of the same
/// template, then any unlocked dependents
pub fn run_cascade(input: CascadeInput<'_>) -> Vec<TaskInstance> {
    let mut created = Vec::new();
    if let Some(instance) = recur_same_task(&input) {
        created.push(instance);
    }
    unlock_dependents(&input, &mut created);
    created
}

/// Same-task recurrence.
///
/// Applies to repeating templates with an interval, while the patient is
/// still admitted, excluding manual-follow-up templates. The ideal due date
/// advances from its own prior value, not from completion time, so slippage
/// never propagates into the ideal baseline. An override date short-circuits
/// both dates.
fn recur_same_task(input: &CascadeInput<'_>) -> Option<TaskInstance> {
    let template = input.template;
    let interval = match (template.is_repeating, template.recurrence_interval_days) {
        (true, Some(days)) => days,
        _ => return None,
    };
    if !input.patient.is_admitted() || template.is_manual_follow_up() {
        return None;
    }
    if let Some(cap) = template.max_repeats {
        if input.same_template_instance_count >= cap {
            debug!(template = %template.name, cap, "recurrence stopped at repeat cap");
            return None;
        }
    }

    let completed_at = input.completed.completed_at.unwrap_or(input.now);
    let (next_due, next_ideal) = match input.completed.override_due_date {
        Some(override_date) => (override_date, override_date),
        None => {
            let prior_ideal = input.completed.ideal_due_date.unwrap_or(input.now);
            (
                input.timezone.add_days_end_of_day(completed_at, interval),
                input.timezone.add_days_end_of_day(prior_ideal, interval),
            )
        }
    };

    Some(TaskInstance::new(
        input.patient.id,
        template.id,
        Some(next_due),
        Some(next_ideal),
        input.now,
    ))
}

/// Dependent-task unlocking with conditional skip rules
fn unlock_dependents(input: &CascadeInput<'_>, created: &mut Vec<TaskInstance>) {
    let completed_at = input.completed.completed_at.unwrap_or(input.now);

    for dep_id in input.catalog.dependents_of(input.template.id) {
        let Some(dep) = input.catalog.get(*dep_id) else {
            continue;
        };
        if input.active_templates.contains(dep_id) {
            continue;
        }
        if should_skip(dep, input.patient) {
            debug!(template = %dep.name, "dependent skipped by patient condition");
            continue;
        }
        if dep.is_non_blocking {
            created.push(TaskInstance::new_unscheduled(
                input.patient.id,
                dep.id,
                input.now,
            ));
            continue;
        }

        let ideal_base = input.completed.ideal_due_date.unwrap_or(input.now);
        let dates = match input.completed.override_due_date {
            Some(override_date) => Some((override_date, override_date)),
            None => match (dep.is_repeating, dep.recurrence_interval_days, dep.due_in_days_after_dependency) {
                (true, Some(interval), None) => Some((
                    input.timezone.add_days_end_of_day(completed_at, interval),
                    input.timezone.add_days_end_of_day(ideal_base, interval),
                )),
                (_, _, Some(offset)) => Some((
                    input.timezone.add_days_end_of_day(completed_at, offset),
                    input.timezone.add_days_end_of_day(ideal_base, offset),
                )),
                _ => None,
            },
        };

        match dates {
            Some((due, ideal)) => created.push(TaskInstance::new(
                input.patient.id,
                dep.id,
                Some(due),
                Some(ideal),
                input.now,
            )),
            None => {
                debug!(template = %dep.name, "dependent has no schedulable dates; skipped");
            }
        }
    }
}

/// Domain-specific conditional skips tied to specific template names
fn should_skip(dep: &TaskTemplate, patient: &PatientProfile) -> bool {
    match dep.name.as_str() {
        names::LTC_COMPILE_FINANCIAL => patient.is_ltc_medical && !patient.is_ltc_financial,
        names::LTC_FOLLOW_UP_STATE => patient.is_ltc_financial,
        names::CONFIRM_GUARDIANSHIP_APPOINTED => !patient.is_guardianship_emergency,
        _ => false,
    }
}
