//! Task lifecycle engine
//!
//! Operations on an individual task instance: start, complete, mark missed,
//! follow up, acknowledge, note edits. Every mutating operation re-checks
//! hospital scope and consults the transition table before touching state.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use core_kernel::{HospitalId, StaffId, Timezone};

use crate::catalog::{CourtDateTarget, TaskTemplate};
use crate::error::TaskError;
use crate::instance::{StatusHistoryEntry, TaskInstance, TaskStatus, TransitionContext};
use crate::patient::PatientProfile;
use crate::scheduler::{run_cascade, CascadeInput};

/// Hospital-scoping check applied to every mutating operation
pub fn ensure_hospital_scope(
    patient: &PatientProfile,
    caller_hospital: HospitalId,
) -> Result<(), TaskError> {
    if patient.hospital_id != caller_hospital {
        return Err(TaskError::HospitalMismatch);
    }
    Ok(())
}

fn transition_ctx(instance: &TaskInstance, template: &TaskTemplate) -> TransitionContext {
    TransitionContext {
        has_missed_reason: instance.has_missed_reason(),
        manual_follow_up_eligible: template.is_manual_follow_up(),
    }
}

/// Moves a task into In Progress.
///
/// A Missed task may only be started once a reason has been recorded in its
/// history.
pub fn start(
    instance: &mut TaskInstance,
    template: &TaskTemplate,
    staff_id: StaffId,
    now: DateTime<Utc>,
) -> Result<(), TaskError> {
    if instance.status == TaskStatus::Missed && !instance.has_missed_reason() {
        return Err(TaskError::MissingMissedReason { action: "started" });
    }
    let ctx = transition_ctx(instance, template);
    instance.transition(
        TaskStatus::InProgress,
        &ctx,
        StatusHistoryEntry {
            status: TaskStatus::InProgress,
            timestamp: now,
            staff_id: Some(staff_id),
            reason: None,
            note: None,
        },
    )?;
    instance.started_at = Some(now);
    Ok(())
}

/// Inputs to a completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub staff_id: StaffId,
    /// Local court date/time; required when the template is a court-date task
    pub court_date: Option<NaiveDateTime>,
    /// Admin-supplied date superseding computed recurrence, local calendar date
    pub override_date: Option<NaiveDate>,
    pub timezone: Timezone,
    pub now: DateTime<Utc>,
}

/// What a completion produced: the final status, an optional patient
/// court-date update, and the instances the cascade created
#[derive(Debug)]
pub struct CompletionOutcome {
    pub final_status: TaskStatus,
    pub court_date_update: Option<(CourtDateTarget, DateTime<Utc>)>,
    pub created: Vec<TaskInstance>,
}

/// Completes a task and runs the dependency/recurrence cascade.
///
/// The final status is Completed unless an ideal due date is set and `now`
/// falls after that date's local-day cutoff, in which case it is
/// Delayed Completed. Non-blocking templates complete without a cascade.
///
/// The caller persists the returned outcome atomically: the status write,
/// the created instances, and the court-date update stand or fall together.
pub fn complete(
    instance: &mut TaskInstance,
    template: &TaskTemplate,
    patient: &PatientProfile,
    catalog: &crate::catalog::TaskCatalog,
    active_templates: &std::collections::HashSet<core_kernel::TaskTemplateId>,
    same_template_instance_count: u32,
    req: &CompletionRequest,
) -> Result<CompletionOutcome, TaskError> {
    if instance.status.is_completed() {
        return Err(TaskError::AlreadyCompleted);
    }
    if instance.status == TaskStatus::Missed && !instance.has_missed_reason() {
        return Err(TaskError::MissingMissedReason { action: "completed" });
    }

    let court_date_update = match template.court_date_target {
        Some(target) => {
            let local = req.court_date.ok_or(TaskError::MissingCourtDate)?;
            Some((target, req.timezone.to_utc(local)))
        }
        None => None,
    };

    let final_status = match instance.ideal_due_date {
        Some(ideal) if req.now > req.timezone.end_of_day_containing(ideal) => {
            TaskStatus::DelayedCompleted
        }
        _ => TaskStatus::Completed,
    };

    let ctx = transition_ctx(instance, template);
    instance.transition(
        final_status,
        &ctx,
        StatusHistoryEntry {
            status: final_status,
            timestamp: req.now,
            staff_id: Some(req.staff_id),
            reason: None,
            note: None,
        },
    )?;
    instance.completed_at = Some(req.now);
    if let Some(date) = req.override_date {
        instance.override_due_date = Some(req.timezone.end_of_local_day(date));
    }

    let created = if template.is_non_blocking {
        Vec::new()
    } else {
        run_cascade(CascadeInput {
            completed: instance,
            template,
            patient,
            catalog,
            active_templates,
            same_template_instance_count,
            timezone: req.timezone,
            now: req.now,
        })
    };

    Ok(CompletionOutcome {
        final_status,
        court_date_update,
        created,
    })
}

/// Marks a task Missed.
///
/// The reason may be absent: the automated sweep writes Missed without one,
/// and the reason is supplied later through the start or complete flows,
/// which gate on its presence.
pub fn mark_missed(
    instance: &mut TaskInstance,
    template: &TaskTemplate,
    staff_id: Option<StaffId>,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), TaskError> {
    if instance.status.is_completed() {
        return Err(TaskError::AlreadyCompleted);
    }
    let ctx = transition_ctx(instance, template);
    instance.transition(
        TaskStatus::Missed,
        &ctx,
        StatusHistoryEntry {
            status: TaskStatus::Missed,
            timestamp: now,
            staff_id,
            reason,
            note: None,
        },
    )
}

/// Reschedules a manual-follow-up-eligible task.
///
/// The due date moves to now plus the template's recurrence interval,
/// clamped to end of local day.
pub fn follow_up(
    instance: &mut TaskInstance,
    template: &TaskTemplate,
    staff_id: StaffId,
    reason: &str,
    timezone: Timezone,
    now: DateTime<Utc>,
) -> Result<(), TaskError> {
    if !template.is_manual_follow_up() {
        return Err(TaskError::FollowUpNotEligible);
    }
    let interval = template
        .recurrence_interval_days
        .ok_or(TaskError::FollowUpNotEligible)?;
    if reason.trim().is_empty() {
        return Err(TaskError::MissingFollowUpReason);
    }
    let ctx = transition_ctx(instance, template);
    instance.transition(
        TaskStatus::FollowUp,
        &ctx,
        StatusHistoryEntry {
            status: TaskStatus::FollowUp,
            timestamp: now,
            staff_id: Some(staff_id),
            reason: None,
            note: Some(reason.to_string()),
        },
    )?;
    instance.due_date = Some(timezone.add_days_end_of_day(now, interval));
    Ok(())
}

/// Acknowledges a task, unconditionally
pub fn acknowledge(
    instance: &mut TaskInstance,
    staff_id: StaffId,
    now: DateTime<Utc>,
) -> Result<(), TaskError> {
    instance.transition(
        TaskStatus::Acknowledged,
        &TransitionContext::default(),
        StatusHistoryEntry {
            status: TaskStatus::Acknowledged,
            timestamp: now,
            staff_id: Some(staff_id),
            reason: None,
            note: None,
        },
    )
}

/// Partial note/metadata update; omitted fields keep their current value.
/// No state-machine interaction.
pub fn update_note(
    instance: &mut TaskInstance,
    task_note: Option<String>,
    include_note_in_report: Option<bool>,
    contact_info: Option<String>,
    now: DateTime<Utc>,
) {
    if let Some(note) = task_note {
        instance.task_note = Some(note);
    }
    if let Some(include) = include_note_in_report {
        instance.include_note_in_report = include;
    }
    if let Some(contact) = contact_info {
        instance.contact_info = Some(contact);
    }
    instance.updated_at = now;
}
