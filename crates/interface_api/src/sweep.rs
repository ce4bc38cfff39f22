//! Background sweeps
//!
//! Two periodic jobs drive the workflow forward without staff input: the
//! auto-miss sweep marks overdue tasks Missed after the local-afternoon
//! cutoff, and the court-date reminder notifies assigned staff of hearings
//! inside the reminder window. Both jobs log and continue on per-item
//! failures so one bad row never stalls the rest of the sweep.

use chrono::Utc;
use std::time::Duration;
use tracing::{error, info, warn};

use core_kernel::Timezone;
use domain_tasks::catalog::CourtDateTarget;
use domain_tasks::{lifecycle, sweep, Notification, NotificationEmitter, TaskInstance, TaskTemplate};

use crate::AppState;

/// Spawns both sweep loops onto the runtime
pub fn spawn_sweeps(state: AppState) {
    let auto_miss_state = state.clone();
    let auto_miss_every = Duration::from_secs(state.config.auto_miss_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(auto_miss_every);
        loop {
            ticker.tick().await;
            if let Err(e) = run_auto_miss(&auto_miss_state).await {
                error!(error = %e, "auto-miss sweep failed");
            }
        }
    });

    let reminder_every = Duration::from_secs(state.config.court_reminder_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(reminder_every);
        loop {
            ticker.tick().await;
            if let Err(e) = run_court_date_reminders(&state).await {
                error!(error = %e, "court-date reminder sweep failed");
            }
        }
    });
}

/// Marks overdue active tasks Missed, without a reason, and alerts the
/// assigned staff; the reason arrives later through the staff-facing flows,
/// which gate on it
pub async fn run_auto_miss(state: &AppState) -> Result<(), crate::error::ApiError> {
    let now = Utc::now();
    let Some(cutoff) = sweep::auto_miss_cutoff(now, Timezone::default()) else {
        return Ok(());
    };

    let candidates = state.tasks.due_for_auto_miss(cutoff).await?;
    let mut missed = 0usize;
    for mut instance in candidates {
        if !sweep::is_overdue(&instance, cutoff) {
            continue;
        }
        let Some(template) = state.catalog.get(instance.template_id) else {
            warn!(task = %instance.id, "skipping task with unknown template");
            continue;
        };
        let expected = instance.status;
        if let Err(e) = lifecycle::mark_missed(&mut instance, template, None, None, now) {
            warn!(task = %instance.id, error = %e, "could not auto-miss task");
            continue;
        }
        match state.tasks.save(&instance, expected).await {
            Ok(()) => {
                missed += 1;
                notify_assigned_staff(state, &instance, template).await;
            }
            // A lost race means a staff member acted on the task mid-sweep
            Err(e) if e.is_conflict() => {
                info!(task = %instance.id, "task changed during sweep, leaving as-is")
            }
            Err(e) => warn!(task = %instance.id, error = %e, "could not persist auto-miss"),
        }
    }

    if missed > 0 {
        info!(count = missed, "auto-miss sweep marked tasks Missed");
    }
    Ok(())
}

/// Alerts the patient's assigned staff member about an auto-missed task;
/// patients without assigned staff produce no alert
async fn notify_assigned_staff(state: &AppState, instance: &TaskInstance, template: &TaskTemplate) {
    let patient = match state.patients.find_by_id(instance.patient_id).await {
        Ok(patient) => patient,
        Err(e) => {
            warn!(task = %instance.id, error = %e, "could not load patient for missed-task alert");
            return;
        }
    };
    let Some(staff_id) = patient.assigned_staff_id else {
        return;
    };
    let notification = Notification::task_missed(&template.name, patient.id, instance.due_date);
    if let Err(e) = state.notifications.emit(staff_id, notification).await {
        warn!(task = %instance.id, error = %e, "could not emit missed-task alert");
    }
}

/// Notifies assigned staff of court dates inside the reminder window
pub async fn run_court_date_reminders(state: &AppState) -> Result<(), crate::error::ApiError> {
    let now = Utc::now();
    let patients = state.patients.admitted_profiles().await?;

    for patient in patients {
        let Some(staff_id) = patient.assigned_staff_id else {
            continue;
        };
        for (target, when) in sweep::court_dates_due_soon(&patient, now) {
            let kind = match target {
                CourtDateTarget::Guardianship => "Guardianship hearing",
                CourtDateTarget::Ltc => "LTC state hearing",
            };
            let notification = Notification::court_date_reminder(kind, patient.id, when);
            if let Err(e) = state.notifications.emit(staff_id, notification).await {
                warn!(patient = %patient.id, error = %e, "could not emit court-date reminder");
            }
        }
    }
    Ok(())
}
