//! Notification emitter boundary
//!
//! The engine emits notifications (missed-task alerts, court-date
//! reminders); delivery and durable recording are the adapter's concern.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{PatientId, StaffId};

use crate::error::TaskError;

/// A notification payload addressed to a staff member
#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Alert sent to the assigned staff when the auto-miss sweep marks a
    /// task Missed
    pub fn task_missed(
        task_name: &str,
        patient_id: PatientId,
        due_date: Option<DateTime<Utc>>,
    ) -> Self {
        let message = match due_date {
            Some(due) => format!(
                "Task \"{task_name}\" for patient {patient_id} was due {} and has been marked Missed",
                due.to_rfc3339()
            ),
            None => format!(
                "Task \"{task_name}\" for patient {patient_id} has been marked Missed"
            ),
        };
        Self::new(format!("Task missed: {task_name}"), message)
    }

    /// Reminder for a court date inside the reminder window
    pub fn court_date_reminder(kind: &str, patient_id: PatientId, when: DateTime<Utc>) -> Self {
        Self::new(
            format!("{kind} approaching"),
            format!(
                "Patient {patient_id} has a {} scheduled for {}",
                kind.to_lowercase(),
                when.to_rfc3339()
            ),
        )
    }
}

/// Outbound notification delivery plus durable record
#[async_trait]
pub trait NotificationEmitter: Send + Sync {
    async fn emit(&self, staff_id: StaffId, notification: Notification) -> Result<(), TaskError>;
}
