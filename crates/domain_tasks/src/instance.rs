//! Task instance - a concrete per-patient occurrence of a template
//!
//! Owns the status state machine and the append-only status history. All
//! transitions go through a single transition table so the machine is
//! testable in isolation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{PatientId, StaffId, TaskInstanceId, TaskTemplateId};

use crate::error::TaskError;

/// Task instance status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    /// Completed after the ideal due date's local-day cutoff
    DelayedCompleted,
    Missed,
    FollowUp,
    Acknowledged,
}

impl TaskStatus {
    /// Active statuses block creation of a second instance for the same
    /// (patient, template) pair
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            TaskStatus::Pending | TaskStatus::InProgress | TaskStatus::Missed | TaskStatus::FollowUp
        )
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::DelayedCompleted)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Completed => "Completed",
            TaskStatus::DelayedCompleted => "Delayed Completed",
            TaskStatus::Missed => "Missed",
            TaskStatus::FollowUp => "Follow Up",
            TaskStatus::Acknowledged => "Acknowledged",
        };
        write!(f, "{s}")
    }
}

/// One entry in the append-only status history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub status: TaskStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staff_id: Option<StaffId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Context consulted by the transition table
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionContext {
    /// The latest Missed history entry carries a non-empty reason
    pub has_missed_reason: bool,
    /// The template is repeating with a dependency offset
    pub manual_follow_up_eligible: bool,
}

/// The single transition table governing every lifecycle operation.
///
/// Missed tasks may only move forward once a reason has been recorded;
/// follow-up is reserved for manual-follow-up-eligible templates;
/// acknowledgment is unconditional.
pub fn can_transition(from: TaskStatus, to: TaskStatus, ctx: &TransitionContext) -> bool {
    use TaskStatus::*;
    match (from, to) {
        (Pending | FollowUp, InProgress) => true,
        (Missed, InProgress) => ctx.has_missed_reason,
        (Pending | InProgress | FollowUp, Completed | DelayedCompleted) => true,
        (Missed, Completed | DelayedCompleted) => ctx.has_missed_reason,
        (Pending | InProgress | Missed | FollowUp, Missed) => true,
        (from, FollowUp) if from.is_active() => ctx.manual_follow_up_eligible,
        (_, Acknowledged) => true,
        _ => false,
    }
}

/// A concrete per-patient occurrence of a task template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: TaskInstanceId,
    pub patient_id: PatientId,
    pub template_id: TaskTemplateId,
    pub status: TaskStatus,
    /// Absent for non-blocking tasks with no schedule
    pub due_date: Option<DateTime<Utc>>,
    /// The never-slipping reference date used to project timelines
    pub ideal_due_date: Option<DateTime<Utc>>,
    /// Admin-supplied date superseding computed recurrence for one cascade step
    pub override_due_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status_history: Vec<StatusHistoryEntry>,
    pub task_note: Option<String>,
    pub contact_info: Option<String>,
    pub include_note_in_report: bool,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskInstance {
    /// Creates a new Pending instance with the given schedule
    pub fn new(
        patient_id: PatientId,
        template_id: TaskTemplateId,
        due_date: Option<DateTime<Utc>>,
        ideal_due_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TaskInstanceId::new_v7(),
            patient_id,
            template_id,
            status: TaskStatus::Pending,
            due_date,
            ideal_due_date,
            override_due_date: None,
            started_at: None,
            completed_at: None,
            status_history: vec![StatusHistoryEntry {
                status: TaskStatus::Pending,
                timestamp: now,
                staff_id: None,
                reason: None,
                note: None,
            }],
            task_note: None,
            contact_info: None,
            include_note_in_report: false,
            is_visible: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a non-blocking instance with no schedule
    pub fn new_unscheduled(
        patient_id: PatientId,
        template_id: TaskTemplateId,
        now: DateTime<Utc>,
    ) -> Self {
        Self::new(patient_id, template_id, None, None, now)
    }

    /// True when the latest Missed history entry carries a non-empty reason
    pub fn has_missed_reason(&self) -> bool {
        self.status_history
            .iter()
            .rev()
            .find(|entry| entry.status == TaskStatus::Missed)
            .and_then(|entry| entry.reason.as_deref())
            .is_some_and(|reason| !reason.trim().is_empty())
    }

    /// Applies a status transition, consulting the transition table and
    /// appending exactly one history entry
    pub fn transition(
        &mut self,
        to: TaskStatus,
        ctx: &TransitionContext,
        entry: StatusHistoryEntry,
    ) -> Result<(), TaskError> {
        if !can_transition(self.status, to, ctx) {
            return Err(TaskError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }
        self.status = to;
        self.updated_at = entry.timestamp;
        self.status_history.push(entry);
        Ok(())
    }
}
