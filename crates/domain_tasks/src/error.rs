//! Task domain errors

use thiserror::Error;

/// Errors that can occur in the task workflow domain
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(String),

    #[error("Task belongs to a different hospital")]
    HospitalMismatch,

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("A missed task requires a recorded reason before it can be {action}")]
    MissingMissedReason { action: &'static str },

    #[error("A court date is required to complete this task")]
    MissingCourtDate,

    #[error("Task is not eligible for manual follow-up")]
    FollowUpNotEligible,

    #[error("A follow-up reason is required")]
    MissingFollowUpReason,

    #[error("Task is already completed")]
    AlreadyCompleted,

    #[error("Internal error: {0}")]
    Internal(String),
}
