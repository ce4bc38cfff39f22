//! Task DTOs

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_tasks::{StatusHistoryEntry, TaskInstance, TaskTemplate};

#[derive(Debug, Deserialize)]
pub struct CompleteTaskRequest {
    /// Local court date/time; required for court-date tasks
    pub court_date: Option<NaiveDateTime>,
    /// Local calendar date superseding computed recurrence (admin only)
    pub override_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MissedTaskRequest {
    #[validate(length(min = 1, message = "missed_reason must not be empty"))]
    pub missed_reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FollowUpRequest {
    #[validate(length(min = 1, message = "reason must not be empty"))]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    pub task_note: Option<String>,
    pub include_note_in_report: Option<bool>,
    pub contact_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub patient_id: String,
    pub template_id: Uuid,
    pub name: String,
    pub category: String,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    pub ideal_due_date: Option<DateTime<Utc>>,
    pub override_due_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status_history: Vec<StatusHistoryEntry>,
    pub task_note: Option<String>,
    pub contact_info: Option<String>,
    pub include_note_in_report: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskResponse {
    /// Builds a response from an instance and its template
    pub fn from_parts(instance: TaskInstance, template: &TaskTemplate) -> Self {
        Self {
            id: instance.id.to_string(),
            patient_id: instance.patient_id.to_string(),
            template_id: *instance.template_id.as_uuid(),
            name: template.name.clone(),
            category: template.category.clone(),
            status: instance.status.to_string(),
            due_date: instance.due_date,
            ideal_due_date: instance.ideal_due_date,
            override_due_date: instance.override_due_date,
            started_at: instance.started_at,
            completed_at: instance.completed_at,
            status_history: instance.status_history,
            task_note: instance.task_note,
            contact_info: instance.contact_info,
            include_note_in_report: instance.include_note_in_report,
            created_at: instance.created_at,
            updated_at: instance.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AssignTasksResponse {
    pub created: Vec<TaskResponse>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
