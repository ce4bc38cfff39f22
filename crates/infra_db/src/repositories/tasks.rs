//! Task instance repository
//!
//! Persists task instances with their append-only status history stored as
//! JSONB. Status writes are guarded: the caller states the status it read,
//! and an update that no longer matches surfaces as a conflict.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use core_kernel::{HospitalId, PatientId, TaskInstanceId, TaskTemplateId};
use domain_tasks::catalog::CourtDateTarget;
use domain_tasks::{StatusHistoryEntry, TaskInstance, TaskStatus};

use crate::error::DatabaseError;

/// Serializes a task status to its database representation
pub fn status_to_str(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Completed => "completed",
        TaskStatus::DelayedCompleted => "delayed_completed",
        TaskStatus::Missed => "missed",
        TaskStatus::FollowUp => "follow_up",
        TaskStatus::Acknowledged => "acknowledged",
    }
}

/// Parses a task status from its database representation
pub fn status_from_str(s: &str) -> Result<TaskStatus, DatabaseError> {
    match s {
        "pending" => Ok(TaskStatus::Pending),
        "in_progress" => Ok(TaskStatus::InProgress),
        "completed" => Ok(TaskStatus::Completed),
        "delayed_completed" => Ok(TaskStatus::DelayedCompleted),
        "missed" => Ok(TaskStatus::Missed),
        "follow_up" => Ok(TaskStatus::FollowUp),
        "acknowledged" => Ok(TaskStatus::Acknowledged),
        other => Err(DatabaseError::SerializationError(format!(
            "unknown task status '{other}'"
        ))),
    }
}

/// Database row representation of a task instance
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TaskRow {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub template_id: Uuid,
    pub status: String,
    pub due_date: Option<DateTime<Utc>>,
    pub ideal_due_date: Option<DateTime<Utc>>,
    pub override_due_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status_history: Json<Vec<StatusHistoryEntry>>,
    pub task_note: Option<String>,
    pub contact_info: Option<String>,
    pub include_note_in_report: bool,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRow {
    /// Converts the row into its domain representation
    pub fn into_instance(self) -> Result<TaskInstance, DatabaseError> {
        Ok(TaskInstance {
            id: TaskInstanceId::from_uuid(self.id),
            patient_id: PatientId::from_uuid(self.patient_id),
            template_id: TaskTemplateId::from_uuid(self.template_id),
            status: status_from_str(&self.status)?,
            due_date: self.due_date,
            ideal_due_date: self.ideal_due_date,
            override_due_date: self.override_due_date,
            started_at: self.started_at,
            completed_at: self.completed_at,
            status_history: self.status_history.0,
            task_note: self.task_note,
            contact_info: self.contact_info,
            include_note_in_report: self.include_note_in_report,
            is_visible: self.is_visible,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_TASK: &str = r#"
    SELECT id, patient_id, template_id, status, due_date, ideal_due_date,
           override_due_date, started_at, completed_at, status_history,
           task_note, contact_info, include_note_in_report, is_visible,
           created_at, updated_at
    FROM task_instances
"#;

// Discharged patients and hidden tasks never enter the priority queue
const PRIORITY_TASKS_SQL: &str = r#"
    SELECT t.id, t.patient_id, t.template_id, t.status, t.due_date,
           t.ideal_due_date, t.override_due_date, t.started_at,
           t.completed_at, t.status_history, t.task_note,
           t.contact_info, t.include_note_in_report, t.is_visible,
           t.created_at, t.updated_at
    FROM task_instances t
    JOIN patients p ON p.id = t.patient_id
    WHERE p.hospital_id = $1
      AND p.status = 'admitted'
      AND t.is_visible
      AND t.status IN ('pending', 'in_progress', 'follow_up')
      AND t.due_date IS NOT NULL
      AND t.due_date <= $2
    ORDER BY t.due_date ASC
"#;

/// Repository for task instance persistence
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Creates a new TaskRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a task instance by id
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such instance exists
    pub async fn find_by_id(&self, id: TaskInstanceId) -> Result<TaskInstance, DatabaseError> {
        let query = format!("{SELECT_TASK} WHERE id = $1");
        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Task", id))?;
        row.into_instance()
    }

    /// Retrieves all visible task instances for a patient, soonest due first
    pub async fn find_by_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<TaskInstance>, DatabaseError> {
        let query = format!(
            "{SELECT_TASK} WHERE patient_id = $1 AND is_visible ORDER BY due_date ASC NULLS LAST"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&query)
            .bind(patient_id.as_uuid())
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TaskRow::into_instance).collect()
    }

    /// Template ids with a currently active instance for the patient
    pub async fn active_template_ids(
        &self,
        patient_id: PatientId,
    ) -> Result<HashSet<TaskTemplateId>, DatabaseError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT template_id FROM task_instances
            WHERE patient_id = $1
              AND status IN ('pending', 'in_progress', 'missed', 'follow_up')
            "#,
        )
        .bind(patient_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(TaskTemplateId::from_uuid).collect())
    }

    /// Template ids that have ever had an instance for the patient
    pub async fn existing_template_ids(
        &self,
        patient_id: PatientId,
    ) -> Result<HashSet<TaskTemplateId>, DatabaseError> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT DISTINCT template_id FROM task_instances WHERE patient_id = $1",
        )
        .bind(patient_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(ids.into_iter().map(TaskTemplateId::from_uuid).collect())
    }

    /// How many instances have ever been created for a (patient, template)
    /// pair; bounds recurrence
    pub async fn count_for_template(
        &self,
        patient_id: PatientId,
        template_id: TaskTemplateId,
    ) -> Result<u32, DatabaseError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM task_instances WHERE patient_id = $1 AND template_id = $2",
        )
        .bind(patient_id.as_uuid())
        .bind(template_id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u32)
    }

    /// Inserts a batch of new task instances in a single transaction
    pub async fn insert_many(&self, instances: &[TaskInstance]) -> Result<(), DatabaseError> {
        if instances.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for instance in instances {
            insert_in_tx(&mut tx, instance).await?;
        }
        tx.commit().await?;
        debug!(count = instances.len(), "inserted task instances");
        Ok(())
    }

    /// Persists an updated instance, guarded by the status the caller read.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Conflict` if the row no longer carries
    /// `expected`, and `DatabaseError::NotFound` if the row does not exist.
    pub async fn save(
        &self,
        instance: &TaskInstance,
        expected: TaskStatus,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        update_guarded(&mut tx, instance, expected).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Applies a completion atomically: the guarded status write, the
    /// instances the cascade created, and the patient court-date update
    /// stand or fall together.
    pub async fn apply_completion(
        &self,
        instance: &TaskInstance,
        expected: TaskStatus,
        created: &[TaskInstance],
        court_date_update: Option<(CourtDateTarget, DateTime<Utc>)>,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        update_guarded(&mut tx, instance, expected).await?;
        for new_instance in created {
            insert_in_tx(&mut tx, new_instance).await?;
        }
        if let Some((target, instant)) = court_date_update {
            let column = match target {
                CourtDateTarget::Guardianship => "guardianship_court_datetime",
                CourtDateTarget::Ltc => "ltc_court_datetime",
            };
            let query =
                format!("UPDATE patients SET {column} = $1, updated_at = $2 WHERE id = $3");
            sqlx::query(&query)
                .bind(instant)
                .bind(instance.updated_at)
                .bind(instance.patient_id.as_uuid())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(
            task = %instance.id,
            created = created.len(),
            "completion persisted"
        );
        Ok(())
    }

    /// Visible active tasks of admitted patients in a hospital, due at or
    /// before the horizon, soonest first; backs the priority work queue
    pub async fn priority_tasks(
        &self,
        hospital_id: HospitalId,
        horizon: DateTime<Utc>,
    ) -> Result<Vec<TaskInstance>, DatabaseError> {
        let rows = sqlx::query_as::<_, TaskRow>(PRIORITY_TASKS_SQL)
            .bind(hospital_id.as_uuid())
            .bind(horizon)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TaskRow::into_instance).collect()
    }

    /// Missed tasks for a hospital whose latest Missed entry has no reason
    /// recorded yet
    pub async fn missed_without_reason(
        &self,
        hospital_id: HospitalId,
    ) -> Result<Vec<TaskInstance>, DatabaseError> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT t.id, t.patient_id, t.template_id, t.status, t.due_date,
                   t.ideal_due_date, t.override_due_date, t.started_at,
                   t.completed_at, t.status_history, t.task_note,
                   t.contact_info, t.include_note_in_report, t.is_visible,
                   t.created_at, t.updated_at
            FROM task_instances t
            JOIN patients p ON p.id = t.patient_id
            WHERE p.hospital_id = $1 AND t.status = 'missed'
            ORDER BY t.due_date ASC NULLS LAST
            "#,
        )
        .bind(hospital_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        // The reason lives inside the JSONB history; filter after decoding
        let instances: Result<Vec<_>, _> =
            rows.into_iter().map(TaskRow::into_instance).collect();
        Ok(instances?
            .into_iter()
            .filter(|i| !i.has_missed_reason())
            .collect())
    }

    /// Active tasks across all hospitals whose due date is at or before the
    /// cutoff; input to the auto-miss sweep
    pub async fn due_for_auto_miss(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<TaskInstance>, DatabaseError> {
        let query = format!(
            "{SELECT_TASK} WHERE status IN ('pending', 'in_progress') \
             AND due_date IS NOT NULL AND due_date <= $1"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&query)
            .bind(cutoff)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(TaskRow::into_instance).collect()
    }
}

async fn insert_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    instance: &TaskInstance,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO task_instances (
            id, patient_id, template_id, status, due_date, ideal_due_date,
            override_due_date, started_at, completed_at, status_history,
            task_note, contact_info, include_note_in_report, is_visible,
            created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
        "#,
    )
    .bind(instance.id.as_uuid())
    .bind(instance.patient_id.as_uuid())
    .bind(instance.template_id.as_uuid())
    .bind(status_to_str(instance.status))
    .bind(instance.due_date)
    .bind(instance.ideal_due_date)
    .bind(instance.override_due_date)
    .bind(instance.started_at)
    .bind(instance.completed_at)
    .bind(Json(&instance.status_history))
    .bind(&instance.task_note)
    .bind(&instance.contact_info)
    .bind(instance.include_note_in_report)
    .bind(instance.is_visible)
    .bind(instance.created_at)
    .bind(instance.updated_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

async fn update_guarded(
    tx: &mut Transaction<'_, Postgres>,
    instance: &TaskInstance,
    expected: TaskStatus,
) -> Result<(), DatabaseError> {
    let result = sqlx::query(
        r#"
        UPDATE task_instances
        SET status = $1, due_date = $2, ideal_due_date = $3,
            override_due_date = $4, started_at = $5, completed_at = $6,
            status_history = $7, task_note = $8, contact_info = $9,
            include_note_in_report = $10, is_visible = $11, updated_at = $12
        WHERE id = $13 AND status = $14
        "#,
    )
    .bind(status_to_str(instance.status))
    .bind(instance.due_date)
    .bind(instance.ideal_due_date)
    .bind(instance.override_due_date)
    .bind(instance.started_at)
    .bind(instance.completed_at)
    .bind(Json(&instance.status_history))
    .bind(&instance.task_note)
    .bind(&instance.contact_info)
    .bind(instance.include_note_in_report)
    .bind(instance.is_visible)
    .bind(instance.updated_at)
    .bind(instance.id.as_uuid())
    .bind(status_to_str(expected))
    .execute(&mut **tx)
    .await?;

    if result.rows_affected() == 0 {
        let exists: Option<i32> =
            sqlx::query_scalar("SELECT 1 FROM task_instances WHERE id = $1")
                .bind(instance.id.as_uuid())
                .fetch_optional(&mut **tx)
                .await?;
        return Err(match exists {
            Some(_) => DatabaseError::conflict("Task", instance.id),
            None => DatabaseError::not_found("Task", instance.id),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::DelayedCompleted,
            TaskStatus::Missed,
            TaskStatus::FollowUp,
            TaskStatus::Acknowledged,
        ] {
            assert_eq!(status_from_str(status_to_str(status)).unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_is_a_serialization_error() {
        let err = status_from_str("archived").unwrap_err();
        assert!(matches!(err, DatabaseError::SerializationError(_)));
    }

    #[test]
    fn test_priority_query_is_limited_to_admitted_visible_tasks() {
        assert!(PRIORITY_TASKS_SQL.contains("p.status = 'admitted'"));
        assert!(PRIORITY_TASKS_SQL.contains("t.is_visible"));
        assert!(PRIORITY_TASKS_SQL.contains("t.due_date <= $2"));
    }
}
