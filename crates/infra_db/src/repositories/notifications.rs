//! Notification repository
//!
//! Stores staff notifications produced by the background sweeps. Implements
//! the domain's [`NotificationEmitter`] seam so the sweep logic stays
//! ignorant of persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{NotificationId, StaffId};
use domain_tasks::{Notification, NotificationEmitter, TaskError};

use crate::error::DatabaseError;

/// Database row representation of a notification
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository for staff notifications
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Creates a new NotificationRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Stores a notification for a staff member
    pub async fn insert(
        &self,
        staff_id: StaffId,
        notification: &Notification,
        now: DateTime<Utc>,
    ) -> Result<NotificationId, DatabaseError> {
        let id = NotificationId::new_v7();
        sqlx::query(
            r#"
            INSERT INTO notifications (id, staff_id, title, message, is_read, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            "#,
        )
        .bind(id.as_uuid())
        .bind(staff_id.as_uuid())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    /// The most recent notifications for a staff member, newest first
    pub async fn recent_for_staff(
        &self,
        staff_id: StaffId,
        limit: i64,
    ) -> Result<Vec<NotificationRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, NotificationRow>(
            r#"
            SELECT id, staff_id, title, message, is_read, created_at
            FROM notifications
            WHERE staff_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(staff_id.as_uuid())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Marks a notification as read
    pub async fn mark_read(&self, id: NotificationId) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Notification", id));
        }
        Ok(())
    }
}

#[async_trait]
impl NotificationEmitter for NotificationRepository {
    async fn emit(
        &self,
        staff_id: StaffId,
        notification: Notification,
    ) -> Result<(), TaskError> {
        self.insert(staff_id, &notification, Utc::now())
            .await
            .map_err(|e| TaskError::Internal(e.to_string()))?;
        Ok(())
    }
}
