//! Staff notification handlers

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use core_kernel::NotificationId;

use crate::auth::Claims;
use crate::dto::notifications::NotificationResponse;
use crate::dto::tasks::MessageResponse;
use crate::error::ApiError;
use crate::AppState;

const RECENT_LIMIT: i64 = 50;

/// The caller's most recent notifications, newest first
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<NotificationResponse>>, ApiError> {
    let staff_id = claims.staff_id().map_err(|_| ApiError::Unauthorized)?;
    let rows = state
        .notifications
        .recent_for_staff(staff_id, RECENT_LIMIT)
        .await?;
    Ok(Json(rows.into_iter().map(NotificationResponse::from).collect()))
}

/// Marks a notification as read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .notifications
        .mark_read(NotificationId::from_uuid(id))
        .await?;
    Ok(Json(MessageResponse {
        message: "notification marked read".to_string(),
    }))
}
