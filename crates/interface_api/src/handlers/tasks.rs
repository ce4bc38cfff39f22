//! Task lifecycle handlers
//!
//! Each mutating handler follows the same shape: load the instance, its
//! template, and the owning patient; enforce hospital scope; run the domain
//! operation; persist with the status guard. A guard failure surfaces as a
//! 409 and the client retries from fresh state.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use core_kernel::TaskInstanceId;
use domain_tasks::lifecycle::{self, CompletionRequest};
use domain_tasks::{PatientProfile, TaskInstance, TaskTemplate};

use crate::auth::Claims;
use crate::dto::tasks::*;
use crate::error::ApiError;
use crate::extract::timezone_from_headers;
use crate::AppState;

/// Loads a task with its template and patient, enforcing hospital scope
async fn load_scoped(
    state: &AppState,
    claims: &Claims,
    id: Uuid,
) -> Result<(TaskInstance, &'static TaskTemplate, PatientProfile), ApiError> {
    let instance = state
        .tasks
        .find_by_id(TaskInstanceId::from_uuid(id))
        .await?;
    let template = state
        .catalog
        .get(instance.template_id)
        .ok_or_else(|| ApiError::Internal("task references unknown template".to_string()))?;
    let patient = state.patients.find_by_id(instance.patient_id).await?;
    lifecycle::ensure_hospital_scope(&patient, claims.hospital_id())?;
    Ok((instance, template, patient))
}

/// Gets a task by ID
pub async fn get_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let (instance, template, _patient) = load_scoped(&state, &claims, id).await?;
    Ok(Json(TaskResponse::from_parts(instance, template)))
}

/// Moves a task into In Progress
pub async fn start_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let (mut instance, template, _patient) = load_scoped(&state, &claims, id).await?;
    let staff_id = claims.staff_id().map_err(|_| ApiError::Unauthorized)?;

    let expected = instance.status;
    lifecycle::start(&mut instance, template, staff_id, Utc::now())?;
    state.tasks.save(&instance, expected).await?;

    Ok(Json(TaskResponse::from_parts(instance, template)))
}

/// Completes a task and runs the dependency/recurrence cascade
pub async fn complete_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let (mut instance, template, patient) = load_scoped(&state, &claims, id).await?;
    let staff_id = claims.staff_id().map_err(|_| ApiError::Unauthorized)?;

    if request.override_date.is_some() && !claims.is_admin {
        return Err(ApiError::Forbidden(
            "Only administrators may override the next due date".to_string(),
        ));
    }

    let active = state.tasks.active_template_ids(instance.patient_id).await?;
    let count = state
        .tasks
        .count_for_template(instance.patient_id, instance.template_id)
        .await?;

    let expected = instance.status;
    let outcome = lifecycle::complete(
        &mut instance,
        template,
        &patient,
        state.catalog,
        &active,
        count,
        &CompletionRequest {
            staff_id,
            court_date: request.court_date,
            override_date: request.override_date,
            timezone: timezone_from_headers(&headers),
            now: Utc::now(),
        },
    )?;

    state
        .tasks
        .apply_completion(&instance, expected, &outcome.created, outcome.court_date_update)
        .await?;

    Ok(Json(TaskResponse::from_parts(instance, template)))
}

/// Marks a task Missed, optionally recording a reason
pub async fn miss_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<MissedTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    request.validate()?;
    let (mut instance, template, _patient) = load_scoped(&state, &claims, id).await?;
    let staff_id = claims.staff_id().map_err(|_| ApiError::Unauthorized)?;

    let expected = instance.status;
    lifecycle::mark_missed(
        &mut instance,
        template,
        Some(staff_id),
        request.missed_reason,
        Utc::now(),
    )?;
    state.tasks.save(&instance, expected).await?;

    Ok(Json(TaskResponse::from_parts(instance, template)))
}

/// Reschedules a manual-follow-up-eligible task
pub async fn follow_up_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(request): Json<FollowUpRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    request.validate()?;
    let (mut instance, template, _patient) = load_scoped(&state, &claims, id).await?;
    let staff_id = claims.staff_id().map_err(|_| ApiError::Unauthorized)?;

    let expected = instance.status;
    lifecycle::follow_up(
        &mut instance,
        template,
        staff_id,
        &request.reason,
        timezone_from_headers(&headers),
        Utc::now(),
    )?;
    state.tasks.save(&instance, expected).await?;

    Ok(Json(TaskResponse::from_parts(instance, template)))
}

/// Acknowledges a task
pub async fn acknowledge_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<TaskResponse>, ApiError> {
    let (mut instance, template, _patient) = load_scoped(&state, &claims, id).await?;
    let staff_id = claims.staff_id().map_err(|_| ApiError::Unauthorized)?;

    let expected = instance.status;
    lifecycle::acknowledge(&mut instance, staff_id, Utc::now())?;
    state.tasks.save(&instance, expected).await?;

    Ok(Json(TaskResponse::from_parts(instance, template)))
}

/// Updates a task's note fields; no state-machine interaction
pub async fn update_task(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let (mut instance, template, _patient) = load_scoped(&state, &claims, id).await?;

    let expected = instance.status;
    lifecycle::update_note(
        &mut instance,
        request.task_note,
        request.include_note_in_report,
        request.contact_info,
        Utc::now(),
    );
    state.tasks.save(&instance, expected).await?;

    Ok(Json(TaskResponse::from_parts(instance, template)))
}

/// Active tasks for the caller's hospital due within the priority horizon
pub async fn priority_tasks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let timezone = timezone_from_headers(&headers);
    let horizon =
        timezone.add_days_end_of_day(Utc::now(), state.config.priority_horizon_days);
    let instances = state
        .tasks
        .priority_tasks(claims.hospital_id(), horizon)
        .await?;
    Ok(Json(to_responses(&state, instances)?))
}

/// Missed tasks for the caller's hospital still awaiting a reason
pub async fn missed_tasks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let instances = state
        .tasks
        .missed_without_reason(claims.hospital_id())
        .await?;
    Ok(Json(to_responses(&state, instances)?))
}

pub(crate) fn to_responses(
    state: &AppState,
    instances: Vec<TaskInstance>,
) -> Result<Vec<TaskResponse>, ApiError> {
    instances
        .into_iter()
        .map(|instance| {
            let template = state
                .catalog
                .get(instance.template_id)
                .ok_or_else(|| ApiError::Internal("task references unknown template".to_string()))?;
            Ok(TaskResponse::from_parts(instance, template))
        })
        .collect()
}
