//! Patient-scoped task handlers

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use core_kernel::PatientId;
use domain_tasks::{initial_tasks, lifecycle};

use crate::auth::Claims;
use crate::dto::tasks::{AssignTasksResponse, TaskResponse};
use crate::error::ApiError;
use crate::extract::timezone_from_headers;
use crate::handlers::tasks::to_responses;
use crate::AppState;

/// Lists all visible tasks for a patient, soonest due first
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let patient_id = PatientId::from_uuid(patient_id);
    let patient = state.patients.find_by_id(patient_id).await?;
    lifecycle::ensure_hospital_scope(&patient, claims.hospital_id())?;

    let instances = state.tasks.find_by_patient(patient_id).await?;
    Ok(Json(to_responses(&state, instances)?))
}

/// Runs the instantiation decision table for a patient and persists the
/// resulting tasks.
///
/// Safe to call repeatedly: templates that already have an instance are
/// skipped, so re-invocation after a flag change only adds what is new.
pub async fn assign_tasks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    headers: HeaderMap,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<AssignTasksResponse>, ApiError> {
    let patient_id = PatientId::from_uuid(patient_id);
    let patient = state.patients.find_by_id(patient_id).await?;
    lifecycle::ensure_hospital_scope(&patient, claims.hospital_id())?;

    let existing = state.tasks.existing_template_ids(patient_id).await?;
    let created = initial_tasks(
        &patient,
        state.catalog,
        &existing,
        timezone_from_headers(&headers),
        Utc::now(),
    );
    state.tasks.insert_many(&created).await?;

    Ok(Json(AssignTasksResponse {
        created: to_responses(&state, created)?,
    }))
}
