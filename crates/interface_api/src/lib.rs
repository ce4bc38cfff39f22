//! HTTP API Layer
//!
//! This crate provides the REST API for the discharge-planning engine using
//! Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for tasks, patients, notifications
//! - **Middleware**: Authentication, audit logging, tracing
//! - **DTOs**: Request/Response data transfer objects
//! - **Sweeps**: Periodic auto-miss and court-date reminder jobs
//! - **Error Handling**: Consistent error responses; lost write races
//!   surface as 409 Conflict
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(pool, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod sweep;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_tasks::TaskCatalog;
use infra_db::{NotificationRepository, PatientRepository, TaskRepository};

use crate::config::ApiConfig;
use crate::handlers::{health, notifications, patients, tasks};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub catalog: &'static TaskCatalog,
    pub tasks: TaskRepository,
    pub patients: PatientRepository,
    pub notifications: NotificationRepository,
}

impl AppState {
    /// Builds the shared state from a pool and configuration, using the
    /// built-in task catalog
    pub fn new(pool: PgPool, config: ApiConfig) -> Self {
        Self {
            tasks: TaskRepository::new(pool.clone()),
            patients: PatientRepository::new(pool.clone()),
            notifications: NotificationRepository::new(pool.clone()),
            catalog: TaskCatalog::builtin(),
            pool,
            config,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(pool: PgPool, config: ApiConfig) -> Router {
    let state = AppState::new(pool, config);
    router_with_state(state)
}

/// Creates the router from pre-built state; used by tests that stub parts
/// of the state
pub fn router_with_state(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Task lifecycle routes
    let task_routes = Router::new()
        .route("/priority", get(tasks::priority_tasks))
        .route("/missed-without-reason", get(tasks::missed_tasks))
        .route("/:id", get(tasks::get_task))
        .route("/:id", put(tasks::update_task))
        .route("/:id/start", post(tasks::start_task))
        .route("/:id/complete", post(tasks::complete_task))
        .route("/:id/missed", post(tasks::miss_task))
        .route("/:id/follow-up", post(tasks::follow_up_task))
        .route("/:id/acknowledge", post(tasks::acknowledge_task));

    // Patient-scoped routes
    let patient_routes = Router::new()
        .route("/:id/tasks", get(patients::list_tasks))
        .route("/:id/tasks/assign", post(patients::assign_tasks));

    // Notification routes
    let notification_routes = Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/:id/read", post(notifications::mark_read));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/tasks", task_routes)
        .nest("/patients", patient_routes)
        .nest("/notifications", notification_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
