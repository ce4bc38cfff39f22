//! API surface tests
//!
//! Exercise routing, auth rejection, and health without a live database by
//! using a lazily-connecting pool.

use axum_test::TestServer;
use sqlx::postgres::PgPoolOptions;

use core_kernel::{HospitalId, StaffId};
use interface_api::auth::create_token;
use interface_api::config::ApiConfig;
use interface_api::create_router;

fn test_server() -> TestServer {
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/discharge_test")
        .expect("lazy pool");
    let app = create_router(pool, ApiConfig::default());
    TestServer::new(app).expect("test server")
}

#[tokio::test]
async fn test_health_check_is_public() {
    let server = test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let server = test_server();
    let response = server.get("/api/v1/tasks/priority").await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let server = test_server();
    let response = server
        .get("/api/v1/tasks/priority")
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let server = test_server();
    let token = create_token(
        StaffId::new(),
        HospitalId::new(),
        false,
        "some-other-secret",
        3600,
    )
    .unwrap();
    let response = server
        .get("/api/v1/tasks/priority")
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(response.status_code(), 401);
}
