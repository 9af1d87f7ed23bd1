use std::sync::Arc;

use axum::http::StatusCode;
use trainer_hub_domain::health::ComponentStatus;
use trainer_hub_domain::testing::MockHealthService;

use super::support::TestApp;

#[tokio::test]
async fn test_health_with_real_store_is_ok() {
    let app = TestApp::new();

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["components"].is_object());
}

#[tokio::test]
async fn test_health_healthy_mock() {
    let app = TestApp::with_health(Arc::new(MockHealthService::new()));

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["store"]["status"], "ok");
    assert!(body["components"]["store"].get("message").is_none());
}

#[tokio::test]
async fn test_health_degraded_store_is_unavailable() {
    let app = TestApp::with_health(Arc::new(MockHealthService::new().with_degraded_store()));

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["components"]["store"]["status"], "degraded");
    assert_eq!(body["components"]["store"]["message"], "Store is responding slowly");
}

#[tokio::test]
async fn test_health_unhealthy_store_is_error() {
    let app = TestApp::with_health(Arc::new(MockHealthService::new().with_unhealthy_store()));

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["status"], "error");
    assert_eq!(body["components"]["store"]["message"], "Store connection failed");
}

#[tokio::test]
async fn test_health_reports_custom_components() {
    let app = TestApp::with_health(Arc::new(MockHealthService::new().with_component(
        "identity",
        ComponentStatus::Degraded,
        Some("Identity service is slow".to_string()),
    )));

    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["components"]["identity"]["status"], "degraded");
    assert_eq!(body["components"]["store"]["status"], "ok");
}
