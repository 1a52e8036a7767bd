//! Integration tests for the health check.

use axum::http::StatusCode;

use super::common::{get, test_app};

#[tokio::test]
async fn test_health_check() {
    let (app, _state) = test_app();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "pizza-service");
    assert_eq!(response["telemetry"]["exporter_enabled"], false);
}

#[tokio::test]
async fn test_health_reports_enabled_exporter() {
    let state = api::AppState::default().with_exporter_enabled(true);
    let app = api::create_router(state);

    let (_, response) = get(app, "/health").await;
    assert_eq!(response["telemetry"]["exporter_enabled"], true);
}

#[tokio::test]
async fn test_health_sees_its_own_request() {
    let (app, _state) = test_app();

    // The middleware counts the request before the handler reads the counters.
    let (_, response) = get(app, "/health").await;
    assert_eq!(response["telemetry"]["interval_requests"], 1);
}
