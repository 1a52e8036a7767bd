//! Common test utilities and helpers for integration tests.
//!
//! Provides app setup and a request helper shared by all integration tests.

use api::{create_router, AppState};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;

/// Creates a test router with a fresh aggregator.
///
/// # Returns
///
/// A tuple containing the configured router and the app state.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::default();
    let router = create_router(state.clone());
    (router, state)
}

/// Sends one request with an empty body.
///
/// # Arguments
///
/// * `app` - The Axum router to send the request to
/// * `method` - HTTP method
/// * `uri` - The URI to request
///
/// # Returns
///
/// The status code and the body parsed as JSON (`Null` if it is not JSON).
pub async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let response = tower::ServiceExt::oneshot(
        app,
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    (status, json)
}

/// Helper to make a GET request.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri).await
}
