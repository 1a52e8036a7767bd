//! Health check endpoint.
//!
//! Reports liveness together with a short view of the telemetry pipeline,
//! so a health check can tell whether metrics are actually leaving the process.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status (always "healthy" if reachable).
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Telemetry pipeline status.
    pub telemetry: TelemetryStatus,
}

/// Telemetry section of the health response.
#[derive(Debug, Serialize)]
pub struct TelemetryStatus {
    /// Whether the exporter has an endpoint to push to.
    pub exporter_enabled: bool,
    /// Sessions currently tracked, before the next sweep.
    pub active_sessions: usize,
    /// Requests counted so far in the current interval.
    pub interval_requests: u64,
}

/// Creates the health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let telemetry = state.telemetry();

    Json(HealthResponse {
        status: "healthy",
        service: "pizza-service",
        version: env!("CARGO_PKG_VERSION"),
        telemetry: TelemetryStatus {
            exporter_enabled: state.exporter_enabled(),
            active_sessions: telemetry.active_sessions(),
            interval_requests: telemetry.interval_total_requests(),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    async fn get_health(state: AppState) -> (StatusCode, serde_json::Value) {
        let response = health_routes()
            .with_state(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_body() {
        let (status, health) = get_health(AppState::default()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "healthy");
        assert_eq!(health["service"], "pizza-service");
        assert!(health["version"].is_string());
        assert_eq!(health["telemetry"]["exporter_enabled"], false);
    }

    #[tokio::test]
    async fn test_health_reports_sessions() {
        let state = AppState::default();
        state.telemetry().record_auth_attempt(true, Some("user-1"));

        let (_, health) = get_health(state).await;
        assert_eq!(health["telemetry"]["active_sessions"], 1);
    }

    #[tokio::test]
    async fn test_health_reports_interval_requests() {
        let state = AppState::default();
        state.telemetry().observe_request("GET", "/api/order/menu");
        state.telemetry().observe_request("POST", "/api/order");

        let (_, health) = get_health(state).await;
        assert_eq!(health["telemetry"]["interval_requests"], 2);
    }
}
