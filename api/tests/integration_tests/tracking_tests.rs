//! Integration tests for request tracking through the full router.

use api::{track_requests, AppState};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use telemetry::aggregator::CounterFamily;
use telemetry::{HttpExporter, LatencyChannel, MetricValue, MetricsReporter, TelemetryConfig};

use super::common::{get, send, test_app};

#[tokio::test]
async fn test_every_request_is_counted() {
    let (app, state) = test_app();

    get(app.clone(), "/health").await;
    get(app.clone(), "/health").await;
    send(app.clone(), "PUT", "/api/auth").await;
    let (status, _) = send(app, "POST", "/api/order").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let counters = state.telemetry().peek_counters();
    assert_eq!(counters.total_requests, 4);
    assert_eq!(counters.get(CounterFamily::Method, "GET"), 2);
    assert_eq!(counters.get(CounterFamily::Method, "PUT"), 1);
    assert_eq!(counters.get(CounterFamily::Method, "POST"), 1);
    assert_eq!(counters.get(CounterFamily::Endpoint, "[GET] /health"), 2);
    assert_eq!(counters.get(CounterFamily::Endpoint, "[PUT] /api/auth"), 1);
    assert_eq!(counters.get(CounterFamily::Endpoint, "[POST] /api/order"), 1);
}

#[tokio::test]
async fn test_service_latency_is_recorded() {
    let state = AppState::default();
    let app = Router::new()
        .route(
            "/api/order",
            post(|| async {
                tokio::time::sleep(Duration::from_millis(30)).await;
                "ordered"
            }),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            track_requests,
        ));

    let (status, _) = send(app, "POST", "/api/order").await;
    assert_eq!(status, StatusCode::OK);

    let average = state.telemetry().average_latency(LatencyChannel::Service);
    assert!(average >= 30, "expected at least 30 ms, got {average}");
}

#[tokio::test]
async fn test_reporter_drains_what_the_router_recorded() {
    let (app, state) = test_app();
    get(app.clone(), "/health").await;
    get(app, "/health").await;

    let reporter = MetricsReporter::new(Arc::clone(state.telemetry()), &TelemetryConfig::default())
        .with_exporter(HttpExporter::disabled());
    let metrics = reporter.collect();

    let by_endpoint = metrics
        .iter()
        .find(|m| m.name == "http_requests_by_endpoint")
        .unwrap();
    assert_eq!(by_endpoint.attribute("endpoint"), Some("[GET] /health"));
    assert_eq!(by_endpoint.value, MetricValue::Int(2));

    // The interval is closed, so the next one starts from zero.
    assert_eq!(state.telemetry().peek_counters().total_requests, 0);
}
