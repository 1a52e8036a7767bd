//! Request tracking middleware.
//!
//! Counts every inbound request by method and endpoint before it reaches a
//! handler, and records the service latency once the response is produced.

use crate::state::AppState;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use std::time::Instant;
use telemetry::aggregator::clamp_millis;

/// Axum middleware feeding the request counters and service latency.
///
/// Install with `axum::middleware::from_fn_with_state`.
pub async fn track_requests(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let telemetry = state.telemetry();
    telemetry.observe_request(request.method().as_str(), request.uri().path());

    let start = Instant::now();
    let response = next.run(request).await;
    telemetry.record_service_latency(clamp_millis(start.elapsed().as_secs_f64() * 1000.0));

    response
}
