//! Pizza Service Shell
//!
//! This crate hosts the HTTP side of the pizza service: an Axum router with
//! request tracking middleware and a health check, plus the lifecycle that
//! starts and stops the telemetry reporter around the server.
//!
//! # Architecture
//!
//! - Every request is counted by method and endpoint and timed
//! - A [`telemetry::MetricsReporter`] pushes the aggregated metrics once per
//!   interval while the server runs
//! - On SIGTERM/SIGINT the server drains, then the reporter is stopped
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod routes;
mod state;
mod tracking;

pub use config::Config;
pub use state::AppState;
pub use tracking::track_requests;

use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use telemetry::{MetricsReporter, Telemetry};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Runs the pizza service.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the pizza service with the provided configuration.
///
/// The telemetry reporter is started before the listener binds and stopped
/// after the server has shut down.
///
/// # Errors
///
/// Returns an error if:
/// - The configured address is invalid or cannot be bound
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Pizza service starting"
    );

    let telemetry = Arc::new(Telemetry::new());
    let reporter = MetricsReporter::new(Arc::clone(&telemetry), &config.telemetry);
    let state = AppState::new(telemetry).with_exporter_enabled(reporter.exporter_enabled());
    let reporter = reporter.spawn();

    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    reporter.shutdown().await;
    served?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            track_requests,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
