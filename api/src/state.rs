//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers
//! and middleware.

use std::sync::Arc;
use telemetry::Telemetry;

/// Application state shared across all request handlers.
#[derive(Clone, Default)]
pub struct AppState {
    telemetry: Arc<Telemetry>,
    exporter_enabled: bool,
}

impl AppState {
    /// Creates a new application state around an existing aggregator.
    #[must_use]
    pub fn new(telemetry: Arc<Telemetry>) -> Self {
        Self {
            telemetry,
            exporter_enabled: false,
        }
    }

    /// Records whether the reporter has an endpoint configured.
    #[must_use]
    pub fn with_exporter_enabled(mut self, enabled: bool) -> Self {
        self.exporter_enabled = enabled;
        self
    }

    /// Returns the shared aggregator.
    #[must_use]
    pub fn telemetry(&self) -> &Arc<Telemetry> {
        &self.telemetry
    }

    /// Whether metrics are being pushed anywhere.
    #[must_use]
    pub fn exporter_enabled(&self) -> bool {
        self.exporter_enabled
    }
}
