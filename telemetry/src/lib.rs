//! Pizza Telemetry Library
//!
//! In-process telemetry for an HTTP service: request, authentication and
//! order counters, latency windows and active sessions are aggregated in
//! memory and pushed to an OTLP/HTTP JSON endpoint once per interval.
//!
//! # Modules
//!
//! - [`aggregator`] - Counter store, latency sampler and session tracker
//! - [`builder`] - Turns one closed interval into metric records
//! - [`config`] - Environment-driven configuration
//! - [`exporter`] - Fire-and-forget OTLP/JSON push
//! - [`models`] - The internal metric record
//! - [`otlp`] - OTLP JSON envelope types and conversions
//! - [`scheduler`] - The periodic reporting loop
//! - [`system`] - Host CPU and memory sampling
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use telemetry::{MetricsReporter, Telemetry, TelemetryConfig};
//!
//! let telemetry = Arc::new(Telemetry::new());
//! telemetry.observe_request("POST", "/api/order");
//! telemetry.record_pizza_purchase(true, 180, 0.0042);
//!
//! // Records are built even when no endpoint is configured.
//! let reporter = MetricsReporter::new(Arc::clone(&telemetry), &TelemetryConfig::default());
//! let metrics = reporter.collect();
//! assert!(metrics.iter().any(|m| m.name == "pizza_sold"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod aggregator;
pub mod builder;
pub mod config;
pub mod exporter;
pub mod models;
pub mod otlp;
pub mod scheduler;
pub mod system;

pub use aggregator::{IntervalSnapshot, LatencyChannel, Telemetry};
pub use config::{ConfigError, ExporterConfig, TelemetryConfig};
pub use exporter::{ExportError, HttpExporter, PushOutcome};
pub use models::{AggregationKind, Metric, MetricValue};
pub use scheduler::{MetricsReporter, ReporterHandle};
pub use system::{SystemMonitor, SystemSample, SystemSampler};

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde_json;
