//! OpenTelemetry Protocol (OTLP) JSON export envelope.
//!
//! Typed records for the `resourceMetrics → scopeMetrics → metrics` body that
//! OTLP/HTTP JSON receivers accept, and the conversion from internal
//! [`crate::models::Metric`] records.
//!
//! # Example
//!
//! ```
//! use telemetry::models::{Metric, MetricValue};
//! use telemetry::otlp::encode_json;
//!
//! let metrics = vec![Metric::sum("pizza_sold", "1", MetricValue::Int(3))];
//! let body = encode_json(&metrics).unwrap();
//! assert!(body.starts_with(b"{\"resourceMetrics\""));
//! ```

pub mod conversions;
pub mod types;

pub use conversions::{encode_json, metrics_to_request};
pub use types::ExportMetricsServiceRequest;
