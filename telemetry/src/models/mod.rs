//! Data models for the telemetry pipeline.

pub mod metric;

pub use metric::{AggregationKind, Metric, MetricValidationError, MetricValue};
