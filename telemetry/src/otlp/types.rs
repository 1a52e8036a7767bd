//! Serde representation of the OTLP metrics JSON body.
//!
//! Field names follow the protobuf JSON mapping (lower camel case). Only the
//! parts of the schema the exporter emits are modelled: number data points on
//! sums and gauges, with string attributes.

use serde::{Deserialize, Serialize};

/// Top-level body of an OTLP/HTTP metrics export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetricsServiceRequest {
    /// One entry per resource. The exporter always sends exactly one.
    pub resource_metrics: Vec<ResourceMetrics>,
}

/// Metrics produced by one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetrics {
    /// Metrics grouped by instrumentation scope.
    pub scope_metrics: Vec<ScopeMetrics>,
}

/// Metrics produced by one instrumentation scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeMetrics {
    /// The scope that produced the metrics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<InstrumentationScope>,
    /// The metrics.
    pub metrics: Vec<Metric>,
}

/// Name and version of the instrumentation library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentationScope {
    /// Scope name.
    pub name: String,
    /// Scope version.
    pub version: String,
}

/// A named metric with its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Metric name.
    pub name: String,
    /// Metric unit.
    pub unit: String,
    /// The data, serialised under a `sum` or `gauge` key.
    #[serde(flatten)]
    pub data: MetricData,
}

/// Metric data by aggregation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricData {
    /// A cumulative sum.
    Sum(Sum),
    /// A point-in-time gauge.
    Gauge(Gauge),
}

/// Sum data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sum {
    /// Data points.
    pub data_points: Vec<NumberDataPoint>,
    /// Whether points are deltas or running totals.
    pub aggregation_temporality: AggregationTemporality,
    /// Whether the sum only ever increases.
    pub is_monotonic: bool,
}

/// Gauge data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gauge {
    /// Data points.
    pub data_points: Vec<NumberDataPoint>,
}

/// Temporality of a sum, encoded by enum name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationTemporality {
    /// Each point covers only its own interval.
    #[serde(rename = "AGGREGATION_TEMPORALITY_DELTA")]
    Delta,
    /// Each point is a running total.
    #[serde(rename = "AGGREGATION_TEMPORALITY_CUMULATIVE")]
    Cumulative,
}

/// A single numeric observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberDataPoint {
    /// The value, serialised under `asInt` or `asDouble`.
    #[serde(flatten)]
    pub value: NumberValue,
    /// Observation time in nanoseconds since the Unix epoch.
    pub time_unix_nano: u64,
    /// Point attributes.
    pub attributes: Vec<KeyValue>,
}

/// Numeric value with its representation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumberValue {
    /// Integer representation.
    AsInt(i64),
    /// Floating point representation.
    AsDouble(f64),
}

/// A string-valued attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    /// Attribute key.
    pub key: String,
    /// Attribute value.
    pub value: AnyValue,
}

/// Attribute value. The exporter only emits strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnyValue {
    /// The string value.
    pub string_value: String,
}
