//! Metric record model.
//!
//! Defines the immutable `Metric` record that the builder produces once per
//! interval tick and the exporter serialises into the OTLP envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// How a metric aggregates over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationKind {
    /// A monotonically increasing cumulative total (e.g., request count).
    Sum,
    /// A point-in-time reading (e.g., memory usage).
    Gauge,
}

impl std::fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sum => write!(f, "sum"),
            Self::Gauge => write!(f, "gauge"),
        }
    }
}

/// The numeric value of a metric.
///
/// The variant doubles as the numeric representation on the wire
/// (`asInt` or `asDouble`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Double(f64),
}

impl MetricValue {
    /// Returns true if this value is represented as an integer.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Returns the value widened to `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Double(v) => *v,
        }
    }
}

/// A single metric record for one interval.
///
/// # Example
///
/// ```
/// use telemetry::models::{AggregationKind, Metric, MetricValue};
///
/// let metric = Metric::sum("http_requests_by_method", "1", MetricValue::Int(12))
///     .with_attribute("method", "GET")
///     .with_attribute("source", "pizza-service");
///
/// assert_eq!(metric.kind, AggregationKind::Sum);
/// assert_eq!(metric.attribute("method"), Some("GET"));
/// assert!(metric.validate_metric().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Metric {
    /// The name of the metric (e.g., "`http_total_requests`").
    #[validate(length(min = 1, message = "Metric name cannot be empty"))]
    pub name: String,

    /// The unit of the metric (e.g., "1", "%", "ms", "usd").
    pub unit: String,

    /// How the metric aggregates.
    pub kind: AggregationKind,

    /// The metric value.
    pub value: MetricValue,

    /// When the metric was produced.
    pub timestamp: DateTime<Utc>,

    /// Ordered attribute pairs. Keys are unique.
    #[serde(default)]
    pub attributes: Vec<(String, String)>,
}

/// Errors that can occur during metric validation.
#[derive(Debug, Error)]
pub enum MetricValidationError {
    /// The metric name is empty.
    #[error("Metric name cannot be empty")]
    EmptyName,

    /// A double value is NaN or infinite.
    #[error("Metric '{0}' has a non-finite value")]
    NonFiniteValue(String),

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl Metric {
    /// Creates a new metric with the current timestamp and no attributes.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        kind: AggregationKind,
        value: MetricValue,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            kind,
            value,
            timestamp: Utc::now(),
            attributes: Vec::new(),
        }
    }

    /// Creates a new cumulative sum metric.
    #[must_use]
    pub fn sum(name: impl Into<String>, unit: impl Into<String>, value: MetricValue) -> Self {
        Self::new(name, unit, AggregationKind::Sum, value)
    }

    /// Creates a new gauge metric.
    #[must_use]
    pub fn gauge(name: impl Into<String>, unit: impl Into<String>, value: MetricValue) -> Self {
        Self::new(name, unit, AggregationKind::Gauge, value)
    }

    /// Adds an attribute, replacing the value if the key already exists.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(existing) = self.attributes.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
        } else {
            self.attributes.push((key, value));
        }
        self
    }

    /// Sets the timestamp of the metric.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Looks up an attribute value by key.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true for cumulative sums, which are exported as monotonic.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.kind == AggregationKind::Sum
    }

    /// Returns the timestamp as nanoseconds since the Unix epoch.
    ///
    /// Timestamps outside the representable range collapse to zero.
    #[must_use]
    pub fn time_unix_nano(&self) -> u64 {
        self.timestamp
            .timestamp_nanos_opt()
            .and_then(|nanos| u64::try_from(nanos).ok())
            .unwrap_or(0)
    }

    /// Validates the metric.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The name is empty
    /// - A double value is NaN or infinite
    pub fn validate_metric(&self) -> Result<(), MetricValidationError> {
        if self.name.is_empty() {
            return Err(MetricValidationError::EmptyName);
        }

        if let MetricValue::Double(v) = self.value {
            if !v.is_finite() {
                return Err(MetricValidationError::NonFiniteValue(self.name.clone()));
            }
        }

        self.validate()?;
        Ok(())
    }
}
