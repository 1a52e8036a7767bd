//! Conversions from internal metric records to the OTLP export envelope.

use crate::models::{AggregationKind, Metric, MetricValue};
use crate::otlp::types::{
    AggregationTemporality, AnyValue, ExportMetricsServiceRequest, Gauge, InstrumentationScope,
    KeyValue, Metric as OtlpMetric, MetricData, NumberDataPoint, NumberValue, ResourceMetrics,
    ScopeMetrics, Sum,
};

/// Instrumentation scope name reported in every export.
pub const SCOPE_NAME: &str = "telemetry";

fn number_value(value: MetricValue) -> NumberValue {
    match value {
        MetricValue::Int(i) => NumberValue::AsInt(i),
        MetricValue::Double(d) => NumberValue::AsDouble(d),
    }
}

fn attributes_to_key_values(attributes: &[(String, String)]) -> Vec<KeyValue> {
    attributes
        .iter()
        .map(|(key, value)| KeyValue {
            key: key.clone(),
            value: AnyValue {
                string_value: value.clone(),
            },
        })
        .collect()
}

/// Converts one internal record to an OTLP metric with a single data point.
#[must_use]
pub fn metric_to_otlp(metric: &Metric) -> OtlpMetric {
    let data_points = vec![NumberDataPoint {
        value: number_value(metric.value),
        time_unix_nano: metric.time_unix_nano(),
        attributes: attributes_to_key_values(&metric.attributes),
    }];

    let data = match metric.kind {
        AggregationKind::Sum => MetricData::Sum(Sum {
            data_points,
            aggregation_temporality: AggregationTemporality::Cumulative,
            is_monotonic: metric.is_monotonic(),
        }),
        AggregationKind::Gauge => MetricData::Gauge(Gauge { data_points }),
    };

    OtlpMetric {
        name: metric.name.clone(),
        unit: metric.unit.clone(),
        data,
    }
}

/// Wraps records in a single-resource, single-scope export request.
#[must_use]
pub fn metrics_to_request(metrics: &[Metric]) -> ExportMetricsServiceRequest {
    ExportMetricsServiceRequest {
        resource_metrics: vec![ResourceMetrics {
            scope_metrics: vec![ScopeMetrics {
                scope: Some(InstrumentationScope {
                    name: SCOPE_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                }),
                metrics: metrics.iter().map(metric_to_otlp).collect(),
            }],
        }],
    }
}

/// Serialises records into the JSON request body.
///
/// # Errors
///
/// Returns an error if `serde_json` fails to serialise the envelope.
pub fn encode_json(metrics: &[Metric]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&metrics_to_request(metrics))
}


#[cfg(test)]
#[path = "conversions_test.rs"]
mod conversions_test;
