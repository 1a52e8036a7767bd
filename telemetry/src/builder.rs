//! Metric record construction.
//!
//! Turns one closed interval and a host sample into the ordered list of
//! [`Metric`] records exported for that tick. The builder is a pure function:
//! the same inputs always produce the same records.

use crate::aggregator::{CounterFamily, IntervalSnapshot};
use crate::models::{Metric, MetricValue};
use crate::system::{normalize_percent, SystemSample};
use chrono::{DateTime, Utc};

/// Attribute attached to every record to identify the deployment.
pub const SOURCE_ATTRIBUTE: &str = "source";

/// Unit for plain counts.
pub const UNIT_COUNT: &str = "1";
/// Unit for utilisation gauges.
pub const UNIT_PERCENT: &str = "%";
/// Unit for latencies.
pub const UNIT_MILLIS: &str = "ms";
/// Unit for revenue.
pub const UNIT_CURRENCY: &str = "usd";

fn int(value: u64) -> MetricValue {
    MetricValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Builds the records for one tick.
///
/// Order: per-method and per-endpoint request counts, the request total, CPU
/// and memory, authentication, active users, pizza counts and revenue, then
/// the two latency means. Every record carries `source` as its last attribute.
#[must_use]
pub fn build_metrics(
    interval: &IntervalSnapshot,
    system: SystemSample,
    source: &str,
    timestamp: DateTime<Utc>,
) -> Vec<Metric> {
    let counters = &interval.counters;
    let mut metrics = Vec::new();

    for family in [CounterFamily::Method, CounterFamily::Endpoint] {
        for (key, count) in counters.family(family) {
            metrics.push(
                Metric::sum(family.metric_name(), UNIT_COUNT, int(count))
                    .with_attribute(family.attribute_key(), key),
            );
        }
    }
    metrics.push(Metric::sum(
        "http_total_requests",
        UNIT_COUNT,
        int(counters.total_requests),
    ));

    metrics.push(Metric::gauge(
        "cpu_usage",
        UNIT_PERCENT,
        MetricValue::Double(normalize_percent(system.cpu_percent)),
    ));
    metrics.push(Metric::gauge(
        "memory_usage",
        UNIT_PERCENT,
        MetricValue::Double(normalize_percent(system.memory_percent)),
    ));

    metrics.push(Metric::sum(
        "auth_attempts_success",
        UNIT_COUNT,
        int(counters.auth_success),
    ));
    metrics.push(Metric::sum(
        "auth_attempts_failed",
        UNIT_COUNT,
        int(counters.auth_failed),
    ));

    metrics.push(Metric::gauge(
        "active_users",
        UNIT_COUNT,
        int(interval.active_users),
    ));

    metrics.push(Metric::sum("pizza_sold", UNIT_COUNT, int(counters.pizzas_sold)));
    metrics.push(Metric::sum(
        "pizza_creation_failures",
        UNIT_COUNT,
        int(counters.pizza_failures),
    ));
    metrics.push(Metric::sum(
        "pizza_revenue",
        UNIT_CURRENCY,
        MetricValue::Double(counters.pizza_revenue),
    ));

    metrics.push(Metric::gauge(
        "latency_service",
        UNIT_MILLIS,
        int(interval.avg_service_latency_ms),
    ));
    metrics.push(Metric::gauge(
        "latency_pizza_creation",
        UNIT_MILLIS,
        int(interval.avg_pizza_latency_ms),
    ));

    metrics
        .into_iter()
        .map(|metric| {
            metric
                .with_timestamp(timestamp)
                .with_attribute(SOURCE_ATTRIBUTE, source)
        })
        .collect()
}
