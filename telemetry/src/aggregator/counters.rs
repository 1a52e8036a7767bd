//! Per-interval counters.
//!
//! The `CounterStore` accumulates request and business counts between two
//! interval ticks. The scheduler drains it with [`CounterStore::snapshot_and_reset`].

use std::collections::BTreeMap;

/// A keyed group of counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CounterFamily {
    /// One counter per HTTP method, keyed like `GET`.
    Method,
    /// One counter per endpoint, keyed like `[GET] /api/order`.
    Endpoint,
}

impl CounterFamily {
    /// Name of the exported metric for this family.
    #[must_use]
    pub const fn metric_name(self) -> &'static str {
        match self {
            Self::Method => "http_requests_by_method",
            Self::Endpoint => "http_requests_by_endpoint",
        }
    }

    /// Attribute key that carries the counter key on the exported record.
    #[must_use]
    pub const fn attribute_key(self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Endpoint => "endpoint",
        }
    }
}

/// Everything counted during one interval.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CounterSnapshot {
    /// Keyed counters per family.
    pub families: BTreeMap<CounterFamily, BTreeMap<String, u64>>,
    /// Every observed request, regardless of method or path.
    pub total_requests: u64,
    /// Successful authentication attempts.
    pub auth_success: u64,
    /// Failed authentication attempts.
    pub auth_failed: u64,
    /// Pizzas sold.
    pub pizzas_sold: u64,
    /// Failed pizza creations.
    pub pizza_failures: u64,
    /// Revenue from sold pizzas.
    pub pizza_revenue: f64,
}

impl CounterSnapshot {
    /// Returns the counters of a family, in key order.
    pub fn family(&self, family: CounterFamily) -> impl Iterator<Item = (&str, u64)> {
        self.families
            .get(&family)
            .into_iter()
            .flat_map(|counters| counters.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    /// Returns a single counter, 0 if it was never incremented.
    #[must_use]
    pub fn get(&self, family: CounterFamily, key: &str) -> u64 {
        self.families
            .get(&family)
            .and_then(|counters| counters.get(key))
            .copied()
            .unwrap_or(0)
    }
}

/// Accumulates counts between interval ticks.
#[derive(Debug, Default)]
pub struct CounterStore {
    current: CounterSnapshot,
}

impl CounterStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments `key` within `family` by one, creating it at zero first.
    pub fn increment(&mut self, family: CounterFamily, key: &str) {
        let counters = self.current.families.entry(family).or_default();
        match counters.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                counters.insert(key.to_string(), 1);
            }
        }
    }

    /// Increments the unconditional request total.
    pub fn increment_total_requests(&mut self) {
        self.current.total_requests += 1;
    }

    /// Counts one authentication attempt.
    pub fn record_auth(&mut self, success: bool) {
        if success {
            self.current.auth_success += 1;
        } else {
            self.current.auth_failed += 1;
        }
    }

    /// Counts one pizza sale and its revenue.
    pub fn record_sale(&mut self, price: f64) {
        self.current.pizzas_sold += 1;
        if price.is_finite() {
            self.current.pizza_revenue += price;
        }
    }

    /// Counts one failed pizza creation.
    pub fn record_failure(&mut self) {
        self.current.pizza_failures += 1;
    }

    /// Read-only view of the current interval.
    #[must_use]
    pub fn current(&self) -> &CounterSnapshot {
        &self.current
    }

    /// Returns everything counted so far and clears the store.
    pub fn snapshot_and_reset(&mut self) -> CounterSnapshot {
        std::mem::take(&mut self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_creates_and_counts() {
        let mut store = CounterStore::new();
        store.increment(CounterFamily::Method, "GET");
        store.increment(CounterFamily::Method, "GET");
        store.increment(CounterFamily::Method, "POST");

        let snapshot = store.current();
        assert_eq!(snapshot.get(CounterFamily::Method, "GET"), 2);
        assert_eq!(snapshot.get(CounterFamily::Method, "POST"), 1);
        assert_eq!(snapshot.get(CounterFamily::Method, "DELETE"), 0);
        assert_eq!(snapshot.get(CounterFamily::Endpoint, "GET"), 0);
    }

    #[test]
    fn test_family_iterates_in_key_order() {
        let mut store = CounterStore::new();
        store.increment(CounterFamily::Endpoint, "[PUT] /api/auth");
        store.increment(CounterFamily::Endpoint, "[GET] /api/order");

        let keys: Vec<&str> = store
            .current()
            .family(CounterFamily::Endpoint)
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["[GET] /api/order", "[PUT] /api/auth"]);
    }

    #[test]
    fn test_snapshot_and_reset_clears_everything() {
        let mut store = CounterStore::new();
        store.increment(CounterFamily::Method, "GET");
        store.increment_total_requests();
        store.record_auth(true);
        store.record_auth(false);
        store.record_sale(9.99);
        store.record_failure();

        let snapshot = store.snapshot_and_reset();
        assert_eq!(snapshot.total_requests, 1);
        assert_eq!(snapshot.auth_success, 1);
        assert_eq!(snapshot.auth_failed, 1);
        assert_eq!(snapshot.pizzas_sold, 1);
        assert_eq!(snapshot.pizza_failures, 1);
        assert!((snapshot.pizza_revenue - 9.99).abs() < 1e-9);

        assert_eq!(store.current(), &CounterSnapshot::default());
    }

    #[test]
    fn test_increments_after_reset_start_from_zero() {
        let mut store = CounterStore::new();
        for _ in 0..5 {
            store.increment(CounterFamily::Method, "GET");
        }
        let _ = store.snapshot_and_reset();

        store.increment(CounterFamily::Method, "GET");
        let snapshot = store.snapshot_and_reset();
        assert_eq!(snapshot.get(CounterFamily::Method, "GET"), 1);
    }

    #[test]
    fn test_non_finite_price_is_ignored() {
        let mut store = CounterStore::new();
        store.record_sale(f64::NAN);

        assert_eq!(store.current().pizzas_sold, 1);
        assert!(store.current().pizza_revenue.abs() < f64::EPSILON);
    }

    #[test]
    fn test_family_metadata() {
        assert_eq!(CounterFamily::Method.metric_name(), "http_requests_by_method");
        assert_eq!(CounterFamily::Endpoint.attribute_key(), "endpoint");
    }
}
