//! In-process signal aggregation.
//!
//! [`Telemetry`] owns the counter store, the latency windows and the session
//! map. Request-handling code shares it through an `Arc` and calls the
//! recording methods from any thread; the scheduler drains it once per tick
//! with [`Telemetry::take_interval`].
//!
//! None of the recording methods can fail. Each structure sits behind its own
//! mutex and a poisoned lock is recovered rather than propagated, so
//! instrumentation never takes down the request it is observing.

pub mod counters;
pub mod latency;
pub mod sessions;

pub use counters::{CounterFamily, CounterSnapshot, CounterStore};
pub use latency::{clamp_millis, LatencyChannel, LatencySampler};
pub use sessions::{default_session_ttl, SessionTracker};

use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Everything the builder needs from one interval, minus host statistics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalSnapshot {
    /// Counters accumulated since the previous tick.
    pub counters: CounterSnapshot,
    /// Active users after the expiry sweep.
    pub active_users: u64,
    /// Sessions removed by this tick's sweep.
    pub expired_sessions: usize,
    /// Mean service latency in milliseconds.
    pub avg_service_latency_ms: u64,
    /// Mean pizza creation latency in milliseconds.
    pub avg_pizza_latency_ms: u64,
}

/// Shared aggregation state for one process.
///
/// # Example
///
/// ```
/// use telemetry::aggregator::{default_session_ttl, Telemetry};
/// use chrono::Utc;
///
/// let telemetry = Telemetry::new();
/// telemetry.observe_request("GET", "/api/order/menu");
/// telemetry.record_auth_attempt(true, Some("user-1"));
///
/// let interval = telemetry.take_interval(Utc::now(), default_session_ttl());
/// assert_eq!(interval.counters.total_requests, 1);
/// assert_eq!(interval.active_users, 1);
/// ```
#[derive(Debug, Default)]
pub struct Telemetry {
    counters: Mutex<CounterStore>,
    latencies: Mutex<LatencySampler>,
    sessions: Mutex<SessionTracker>,
}

impl Telemetry {
    /// Creates an empty aggregator with the default latency windows.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty aggregator with custom latency windows.
    #[must_use]
    pub fn with_latency_windows(live_window: usize, retained_window: usize) -> Self {
        Self {
            latencies: Mutex::new(LatencySampler::with_windows(live_window, retained_window)),
            ..Self::default()
        }
    }

    /// Counts an inbound request by method, by endpoint and in the total.
    pub fn observe_request(&self, method: &str, path: &str) {
        let endpoint = format!("[{method}] {path}");
        let mut counters = lock(&self.counters);
        counters.increment(CounterFamily::Endpoint, &endpoint);
        counters.increment(CounterFamily::Method, method);
        counters.increment_total_requests();
    }

    /// Counts an authentication attempt; a success also marks the user active.
    pub fn record_auth_attempt(&self, success: bool, user_id: Option<&str>) {
        lock(&self.counters).record_auth(success);
        if success {
            lock(&self.sessions).mark_active(user_id, Utc::now());
        }
    }

    /// Ends a user's session, typically on logout.
    pub fn remove_active_user(&self, user_id: Option<&str>) {
        lock(&self.sessions).remove(user_id);
    }

    /// Overrides the exported active-user gauge.
    pub fn set_active_users(&self, count: u64) {
        lock(&self.sessions).set_override(count);
    }

    /// Records the outcome of a pizza order and its factory latency.
    pub fn record_pizza_purchase(&self, success: bool, latency_ms: u64, price: f64) {
        {
            let mut counters = lock(&self.counters);
            if success {
                counters.record_sale(price);
            } else {
                counters.record_failure();
            }
        }
        self.record_pizza_latency(latency_ms);
    }

    /// Adds a service latency sample.
    pub fn record_service_latency(&self, ms: u64) {
        lock(&self.latencies).record(LatencyChannel::Service, ms);
    }

    /// Adds a pizza creation latency sample.
    pub fn record_pizza_latency(&self, ms: u64) {
        lock(&self.latencies).record(LatencyChannel::PizzaCreation, ms);
    }

    /// Current mean latency of a channel, without draining anything.
    #[must_use]
    pub fn average_latency(&self, channel: LatencyChannel) -> u64 {
        lock(&self.latencies).average(channel)
    }

    /// Current view of the counters, without draining anything.
    #[must_use]
    pub fn peek_counters(&self) -> CounterSnapshot {
        lock(&self.counters).current().clone()
    }

    /// Requests counted so far in the current interval.
    #[must_use]
    pub fn interval_total_requests(&self) -> u64 {
        lock(&self.counters).current().total_requests
    }

    /// Live session count, ignoring any override.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        lock(&self.sessions).count()
    }

    /// Closes the current interval.
    ///
    /// Sweeps sessions idle for longer than `session_ttl`, drains the counters,
    /// and averages then truncates the latency windows. Each structure is
    /// handled in a single critical section so concurrent recordings land
    /// either fully before or fully after the boundary.
    pub fn take_interval(&self, now: DateTime<Utc>, session_ttl: Duration) -> IntervalSnapshot {
        let (expired_sessions, active_users) = {
            let mut sessions = lock(&self.sessions);
            let expired = sessions.sweep_expired(now, session_ttl);
            (expired, sessions.reported_count())
        };

        let counters = lock(&self.counters).snapshot_and_reset();

        let (avg_service_latency_ms, avg_pizza_latency_ms) = {
            let mut latencies = lock(&self.latencies);
            let averages = (
                latencies.average(LatencyChannel::Service),
                latencies.average(LatencyChannel::PizzaCreation),
            );
            latencies.truncate_to_retained();
            averages
        };

        IntervalSnapshot {
            counters,
            active_users,
            expired_sessions,
            avg_service_latency_ms,
            avg_pizza_latency_ms,
        }
    }
}
