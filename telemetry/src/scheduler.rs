//! Periodic reporting.
//!
//! [`MetricsReporter`] closes an interval on a fixed period, builds the
//! records and hands them to the exporter. Each push runs as its own task,
//! so a slow endpoint never delays the next tick.

use crate::aggregator::Telemetry;
use crate::builder::build_metrics;
use crate::config::TelemetryConfig;
use crate::exporter::{HttpExporter, PushOutcome};
use crate::models::Metric;
use crate::system::{SystemMonitor, SystemSampler};
use chrono::Utc;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Drives the tick loop for one [`Telemetry`] instance.
pub struct MetricsReporter {
    telemetry: Arc<Telemetry>,
    exporter: HttpExporter,
    sampler: Mutex<Box<dyn SystemSampler>>,
    source: String,
    period: Duration,
    session_ttl: chrono::Duration,
}

impl std::fmt::Debug for MetricsReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsReporter")
            .field("exporter", &self.exporter)
            .field("source", &self.source)
            .field("period", &self.period)
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl MetricsReporter {
    /// Creates a reporter that samples the real host.
    ///
    /// # Arguments
    ///
    /// * `telemetry` - Aggregation state shared with request handlers
    /// * `config` - Exporter settings, tick period and session threshold
    #[must_use]
    pub fn new(telemetry: Arc<Telemetry>, config: &TelemetryConfig) -> Self {
        Self {
            telemetry,
            exporter: HttpExporter::new(&config.exporter),
            sampler: Mutex::new(Box::new(SystemMonitor::new())),
            source: config.exporter.source_label().to_string(),
            period: config.interval,
            session_ttl: config.session_ttl_chrono(),
        }
    }

    /// Replaces the host sampler.
    #[must_use]
    pub fn with_sampler(self, sampler: impl SystemSampler + 'static) -> Self {
        Self {
            sampler: Mutex::new(Box::new(sampler)),
            ..self
        }
    }

    /// Replaces the exporter.
    #[must_use]
    pub fn with_exporter(mut self, exporter: HttpExporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// The tick period.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Whether ticks will actually push anywhere.
    #[must_use]
    pub fn exporter_enabled(&self) -> bool {
        self.exporter.is_enabled()
    }

    /// Closes the current interval and builds its records.
    ///
    /// Counters are reset and latency windows truncated as a side effect.
    pub fn collect(&self) -> Vec<Metric> {
        let now = Utc::now();
        let interval = self.telemetry.take_interval(now, self.session_ttl);
        let system = self
            .sampler
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .sample();

        tracing::debug!(
            total_requests = interval.counters.total_requests,
            active_users = interval.active_users,
            expired_sessions = interval.expired_sessions,
            cpu_percent = system.cpu_percent,
            memory_percent = system.memory_percent,
            "Telemetry interval closed"
        );

        build_metrics(&interval, system, &self.source, now)
    }

    /// Runs one tick immediately and waits for its push to finish.
    pub async fn flush_now(&self) -> PushOutcome {
        let metrics = self.collect();
        self.exporter.push(&metrics).await
    }

    /// Starts the tick loop on the current runtime.
    ///
    /// The first tick fires one full period after this call.
    #[must_use]
    pub fn spawn(self) -> ReporterHandle {
        let reporter = Arc::new(self);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(Arc::clone(&reporter).run(shutdown_rx));

        ReporterHandle {
            reporter,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    async fn run(self: Arc<Self>, mut shutdown_rx: oneshot::Receiver<()>) {
        let now = Instant::now();
        let start = now.checked_add(self.period).unwrap_or(now);
        let mut tick = interval_at(start, self.period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            period_secs = self.period.as_secs(),
            source = %self.source,
            "Metrics reporter started"
        );

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let metrics = self.collect();
                    let exporter = self.exporter.clone();
                    tokio::spawn(async move {
                        exporter.push(&metrics).await;
                    });
                }
                _ = &mut shutdown_rx => break,
            }
        }

        tracing::info!("Metrics reporter stopped");
    }
}

/// Handle to a running reporter.
///
/// Dropping the handle without calling [`ReporterHandle::shutdown`] also
/// stops the loop, since the shutdown channel closes.
#[derive(Debug)]
pub struct ReporterHandle {
    reporter: Arc<MetricsReporter>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ReporterHandle {
    /// Runs one tick out of band.
    pub async fn flush_now(&self) -> PushOutcome {
        self.reporter.flush_now().await
    }

    /// Returns true once the loop has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the loop and waits for it to exit.
    ///
    /// Pushes already in flight are left to complete on their own.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            tracing::error!(error = %e, "Metrics reporter task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetricValue;
    use crate::system::SystemSample;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSampler {
        calls: Arc<AtomicUsize>,
    }

    impl SystemSampler for FixedSampler {
        fn sample(&mut self) -> SystemSample {
            self.calls.fetch_add(1, Ordering::SeqCst);
            SystemSample {
                cpu_percent: 25.0,
                memory_percent: 50.0,
            }
        }
    }

    fn reporter(
        telemetry: &Arc<Telemetry>,
        period: Duration,
    ) -> (MetricsReporter, Arc<AtomicUsize>) {
        let config = TelemetryConfig {
            interval: period,
            ..TelemetryConfig::default()
        };
        reporter_with(telemetry, &config)
    }

    fn reporter_with(
        telemetry: &Arc<Telemetry>,
        config: &TelemetryConfig,
    ) -> (MetricsReporter, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let reporter = MetricsReporter::new(Arc::clone(telemetry), config)
            .with_exporter(HttpExporter::disabled())
            .with_sampler(FixedSampler {
                calls: Arc::clone(&calls),
            });
        (reporter, calls)
    }

    fn value_of(metrics: &[Metric], name: &str) -> MetricValue {
        metrics
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.value)
            .unwrap_or_else(|| panic!("missing metric {name}"))
    }

    #[test]
    fn test_collect_drains_interval() {
        let telemetry = Arc::new(Telemetry::new());
        let (reporter, calls) = reporter(&telemetry, Duration::from_secs(60));
        telemetry.observe_request("GET", "/api/order/menu");
        telemetry.record_pizza_purchase(true, 100, 0.05);

        let metrics = reporter.collect();
        assert_eq!(value_of(&metrics, "http_total_requests"), MetricValue::Int(1));
        assert_eq!(value_of(&metrics, "pizza_sold"), MetricValue::Int(1));
        assert_eq!(value_of(&metrics, "cpu_usage"), MetricValue::Double(25.0));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(metrics.iter().all(|m| m.attribute("source") == Some("unknown")));

        let metrics = reporter.collect();
        assert_eq!(value_of(&metrics, "http_total_requests"), MetricValue::Int(0));
        assert_eq!(value_of(&metrics, "pizza_sold"), MetricValue::Int(0));
    }

    #[tokio::test]
    async fn test_flush_now_with_disabled_exporter() {
        let telemetry = Arc::new(Telemetry::new());
        let (reporter, calls) = reporter(&telemetry, Duration::from_secs(60));
        telemetry.observe_request("GET", "/");

        assert_eq!(reporter.flush_now().await, PushOutcome::Skipped);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(telemetry.peek_counters().total_requests, 0);
    }

    #[tokio::test]
    async fn test_no_tick_before_first_period() {
        let telemetry = Arc::new(Telemetry::new());
        let (reporter, calls) = reporter(&telemetry, Duration::from_secs(3600));

        let handle = reporter.spawn();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_spawned_loop_ticks_and_stops() {
        let telemetry = Arc::new(Telemetry::new());
        let (reporter, calls) = reporter(&telemetry, Duration::from_millis(20));
        telemetry.observe_request("GET", "/");

        let handle = reporter.spawn();
        tokio::time::sleep(Duration::from_millis(150)).await;
        handle.shutdown().await;

        let ticks = calls.load(Ordering::SeqCst);
        assert!(ticks >= 2, "expected at least two ticks, got {ticks}");
        assert_eq!(telemetry.peek_counters().total_requests, 0);

        // No ticks once shut down.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), ticks);
    }

    #[tokio::test]
    async fn test_handle_flush_now() {
        let telemetry = Arc::new(Telemetry::new());
        let (reporter, calls) = reporter(&telemetry, Duration::from_secs(3600));

        let handle = reporter.spawn();
        assert_eq!(handle.flush_now().await, PushOutcome::Skipped);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!handle.is_finished());

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_huge_session_ttl_does_not_stop_the_loop() {
        let telemetry = Arc::new(Telemetry::new());
        let config = TelemetryConfig {
            interval: Duration::from_millis(20),
            session_ttl: Duration::from_secs(10_000_000_000_000),
            ..TelemetryConfig::default()
        };
        let (reporter, calls) = reporter_with(&telemetry, &config);
        telemetry.record_auth_attempt(true, Some("user-1"));

        let handle = reporter.spawn();
        tokio::time::sleep(Duration::from_millis(120)).await;

        assert!(!handle.is_finished());
        assert!(calls.load(Ordering::SeqCst) >= 2);
        assert_eq!(telemetry.active_sessions(), 1);
        handle.shutdown().await;
    }
}
