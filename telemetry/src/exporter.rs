//! OTLP/HTTP JSON exporter.
//!
//! One tick's records are posted as a single JSON body with bearer
//! authentication. Pushing is fire-and-forget: failures are logged and the
//! records of that tick are dropped. Nothing is retried or buffered.

use crate::config::{Endpoint, ExporterConfig, ExporterDisabled};
use crate::models::Metric;
use crate::otlp::encode_json;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use thiserror::Error;

/// Errors raised by a single export attempt.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The envelope could not be serialised.
    #[error("Failed to encode metrics: {0}")]
    Encode(#[from] serde_json::Error),

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("Failed to send metrics: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Metrics endpoint rejected push with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnosis.
        body: String,
    },
}

/// What happened to one push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// The exporter is not configured, so no request was made.
    Skipped,
    /// The endpoint accepted the records.
    Delivered,
    /// The endpoint answered with a non-success status.
    Rejected {
        /// HTTP status code.
        status: u16,
    },
    /// The request failed before a response arrived.
    Failed,
}

impl PushOutcome {
    /// Returns true if a request reached the endpoint and was accepted.
    #[must_use]
    pub fn is_delivered(self) -> bool {
        self == Self::Delivered
    }
}

/// Posts metric records to an OTLP/HTTP endpoint.
///
/// # Example
///
/// ```
/// use telemetry::config::ExporterConfig;
/// use telemetry::exporter::{HttpExporter, PushOutcome};
///
/// # tokio_test::block_on(async {
/// // Without credentials the exporter is a silent no-op.
/// let exporter = HttpExporter::new(&ExporterConfig::default());
/// assert!(!exporter.is_enabled());
/// assert_eq!(exporter.push(&[]).await, PushOutcome::Skipped);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct HttpExporter {
    client: Client,
    endpoint: Option<Endpoint>,
}

impl HttpExporter {
    /// Creates an exporter from configuration.
    ///
    /// Missing credentials or an invalid URL yield a disabled exporter.
    #[must_use]
    pub fn new(config: &ExporterConfig) -> Self {
        let endpoint = match config.endpoint() {
            Ok(endpoint) => {
                tracing::info!(url = %endpoint.url, "Metrics exporter enabled");
                Some(endpoint)
            }
            Err(e @ ExporterDisabled::InvalidUrl(_)) => {
                tracing::warn!(reason = %e, "Metrics exporter disabled");
                None
            }
            Err(e) => {
                tracing::info!(reason = %e, "Metrics exporter disabled");
                None
            }
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();

        Self { client, endpoint }
    }

    /// Creates an exporter that never sends anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            endpoint: None,
        }
    }

    /// Returns true if pushes will actually be sent.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Pushes one batch of records.
    ///
    /// Invalid records are dropped with a warning before encoding. Any failure
    /// is logged and reported through the returned [`PushOutcome`]; this
    /// method never returns an error.
    pub async fn push(&self, metrics: &[Metric]) -> PushOutcome {
        let Some(endpoint) = &self.endpoint else {
            return PushOutcome::Skipped;
        };

        let valid: Vec<Metric> = metrics
            .iter()
            .filter(|metric| match metric.validate_metric() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(metric = %metric.name, error = %e, "Dropping invalid metric");
                    false
                }
            })
            .cloned()
            .collect();

        match self.send(endpoint, &valid).await {
            Ok(()) => {
                tracing::debug!(count = valid.len(), "Pushed metrics");
                PushOutcome::Delivered
            }
            Err(ExportError::Rejected { status, body }) => {
                tracing::error!(status, body = %body, "Failed to push metrics");
                PushOutcome::Rejected { status }
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to push metrics");
                PushOutcome::Failed
            }
        }
    }

    async fn send(&self, endpoint: &Endpoint, metrics: &[Metric]) -> Result<(), ExportError> {
        let body = encode_json(metrics)?;

        let response = self
            .client
            .post(&endpoint.url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&endpoint.api_key)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(ExportError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
