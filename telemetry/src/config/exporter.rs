//! Exporter configuration.
//!
//! The exporter needs an ingestion URL, an API key and a `source` label.
//! When any of them is missing the exporter is disabled, which is a normal
//! operating mode rather than an error.

use std::time::Duration;
use thiserror::Error;
use validator::Validate;

/// Default timeout for one export request.
pub const DEFAULT_EXPORT_TIMEOUT: Duration = Duration::from_secs(10);

/// Label used for `source` when none is configured.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Where and how to push metrics.
#[derive(Debug, Clone, PartialEq, Eq, Validate)]
pub struct ExporterConfig {
    /// Metrics ingestion URL.
    #[validate(url(message = "Metrics URL must be an absolute URL"))]
    pub url: Option<String>,
    /// Bearer token for the ingestion endpoint.
    pub api_key: Option<String>,
    /// Deployment label attached to every metric.
    pub source: Option<String>,
    /// Timeout for one export request.
    pub timeout: Duration,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            source: None,
            timeout: DEFAULT_EXPORT_TIMEOUT,
        }
    }
}

/// Why the exporter is disabled.
#[derive(Debug, Error)]
pub enum ExporterDisabled {
    /// A required setting is unset.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// The URL failed validation.
    #[error("invalid metrics URL: {0}")]
    InvalidUrl(#[from] validator::ValidationErrors),
}

/// A fully configured ingestion endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Ingestion URL.
    pub url: String,
    /// Bearer token.
    pub api_key: String,
}

// Keeps the key out of logs.
impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("url", &self.url)
            .field("api_key", &"*****")
            .finish()
    }
}

impl ExporterConfig {
    /// Creates a configuration with every field set.
    #[must_use]
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            url: Some(url.into()),
            api_key: Some(api_key.into()),
            source: Some(source.into()),
            timeout: DEFAULT_EXPORT_TIMEOUT,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The `source` label, or [`UNKNOWN_SOURCE`] when unset.
    #[must_use]
    pub fn source_label(&self) -> &str {
        self.source.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }

    /// Resolves the endpoint.
    ///
    /// # Errors
    ///
    /// Returns the reason the exporter is disabled: the first missing setting
    /// among URL, key and source, or a URL that fails validation.
    pub fn endpoint(&self) -> Result<Endpoint, ExporterDisabled> {
        let url = self
            .url
            .as_ref()
            .ok_or(ExporterDisabled::Missing("metrics URL"))?;
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(ExporterDisabled::Missing("API key"))?;
        if self.source.is_none() {
            return Err(ExporterDisabled::Missing("source"));
        }
        self.validate()?;

        Ok(Endpoint {
            url: url.clone(),
            api_key: api_key.clone(),
        })
    }

    /// Returns true if pushes will actually be sent.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.endpoint().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_disabled() {
        let config = ExporterConfig::default();
        assert!(!config.is_enabled());
        assert_eq!(config.source_label(), UNKNOWN_SOURCE);
        assert_eq!(config.timeout, DEFAULT_EXPORT_TIMEOUT);
    }

    #[test]
    fn test_fully_configured_is_enabled() {
        let config = ExporterConfig::new("https://otlp.example.com/otlp/v1/metrics", "key", "svc");
        let endpoint = config.endpoint().unwrap();

        assert_eq!(endpoint.url, "https://otlp.example.com/otlp/v1/metrics");
        assert_eq!(endpoint.api_key, "key");
        assert_eq!(config.source_label(), "svc");
    }

    #[test]
    fn test_any_missing_field_disables() {
        let full = ExporterConfig::new("https://otlp.example.com", "key", "svc");

        let mut no_url = full.clone();
        no_url.url = None;
        assert!(!no_url.is_enabled());

        let mut no_key = full.clone();
        no_key.api_key = None;
        assert!(!no_key.is_enabled());

        let mut no_source = full;
        no_source.source = None;
        assert!(matches!(
            no_source.endpoint(),
            Err(ExporterDisabled::Missing("source"))
        ));
    }

    #[test]
    fn test_invalid_url_disables() {
        let config = ExporterConfig::new("not a url", "key", "svc");
        assert!(matches!(
            config.endpoint(),
            Err(ExporterDisabled::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_endpoint_debug_hides_key() {
        let config = ExporterConfig::new("https://otlp.example.com", "secret-token", "svc");
        let debug = format!("{:?}", config.endpoint().unwrap());

        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("*****"));
    }
}
