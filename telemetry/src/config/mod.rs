//! Configuration for the telemetry pipeline.
//!
//! Everything is read once at process start. Values come from environment
//! variables (binaries load a `.env` file first), each with a default:
//!
//! - `TELEMETRY_METRICS_URL`: ingestion URL (unset disables the exporter)
//! - `TELEMETRY_API_KEY`: bearer token (unset disables the exporter)
//! - `TELEMETRY_SOURCE`: `source` label (unset disables the exporter)
//! - `TELEMETRY_INTERVAL_SECS`: tick period (default: 60)
//! - `TELEMETRY_EXPORT_TIMEOUT_SECS`: export request timeout (default: 10)
//! - `TELEMETRY_SESSION_TTL_SECS`: session inactivity threshold (default: 300)

pub mod exporter;

pub use exporter::{
    Endpoint, ExporterConfig, ExporterDisabled, DEFAULT_EXPORT_TIMEOUT, UNKNOWN_SOURCE,
};

use crate::aggregator::sessions::DEFAULT_SESSION_TTL_SECS;
use std::time::Duration;
use thiserror::Error;

/// Default tick period.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// Upper bound accepted for any configured duration (one year).
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but is not a valid number of seconds.
    #[error("{var} must be a whole number of seconds, got '{value}'")]
    InvalidSeconds {
        /// The variable name.
        var: &'static str,
        /// The rejected value.
        value: String,
    },

    /// A duration that must be positive is zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    /// A duration exceeds [`MAX_DURATION_SECS`].
    #[error("{var} must be at most one year, got {secs} seconds")]
    TooLarge {
        /// The variable name.
        var: &'static str,
        /// The rejected number of seconds.
        secs: u64,
    },
}

/// Complete telemetry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Exporter settings.
    pub exporter: ExporterConfig,
    /// Tick period.
    pub interval: Duration,
    /// Inactivity threshold after which a session is swept.
    pub session_ttl: Duration,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            exporter: ExporterConfig::default(),
            interval: DEFAULT_INTERVAL,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS.unsigned_abs()),
        }
    }
}

impl TelemetryConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a duration variable is set but unparseable, zero or
    /// longer than a year.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a duration variable is set but unparseable, zero or
    /// longer than a year.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let seconds = |var: &'static str, default: Duration| -> Result<Duration, ConfigError> {
            let Some(value) = get(var) else {
                return Ok(default);
            };
            let secs = value
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeconds { var, value })?;
            if secs == 0 {
                return Err(ConfigError::Zero(var));
            }
            if secs > MAX_DURATION_SECS {
                return Err(ConfigError::TooLarge { var, secs });
            }
            Ok(Duration::from_secs(secs))
        };

        let defaults = Self::default();
        let exporter = ExporterConfig {
            url: get("TELEMETRY_METRICS_URL"),
            api_key: get("TELEMETRY_API_KEY"),
            source: get("TELEMETRY_SOURCE"),
            timeout: seconds("TELEMETRY_EXPORT_TIMEOUT_SECS", DEFAULT_EXPORT_TIMEOUT)?,
        };

        Ok(Self {
            exporter,
            interval: seconds("TELEMETRY_INTERVAL_SECS", defaults.interval)?,
            session_ttl: seconds("TELEMETRY_SESSION_TTL_SECS", defaults.session_ttl)?,
        })
    }

    /// The session threshold as a `chrono` duration, for the sweep.
    #[must_use]
    pub fn session_ttl_chrono(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.session_ttl).unwrap_or_else(|_| {
            tracing::warn!(
                secs = self.session_ttl.as_secs(),
                "Session threshold out of range, using the default"
            );
            crate::aggregator::default_session_ttl()
        })
    }
}
