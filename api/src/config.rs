//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use telemetry::TelemetryConfig;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `SERVICE_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `SERVICE_PORT`: The port to listen on (default: 3000)
/// - `TELEMETRY_*`: See [`telemetry::config`]
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Telemetry reporter settings.
    pub telemetry: TelemetryConfig,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `SERVICE_PORT` is set but cannot be parsed as a valid port number
    /// - A `TELEMETRY_*` duration is set but invalid
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SERVICE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("SERVICE_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()
            .context("SERVICE_PORT must be a valid port number")?
            .unwrap_or(3000);

        let telemetry = TelemetryConfig::from_env()?;

        Ok(Self {
            host,
            port,
            telemetry,
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the host and port do not form a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            telemetry: TelemetryConfig::default(),
        }
    }
}
