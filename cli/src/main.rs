//! Telemetry CLI
//!
//! Operator tool for the pizza service telemetry pipeline.
//!
//! # Usage
//!
//! ```bash
//! telemetry-cli --help
//! telemetry-cli system
//! telemetry-cli preview --pretty --request "GET /api/order/menu"
//! telemetry-cli --metrics-url https://otlp.example.com/v1/metrics --api-key KEY --source dev push
//! ```

#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use telemetry::{
    ExporterConfig, MetricsReporter, PushOutcome, SystemMonitor, SystemSampler, Telemetry,
    TelemetryConfig,
};

/// Telemetry CLI - preview and push pizza service metrics
#[derive(Parser)]
#[command(name = "telemetry-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Metrics ingestion URL
    #[arg(long, env = "TELEMETRY_METRICS_URL")]
    metrics_url: Option<String>,

    /// Bearer token for the ingestion endpoint
    #[arg(long, env = "TELEMETRY_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Deployment label attached to every metric
    #[arg(long, env = "TELEMETRY_SOURCE")]
    source: Option<String>,

    /// Export request timeout in seconds
    #[arg(long, env = "TELEMETRY_EXPORT_TIMEOUT_SECS", default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print current host CPU and memory utilisation
    System,

    /// Print the export body one tick would send
    Preview {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Seed a request, as "METHOD /path" (repeatable)
        #[arg(long = "request", value_parser = parse_request)]
        requests: Vec<(String, String)>,
    },

    /// Push one tick to the configured endpoint and report the outcome
    Push {
        /// Seed a request, as "METHOD /path" (repeatable)
        #[arg(long = "request", value_parser = parse_request)]
        requests: Vec<(String, String)>,
    },
}

fn parse_request(value: &str) -> Result<(String, String), String> {
    let (method, path) = value
        .trim()
        .split_once(' ')
        .ok_or_else(|| format!("expected \"METHOD /path\", got '{value}'"))?;
    let path = path.trim();
    if method.is_empty() || !path.starts_with('/') {
        return Err(format!("expected \"METHOD /path\", got '{value}'"));
    }
    Ok((method.to_ascii_uppercase(), path.to_string()))
}

impl Cli {
    fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            exporter: ExporterConfig {
                url: self.metrics_url.clone(),
                api_key: self.api_key.clone(),
                source: self.source.clone(),
                timeout: Duration::from_secs(self.timeout_secs.max(1)),
            },
            ..TelemetryConfig::default()
        }
    }

    fn seeded_reporter(&self, requests: &[(String, String)]) -> MetricsReporter {
        let telemetry = Arc::new(Telemetry::new());
        for (method, path) in requests {
            telemetry.observe_request(method, path);
        }
        MetricsReporter::new(telemetry, &self.telemetry_config())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::System) => {
            let mut monitor = SystemMonitor::new();
            let sample = monitor.sample();
            println!("cpu_usage:    {:.2}%", sample.cpu_percent);
            println!("memory_usage: {:.2}%", sample.memory_percent);
        }
        Some(Commands::Preview { pretty, requests }) => {
            let metrics = cli.seeded_reporter(requests).collect();
            let request = telemetry::otlp::metrics_to_request(&metrics);
            let body = if *pretty {
                serde_json::to_string_pretty(&request)
            } else {
                serde_json::to_string(&request)
            }
            .context("Failed to encode metrics")?;
            println!("{body}");
        }
        Some(Commands::Push { requests }) => {
            let reporter = cli.seeded_reporter(requests);
            if !reporter.exporter_enabled() {
                bail!("Exporter is not configured: set --metrics-url, --api-key and --source");
            }
            match reporter.flush_now().await {
                PushOutcome::Delivered => println!("Metrics delivered"),
                PushOutcome::Rejected { status } => {
                    bail!("Endpoint rejected push with status {status}")
                }
                PushOutcome::Failed => bail!("Push failed, see log output"),
                PushOutcome::Skipped => bail!("Push skipped"),
            }
        }
        None => {
            println!("Telemetry CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse() {
        let cli = Cli::try_parse_from(["telemetry-cli"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_preview_with_requests() {
        let cli = Cli::try_parse_from([
            "telemetry-cli",
            "preview",
            "--pretty",
            "--request",
            "get /api/order/menu",
            "--request",
            "POST /api/order",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Preview { pretty, requests }) => {
                assert!(pretty);
                assert_eq!(
                    requests,
                    vec![
                        ("GET".to_string(), "/api/order/menu".to_string()),
                        ("POST".to_string(), "/api/order".to_string()),
                    ]
                );
            }
            _ => panic!("expected preview command"),
        }
    }

    #[test]
    fn test_cli_rejects_malformed_request() {
        let cli = Cli::try_parse_from(["telemetry-cli", "preview", "--request", "GET"]);
        assert!(cli.is_err());

        let cli = Cli::try_parse_from(["telemetry-cli", "push", "--request", "GET api"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_cli_builds_exporter_config() {
        let cli = Cli::try_parse_from([
            "telemetry-cli",
            "--metrics-url",
            "https://otlp.example.com/v1/metrics",
            "--api-key",
            "key",
            "--source",
            "dev",
            "--timeout-secs",
            "3",
            "push",
        ])
        .unwrap();

        let config = cli.telemetry_config();
        assert!(config.exporter.is_enabled());
        assert_eq!(config.exporter.timeout, Duration::from_secs(3));
        assert!(matches!(cli.command, Some(Commands::Push { .. })));
    }

    #[test]
    fn test_seeded_reporter_counts_requests() {
        let cli = Cli::try_parse_from(["telemetry-cli", "system"]).unwrap();
        let reporter = cli.seeded_reporter(&[("GET".to_string(), "/".to_string())]);

        let metrics = reporter.collect();
        let total = metrics
            .iter()
            .find(|m| m.name == "http_total_requests")
            .unwrap();
        assert_eq!(total.value, telemetry::MetricValue::Int(1));
    }
}
