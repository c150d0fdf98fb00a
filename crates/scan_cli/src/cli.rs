//! Command-line arguments.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use scan_api::ScanApiConfig;

/// Scan a git repository for vulnerabilities and stream the findings.
///
/// Press Ctrl-C to stop a running scan; findings received so far are kept.
#[derive(Parser, Debug)]
#[command(name = "repo-scan", version, about, long_about = None)]
pub struct Cli {
    /// URL of the repository to scan.
    pub repository_url: String,

    /// Access token for private repositories.
    #[arg(long, env = "REPO_SCAN_ACCESS_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the scan service.
    #[arg(long, env = "REPO_SCAN_BASE_URL")]
    pub base_url: Option<String>,

    /// Seconds to wait for the connection to the scan service.
    #[arg(long, env = "REPO_SCAN_CONNECT_TIMEOUT_SECS")]
    pub connect_timeout_secs: Option<u64>,

    /// Output format.
    #[arg(long, default_value = "text")]
    pub output: OutputFormat,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Log format written to stderr.
    #[arg(long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per event.
    Text,
    /// One JSON object per event.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Cli {
    /// Transport configuration: environment defaults overridden by flags.
    pub fn api_config(&self) -> ScanApiConfig {
        let mut config = ScanApiConfig::from_env();
        if let Some(base_url) = self.base_url.as_deref().filter(|url| !url.trim().is_empty()) {
            config = config.with_base_url(base_url);
        }
        if let Some(secs) = self.connect_timeout_secs.filter(|secs| *secs > 0) {
            config = config.with_connect_timeout(Duration::from_secs(secs));
        }
        config
    }
}
