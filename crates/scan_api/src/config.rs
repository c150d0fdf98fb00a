use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

use crate::url::DEFAULT_SCAN_BASE_URL;

pub const ENV_BASE_URL: &str = "REPO_SCAN_BASE_URL";
pub const ENV_CONNECT_TIMEOUT_SECS: &str = "REPO_SCAN_CONNECT_TIMEOUT_SECS";

/// Transport configuration for scan requests.
#[derive(Debug, Clone)]
pub struct ScanApiConfig {
    /// Base URL of the scan service.
    pub base_url: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional connect timeout. The body itself is unbounded since scans run long.
    pub connect_timeout: Option<Duration>,
}

impl Default for ScanApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SCAN_BASE_URL.to_string(),
            user_agent: None,
            extra_headers: BTreeMap::new(),
            connect_timeout: None,
        }
    }
}

impl ScanApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `REPO_SCAN_*` environment variables.
    ///
    /// Blank or unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(base_url) = env_string_opt(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        config.connect_timeout = env_string_opt(ENV_CONNECT_TIMEOUT_SECS)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        config
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}
