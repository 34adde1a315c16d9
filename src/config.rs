//! Connector configuration
//!
//! Loaded from a JSON file. Keys this connector does not know, such as a
//! legacy `start_date`, are ignored.

use crate::engine::SyncConfig;
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::pagination::{NextUrlPaginator, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Complete connector configuration
#[derive(Clone, Deserialize)]
pub struct Config {
    /// Shippo API token
    #[serde(default)]
    pub token: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent sent with every request
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Abort on the first schema violation or entity failure
    #[serde(default)]
    pub strict: bool,

    /// Page ceiling per entity
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum number of retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Deadline for the whole run in seconds
    #[serde(default)]
    pub run_timeout_secs: Option<u64>,

    /// Client-side request throttle
    #[serde(default)]
    pub requests_per_second: Option<u32>,
}

fn default_base_url() -> String {
    "https://api.goshippo.com/".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_max_retries() -> u32 {
    5
}

fn default_initial_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    60000
}

fn default_request_timeout_secs() -> u64 {
    300
}

impl Config {
    /// Read and validate a config file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&contents)
    }

    /// Parse and validate config JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(Error::missing_field("token"));
        }
        Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("Invalid base_url '{}': {e}", self.base_url)))?;
        if self.page_size == 0 {
            return Err(Error::config("page_size must be at least 1"));
        }
        if self.max_pages == 0 {
            return Err(Error::config("max_pages must be at least 1"));
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(Error::config(
                "max_backoff_ms must not be lower than initial_backoff_ms",
            ));
        }
        if self.requests_per_second == Some(0) {
            return Err(Error::config("requests_per_second must be at least 1"));
        }
        Ok(())
    }

    /// HTTP client settings, including the auth header
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(&self.base_url)
            .shippo_token(&self.token)
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .max_retries(self.max_retries)
            .backoff(
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            );

        if let Some(agent) = &self.user_agent {
            builder = builder.user_agent(agent);
        }
        if let Some(rps) = self.requests_per_second {
            builder = builder.rate_limit(RateLimiterConfig::per_second(rps));
        }
        builder.build()
    }

    /// Orchestrator settings
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::new()
            .with_strict(self.strict)
            .with_max_pages(self.max_pages)
            .with_run_timeout(self.run_timeout_secs.map(Duration::from_secs))
    }

    /// Pagination strategy with the configured page size
    pub fn paginator(&self) -> NextUrlPaginator {
        NextUrlPaginator::new(self.page_size)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"***")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("page_size", &self.page_size)
            .field("strict", &self.strict)
            .field("max_pages", &self.max_pages)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff_ms", &self.initial_backoff_ms)
            .field("max_backoff_ms", &self.max_backoff_ms)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("run_timeout_secs", &self.run_timeout_secs)
            .field("requests_per_second", &self.requests_per_second)
            .finish()
    }
}
