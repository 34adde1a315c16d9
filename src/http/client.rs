//! HTTP client with retry and rate limiting
//!
//! Provides the transport used by pagination. It handles:
//! - Automatic retries of the same URL with jittered exponential backoff
//! - Rate limiting to prevent API throttling
//! - Response body parsing
//! - Error classification for retry decisions

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::Transport;
use crate::error::{Error, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the HTTP client
#[derive(Clone)]
pub struct HttpClientConfig {
    /// Base URL relative paths are joined to
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Randomise each delay within its upper half
    pub jitter: bool,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(300),
            max_retries: 5,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
            jitter: true,
            rate_limit: None,
            default_headers: HashMap::new(),
            user_agent: format!("shippo-sync/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

impl std::fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // header values carry the API token
        let header_names: Vec<&String> = self.default_headers.keys().collect();
        f.debug_struct("HttpClientConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff", &self.initial_backoff)
            .field("max_backoff", &self.max_backoff)
            .field("jitter", &self.jitter)
            .field("rate_limit", &self.rate_limit)
            .field("default_headers", &header_names)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the exponential backoff bounds
    pub fn backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Enable or disable jitter
    pub fn jitter(mut self, enabled: bool) -> Self {
        self.config.jitter = enabled;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Authenticate every request with a Shippo API token
    pub fn shippo_token(self, token: &str) -> Self {
        self.header("Authorization", format!("ShippoToken {token}"))
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// GET a URL and parse the JSON body, retrying the same URL on
    /// retryable failures
    pub async fn request_json(&self, url: &str) -> Result<Value> {
        let full_url = self.build_url(url)?;
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let mut req = self.client.get(full_url.clone());
            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }

            debug!(url = %full_url, attempt, "GET");

            let (error, retry_after) = match req.send().await {
                Ok(response) => {
                    let retry_after = if response.status() == StatusCode::TOO_MANY_REQUESTS {
                        extract_retry_after(&response)
                    } else {
                        None
                    };
                    match read_response(response).await {
                        Ok(body) => return Ok(body),
                        Err(e) => (e, retry_after),
                    }
                }
                Err(e) => (Error::Transport(e), None),
            };

            if !error.is_retryable() || attempt >= max_retries {
                return Err(self.final_error(error, attempt));
            }

            let mut delay = self.jittered_backoff(attempt);
            if let Some(retry_after) = retry_after {
                delay = delay.max(retry_after).min(self.config.max_backoff);
            }
            warn!(
                url = %full_url,
                error = %error,
                "Request failed, attempt {}/{}, retrying in {:?}",
                attempt + 1,
                max_retries + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Error reported once an attempt is not retried
    fn final_error(&self, error: Error, retries: u32) -> Error {
        match error {
            Error::HttpStatus { status: 429, .. } => Error::RateLimited { retries },
            Error::Transport(e) if e.is_timeout() => Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            },
            other => other,
        }
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }

        match &self.config.base_url {
            Some(base) => {
                let base = format!("{}/", base.trim_end_matches('/'));
                Ok(Url::parse(&base)?.join(path.trim_start_matches('/'))?)
            }
            None => Ok(Url::parse(path)?),
        }
    }

    /// Calculate the backoff ceiling for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        let delay = self.config.initial_backoff.saturating_mul(factor);
        std::cmp::min(delay, self.config.max_backoff)
    }

    /// Backoff for an attempt, randomised within `[ceiling / 2, ceiling]`
    /// when jitter is enabled
    pub fn jittered_backoff(&self, attempt: u32) -> Duration {
        let ceiling = self.calculate_backoff(attempt);
        if !self.config.jitter {
            return ceiling;
        }
        let half = ceiling / 2;
        let spread = (ceiling - half).as_millis() as u64;
        let extra = rand::thread_rng().gen_range(0..=spread);
        half + Duration::from_millis(extra)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn get_json(&self, url: &str) -> Result<Value> {
        self.request_json(url).await
    }

    fn resolve_url(&self, url: &str) -> Result<String> {
        Ok(self.build_url(url)?.to_string())
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Read and parse a successful response body
/// Parse a successful body, or classify the status as an error
async fn read_response(response: Response) -> Result<Value> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::http_status(status.as_u16(), body));
    }
    let text = response.text().await?;
    Ok(serde_json::from_str(&text)?)
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
