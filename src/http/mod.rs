//! HTTP transport module
//!
//! Authenticated GET against the Shippo API with retry, backoff and
//! client-side rate limiting.
//!
//! # Features
//!
//! - **Automatic Retries**: 429, 5xx, timeouts and connect failures are retried
//! - **Backoff**: Exponential delay with jitter, capped, honouring `Retry-After`
//! - **Rate Limiting**: Optional token bucket limiter using governor
//! - **Transport seam**: Pagination depends on the [`Transport`] trait only

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Performs a GET and returns the parsed JSON body or a classified failure
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `url` (absolute, or relative to the transport's base URL)
    async fn get_json(&self, url: &str) -> Result<Value>;

    /// Resolve `url` to the absolute form that would be fetched
    fn resolve_url(&self, url: &str) -> Result<String>;
}
