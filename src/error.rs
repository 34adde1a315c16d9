//! Error types for the Shippo connector
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, gave up after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Extraction Errors
    // ============================================================================
    #[error("Schema violation in '{entity}' field '{field}': {message}")]
    SchemaViolation {
        entity: String,
        field: String,
        message: String,
    },

    #[error("Protocol error for '{entity}' at {cursor}: {message}")]
    Protocol {
        entity: String,
        cursor: String,
        message: String,
    },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Sync cancelled")]
    Cancelled,

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a schema violation
    pub fn schema_violation(
        entity: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SchemaViolation {
            entity: entity.into(),
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a protocol error
    pub fn protocol(
        entity: impl Into<String>,
        cursor: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Protocol {
            entity: entity.into(),
            cursor: cursor.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout() || e.is_connect(),
            Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Check if this is a schema violation
    pub fn is_schema_violation(&self) -> bool {
        matches!(self, Error::SchemaViolation { .. })
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
