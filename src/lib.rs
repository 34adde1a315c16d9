// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # Shippo Sync
//!
//! Full-table extraction of the Shippo shipping API as a stream of
//! `SCHEMA`, `RECORD` and `STATE` messages.
//!
//! ## Features
//!
//! - **Five collections**: addresses, parcels, shipments, transactions, refunds
//! - **Next-URL pagination**: lazy, bounded by a page ceiling
//! - **Retry with backoff**: 429 and 5xx retried with jittered exponential delay
//! - **Fixed schemas**: records validated and coerced before emission
//! - **Checkpoints**: state rewritten atomically after every completed entity
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shippo_sync::config::Config;
//! use shippo_sync::engine::SyncEngine;
//! use shippo_sync::http::HttpClient;
//! use shippo_sync::output::Emitter;
//! use shippo_sync::state::StateManager;
//!
//! #[tokio::main]
//! async fn main() -> shippo_sync::Result<()> {
//!     let config = Config::load("config.json").await?;
//!     let client = HttpClient::with_config(config.http_config())?;
//!     let state = StateManager::load("state.json").await?;
//!
//!     let mut engine = SyncEngine::new(client, Emitter::stdout(), state)
//!         .with_config(config.sync_config())
//!         .with_paginator(config.paginator());
//!     let report = engine.run().await?;
//!     std::process::exit(report.exit_code());
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  SyncEngine: for each entity → SCHEMA, RECORD…, STATE         │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//! ┌────────────┬─────────────┬───┴──────────┬───────────┬─────────┐
//! │   HTTP     │  Paginate   │   Schema     │  Output   │  State  │
//! ├────────────┼─────────────┼──────────────┼───────────┼─────────┤
//! │ Retry      │ next URL    │ Declare      │ NDJSON    │ Merge   │
//! │ Backoff    │ Page limit  │ Validate     │ Ordering  │ Atomic  │
//! │ Rate Limit │ Loop check  │ Coerce       │ Flush     │ save    │
//! └────────────┴─────────────┴──────────────┴───────────┴─────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the connector
pub mod error;

/// Common types and type aliases
pub mod types;

/// The supported entities
pub mod catalog;

/// HTTP client with retry and rate limiting
pub mod http;

/// Response body decoding
pub mod decode;

/// Pagination strategies
pub mod pagination;

/// Fixed schemas and record validation
pub mod schema;

/// Message stream output
pub mod output;

/// State management and checkpointing
pub mod state;

/// Main execution engine
pub mod engine;

/// Connector configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
