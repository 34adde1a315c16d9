//! CLI module
//!
//! Command-line interface for running the connector.
//!
//! # Modes
//!
//! - default - sync every entity to stdout
//! - `--discover` - print the catalog of streams and schemas

mod commands;
mod runner;

pub use commands::Cli;
pub use runner::{catalog, Runner};
