//! State management module
//!
//! Tracks the per-entity bookmark map and persists it between runs.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - flat mapping from stream name to completion timestamp
//! - `StateManager` - loads prior state, merges it and rewrites the file
//!   atomically at every checkpoint

mod manager;
mod types;

pub use manager::StateManager;
pub use types::State;

#[cfg(test)]
mod manager_tests;
