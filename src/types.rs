//! Common types used throughout the connector
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single collection item as returned by the API, before validation
pub type RawRecord = JsonObject;

// ============================================================================
// Replication Method
// ============================================================================

/// How an entity is replicated between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Re-extract the whole collection every run
    #[default]
    FullTable,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for `Option<String>` to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}
