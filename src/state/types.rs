//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::catalog::EntityKind;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Bookmark map: stream name to the time its last full extraction completed
///
/// Serialized as a flat JSON object. Keys written by the connector are always
/// entity names; other keys come from prior state and are carried through
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct State(BTreeMap<String, Value>);

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the raw value stored under a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Bookmark of an entity, if it is a string
    pub fn bookmark(&self, kind: EntityKind) -> Option<&str> {
        self.0.get(kind.name()).and_then(Value::as_str)
    }

    /// Record that an entity's extraction completed at `completed_at`
    pub fn set_bookmark(&mut self, kind: EntityKind, completed_at: DateTime<Utc>) {
        self.0.insert(
            kind.name().to_string(),
            Value::String(completed_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
    }

    /// Merge another state into this one; keys in `other` win
    pub fn merge(&mut self, other: State) {
        self.0.extend(other.0);
    }

    /// All keys, in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Keys that do not name a supported entity
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.keys().filter(|k| !EntityKind::is_known(k))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the state holds no keys
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<String, Value>> for State {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}
