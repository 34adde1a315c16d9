//! State manager implementation
//!
//! Provides file-based state persistence with atomic writes.

use super::types::State;
use crate::catalog::EntityKind;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Owns the run's state and its backing file
///
/// Only the sync orchestrator mutates state, so the manager is a plain owned
/// value rather than a shared lock.
#[derive(Debug, Default)]
pub struct StateManager {
    /// Path to the state file, `None` for in-memory mode
    path: Option<PathBuf>,
    /// Current state
    state: State,
}

impl StateManager {
    /// Create an in-memory state manager (no file persistence)
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create an in-memory state manager seeded with prior state
    pub fn with_state(state: State) -> Self {
        let mut manager = Self::in_memory();
        manager.merge(state);
        manager
    }

    /// Load prior state from a file and keep the file as the save target
    ///
    /// A missing file yields empty state. Malformed contents are logged and
    /// treated as empty. Any other read failure is an error.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let prior = match tokio::fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes)
                .ok()
                .and_then(|contents| parse_state(&contents))
                .unwrap_or_else(|| {
                    warn!(path = %path.display(), "State file is not a JSON object, starting empty");
                    State::new()
                }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No state file, starting empty");
                State::new()
            }
            Err(e) => {
                return Err(Error::state(format!(
                    "Failed to read state file {}: {e}",
                    path.display()
                )))
            }
        };

        let mut manager = Self {
            path: Some(path),
            state: State::new(),
        };
        manager.merge(prior);
        Ok(manager)
    }

    /// Merge prior state in; its keys overwrite existing ones
    pub fn merge(&mut self, prior: State) {
        self.state.merge(prior);
    }

    /// Record a completed entity
    pub fn checkpoint(&mut self, kind: EntityKind, completed_at: DateTime<Utc>) {
        self.state.set_bookmark(kind, completed_at);
    }

    /// Record a completed entity and persist it
    ///
    /// If the save fails the bookmark is dropped again, so the in-memory
    /// state never holds a checkpoint that is not on disk.
    pub async fn commit(&mut self, kind: EntityKind, completed_at: DateTime<Utc>) -> Result<()> {
        let previous = self.state.clone();
        self.checkpoint(kind, completed_at);
        if let Err(e) = self.save().await {
            warn!(entity = %kind, error = %e, "Checkpoint not persisted");
            self.state = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Overwrite the state file with the current state
    ///
    /// Writes a sibling temp file and renames it over the target so a crash
    /// never leaves a partially written state file.
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(()); // In-memory mode
        };

        let contents = serde_json::to_string(&self.state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))?;

        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        debug!(path = %path.display(), keys = self.state.len(), "State saved");
        Ok(())
    }
}

/// Parse state file contents
///
/// Accepts a single JSON object, or several newline-separated objects of
/// which the last one wins.
fn parse_state(contents: &str) -> Option<State> {
    let trimmed = contents.trim();
    if trimmed.is_empty() {
        return Some(State::new());
    }

    if let Ok(state) = serde_json::from_str::<State>(trimmed) {
        return Some(state);
    }

    let last = trimmed.lines().rev().find(|line| !line.trim().is_empty())?;
    serde_json::from_str::<State>(last.trim()).ok()
}
