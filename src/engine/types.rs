//! Engine types
//!
//! Configuration, statistics and the run report of the sync engine.

use crate::catalog::EntityKind;
use crate::error::Error;
use crate::pagination::DEFAULT_MAX_PAGES;
use std::time::Duration;

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Fail the entity on the first schema violation and abort the run on
    /// the first entity failure
    pub strict: bool,
    /// Page ceiling per entity
    pub max_pages: usize,
    /// Deadline for the whole extraction
    pub run_timeout: Option<Duration>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_pages: DEFAULT_MAX_PAGES,
            run_timeout: None,
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set strict mode
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the page ceiling
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Set the run deadline
    #[must_use]
    pub fn with_run_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout;
        self
    }
}

/// Statistics for one entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records received from the API
    pub records_read: u64,
    /// Records that passed validation and were emitted
    pub records_emitted: u64,
    /// Records dropped for schema violations
    pub records_skipped: u64,
    /// Pages fetched
    pub pages_fetched: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a record received
    pub fn add_read(&mut self) {
        self.records_read += 1;
    }

    /// Count a record emitted
    pub fn add_emitted(&mut self) {
        self.records_emitted += 1;
    }

    /// Count a record skipped
    pub fn add_skipped(&mut self) {
        self.records_skipped += 1;
    }

    /// Count a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// How one entity ended
#[derive(Debug)]
pub enum EntityOutcome {
    /// Fully extracted and checkpointed
    Succeeded {
        /// Extraction statistics
        stats: SyncStats,
    },
    /// Extraction stopped on an error; records already emitted stand
    Failed {
        /// What went wrong
        error: Error,
        /// Statistics up to the failure
        stats: SyncStats,
    },
    /// Not attempted because the run was aborted
    Skipped,
}

impl EntityOutcome {
    /// Check if the entity completed
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    /// Short status label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Succeeded { .. } => "SUCCEEDED",
            Self::Failed { .. } => "FAILED",
            Self::Skipped => "SKIPPED",
        }
    }

    /// Statistics, if the entity was attempted
    pub fn stats(&self) -> Option<&SyncStats> {
        match self {
            Self::Succeeded { stats } | Self::Failed { stats, .. } => Some(stats),
            Self::Skipped => None,
        }
    }
}

/// Result of a whole run, one outcome per entity in sync order
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Outcomes in the order entities were visited
    pub entities: Vec<(EntityKind, EntityOutcome)>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    /// Outcome for an entity
    pub fn outcome(&self, kind: EntityKind) -> Option<&EntityOutcome> {
        self.entities
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, outcome)| outcome)
    }

    /// Check if every entity completed
    pub fn is_success(&self) -> bool {
        self.entities.iter().all(|(_, outcome)| outcome.is_success())
    }

    /// Entities that did not complete
    pub fn incomplete(&self) -> impl Iterator<Item = EntityKind> + '_ {
        self.entities
            .iter()
            .filter(|(_, outcome)| !outcome.is_success())
            .map(|(kind, _)| *kind)
    }

    /// Process exit status: 0 when every entity completed, 1 otherwise
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_success())
    }
}
