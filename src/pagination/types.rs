//! Pagination types and traits
//!
//! Defines the core pagination abstractions used by all strategies.

use crate::decode::Page;
use crate::error::Result;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// More pages available at this URL
    Continue {
        /// URL of the next page
        url: String,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Create a continuation with a new URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self::Continue { url: url.into() }
    }

    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }
}

/// Tracks pagination state while one entity is extracted
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched so far
    pub pages_fetched: usize,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// URL of the next page to fetch, `None` before the first request
    pub cursor: Option<String>,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
        self.cursor = None;
    }

    /// Count one fetched page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Set cursor
    pub fn set_cursor(&mut self, cursor: String) {
        self.cursor = Some(cursor);
    }

    /// Add to total fetched
    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }
}

/// Core trait for pagination strategies
pub trait Paginator: Send + Sync {
    /// URL of the first page, given the resolved collection endpoint
    fn initial_url(&self, endpoint: &str) -> Result<String>;

    /// Process a decoded page and determine if there's a next page
    fn process_page(&self, page: &Page, state: &mut PaginationState) -> NextPage;
}
