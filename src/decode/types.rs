//! Decoder types and traits

use crate::error::Result;
use crate::types::RawRecord;
use serde_json::Value;

/// One decoded page of a collection
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Records in the order the API returned them
    pub records: Vec<RawRecord>,
    /// Cursor for the next page, `None` at exhaustion
    pub next: Option<String>,
}

impl Page {
    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether this page carries no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Trait for decoding response bodies into pages
pub trait PageDecoder: Send + Sync {
    /// Decode a parsed response body
    fn decode(&self, body: &Value) -> Result<Page>;
}
