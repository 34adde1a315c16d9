//! Output message types

use crate::schema::JsonSchema;
use crate::state::State;
use crate::types::JsonObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One line of the output stream
///
/// Serialized with a `type` tag of `SCHEMA`, `RECORD` or `STATE`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message<'a> {
    /// Shape of the records that follow for a stream
    Schema {
        /// Stream name
        stream: &'a str,
        /// Record schema
        schema: &'a JsonSchema,
        /// Primary-key fields
        key_properties: &'a [&'a str],
    },
    /// One validated record
    Record {
        /// Stream name
        stream: &'a str,
        /// Record fields
        record: &'a JsonObject,
        /// When the record was extracted
        time_extracted: DateTime<Utc>,
    },
    /// Snapshot of the bookmark map
    State {
        /// Full state value
        value: &'a State,
    },
}

impl Message<'_> {
    /// Wire name of this message kind
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Schema { .. } => "SCHEMA",
            Message::Record { .. } => "RECORD",
            Message::State { .. } => "STATE",
        }
    }
}
