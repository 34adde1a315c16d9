//! Newline-delimited JSON message writer

use super::message::Message;
use crate::catalog::{EntityDescriptor, EntityKind};
use crate::error::{Error, Result};
use crate::schema::{JsonSchema, ValidatedRecord};
use crate::state::State;
use chrono::Utc;
use std::collections::HashSet;
use std::io::{self, Write};

/// Writes the message stream, one JSON document per line
///
/// Every message is flushed as soon as it is written. A record for an
/// entity whose schema has not been emitted, or a second schema for the same
/// entity, is rejected with [`Error::Protocol`] and nothing is written.
#[derive(Debug)]
pub struct Emitter<W: Write> {
    writer: W,
    declared: HashSet<EntityKind>,
    messages_written: u64,
}

impl Emitter<io::Stdout> {
    /// Emitter writing to the process's standard output
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Emitter<W> {
    /// Create an emitter over any writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            declared: HashSet::new(),
            messages_written: 0,
        }
    }

    /// Emit an entity's schema; allowed once per entity
    pub fn emit_schema(&mut self, descriptor: &EntityDescriptor, schema: &JsonSchema) -> Result<()> {
        if self.declared.contains(&descriptor.kind) {
            return Err(Error::protocol(
                descriptor.name(),
                "-",
                "schema already emitted for this stream",
            ));
        }

        self.write(&Message::Schema {
            stream: descriptor.name(),
            schema,
            key_properties: descriptor.key_properties,
        })?;
        self.declared.insert(descriptor.kind);
        Ok(())
    }

    /// Emit one validated record
    pub fn emit_record(&mut self, record: &ValidatedRecord) -> Result<()> {
        let entity = record.entity();
        if !self.declared.contains(&entity) {
            return Err(Error::protocol(
                entity.name(),
                "-",
                "record emitted before the stream's schema",
            ));
        }

        self.write(&Message::Record {
            stream: entity.name(),
            record: record.fields(),
            time_extracted: Utc::now(),
        })
    }

    /// Emit a snapshot of the full state
    pub fn emit_state(&mut self, state: &State) -> Result<()> {
        self.write(&Message::State { value: state })
    }

    /// Whether an entity's schema has been emitted
    pub fn has_schema(&self, kind: EntityKind) -> bool {
        self.declared.contains(&kind)
    }

    /// Number of messages written so far
    pub fn messages_written(&self) -> u64 {
        self.messages_written
    }

    /// Get the underlying writer back
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(&mut self, message: &Message<'_>) -> Result<()> {
        let mut line = serde_json::to_vec(message)?;
        line.push(b'\n');
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        self.messages_written += 1;
        Ok(())
    }
}
