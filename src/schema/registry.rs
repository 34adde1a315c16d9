//! Per-run schema cache

use super::declarations::declaration;
use super::types::JsonSchema;
use super::validate::{validate, ValidatedRecord};
use crate::catalog::{EntityDescriptor, EntityKind};
use crate::error::{Error, Result};
use crate::types::RawRecord;
use std::collections::HashMap;

/// Holds the schema of every entity declared during a run
///
/// A schema is built on first `declare` and never changes afterwards, so all
/// records of an entity are validated against the shape that was emitted.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<EntityKind, JsonSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the schema for an entity, building it on first use
    pub fn declare(&mut self, descriptor: &EntityDescriptor) -> &JsonSchema {
        self.schemas
            .entry(descriptor.kind)
            .or_insert_with(|| declaration(descriptor.kind))
    }

    /// Schema for an entity, if already declared
    pub fn get(&self, kind: EntityKind) -> Option<&JsonSchema> {
        self.schemas.get(&kind)
    }

    /// Validate a raw record against its entity's declared schema
    pub fn validate(&self, kind: EntityKind, raw: RawRecord) -> Result<ValidatedRecord> {
        let schema = self.get(kind).ok_or_else(|| {
            Error::Other(format!("schema for '{kind}' validated before it was declared"))
        })?;
        validate(schema, kind, raw)
    }
}
