//! Schema registry module
//!
//! Declares a fixed JSON schema per entity and validates records against it.
//!
//! # Features
//!
//! - **Fixed declarations**: one hand-maintained shape per entity, closed to
//!   undeclared fields
//! - **Coercion**: compatible scalar values are converted to the declared type
//! - **Primary keys**: `object_id` must be present and non-null
//! - **Per-run cache**: a schema is built once and reused for every record

mod declarations;
mod registry;
mod types;
mod validate;

pub use declarations::{declaration, COERCION_POLICY};
pub use registry::SchemaRegistry;
pub use types::{JsonSchema, JsonType, JsonTypeOrArray, SchemaProperty};
pub use validate::{validate, ValidatedRecord};
