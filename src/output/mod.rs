//! Output module
//!
//! Serializes the message stream consumed by downstream loaders.
//!
//! # Overview
//!
//! Three message kinds are written to standard output as newline-delimited
//! JSON, distinguished by their `type` field:
//! - `SCHEMA` - stream name, record schema and key properties
//! - `RECORD` - stream name, validated record and extraction time
//! - `STATE` - the full bookmark map

mod emitter;
mod message;

pub use emitter::Emitter;
pub use message::Message;

#[cfg(test)]
mod tests;
