//! Tests for output module

use super::*;
use crate::catalog::{EntityDescriptor, EntityKind, ENTITIES};
use crate::error::Error;
use crate::schema::{declaration, validate, JsonSchema, ValidatedRecord};
use crate::state::State;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn descriptor(kind: EntityKind) -> EntityDescriptor {
    ENTITIES.iter().copied().find(|d| d.kind == kind).unwrap()
}

fn record(kind: EntityKind, id: &str) -> ValidatedRecord {
    let raw = json!({"object_id": id});
    let Value::Object(map) = raw else { unreachable!() };
    validate(&declaration(kind), kind, map).unwrap()
}

fn lines(emitter: Emitter<Vec<u8>>) -> Vec<Value> {
    let bytes = emitter.into_inner();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_schema_message_format() {
    let mut emitter = Emitter::new(Vec::new());
    let refunds = descriptor(EntityKind::Refunds);
    let schema = declaration(EntityKind::Refunds);

    emitter.emit_schema(&refunds, &schema).unwrap();

    let out = lines(emitter);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0]["type"], "SCHEMA");
    assert_eq!(out[0]["stream"], "refunds");
    assert_eq!(out[0]["key_properties"], json!(["object_id"]));
    assert_eq!(out[0]["schema"], schema.to_json());
}

#[test]
fn test_record_message_format() {
    let mut emitter = Emitter::new(Vec::new());
    let parcels = descriptor(EntityKind::Parcels);
    emitter
        .emit_schema(&parcels, &declaration(EntityKind::Parcels))
        .unwrap();
    emitter.emit_record(&record(EntityKind::Parcels, "p1")).unwrap();

    let out = lines(emitter);
    assert_eq!(out[1]["type"], "RECORD");
    assert_eq!(out[1]["stream"], "parcels");
    assert_eq!(out[1]["record"], json!({"object_id": "p1"}));

    let extracted = out[1]["time_extracted"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(extracted).is_ok());
}

#[test]
fn test_state_message_format() {
    let mut emitter = Emitter::new(Vec::new());
    let mut state = State::new();
    state.set_bookmark(
        EntityKind::Shipments,
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    );

    emitter.emit_state(&state).unwrap();

    let out = lines(emitter);
    assert_eq!(
        out[0],
        json!({"type": "STATE", "value": {"shipments": "2024-01-01T00:00:00Z"}})
    );
}

#[test]
fn test_record_before_schema_is_rejected() {
    let mut emitter = Emitter::new(Vec::new());

    let err = emitter
        .emit_record(&record(EntityKind::Addresses, "a1"))
        .unwrap_err();
    assert!(matches!(err, Error::Protocol { .. }));
    assert_eq!(emitter.messages_written(), 0);
    assert!(emitter.into_inner().is_empty());
}

#[test]
fn test_duplicate_schema_is_rejected() {
    let mut emitter = Emitter::new(Vec::new());
    let addresses = descriptor(EntityKind::Addresses);
    let schema = declaration(EntityKind::Addresses);

    emitter.emit_schema(&addresses, &schema).unwrap();
    assert!(emitter.has_schema(EntityKind::Addresses));
    assert!(!emitter.has_schema(EntityKind::Parcels));

    let err = emitter.emit_schema(&addresses, &schema).unwrap_err();
    assert!(matches!(err, Error::Protocol { .. }));
    assert_eq!(emitter.messages_written(), 1);
}

#[test]
fn test_one_message_per_line_in_call_order() {
    let mut emitter = Emitter::new(Vec::new());
    let addresses = descriptor(EntityKind::Addresses);
    let schema: JsonSchema = declaration(EntityKind::Addresses);

    emitter.emit_schema(&addresses, &schema).unwrap();
    for id in ["a1", "a2", "a3"] {
        emitter.emit_record(&record(EntityKind::Addresses, id)).unwrap();
    }
    emitter.emit_state(&State::new()).unwrap();
    assert_eq!(emitter.messages_written(), 5);

    let kinds: Vec<String> = lines(emitter)
        .iter()
        .map(|m| m["type"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(kinds, vec!["SCHEMA", "RECORD", "RECORD", "RECORD", "STATE"]);
}

#[test]
fn test_message_kind() {
    let state = State::new();
    assert_eq!(Message::State { value: &state }.kind(), "STATE");
}

/// Writer that records how many times it was flushed
#[derive(Default)]
struct CountingWriter {
    buf: Vec<u8>,
    flushes: usize,
}

impl std::io::Write for CountingWriter {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

#[test]
fn test_every_message_is_flushed() {
    let mut emitter = Emitter::new(CountingWriter::default());
    emitter.emit_state(&State::new()).unwrap();
    emitter.emit_state(&State::new()).unwrap();

    let writer = emitter.into_inner();
    assert_eq!(writer.flushes, 2);
    assert!(writer.buf.ends_with(b"\n"));
}
