//! Tests for state manager

use super::*;
use crate::catalog::{EntityKind, ENTITIES};
use crate::Error;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::TempDir;

fn read_json(path: &std::path::Path) -> Value {
    let contents = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&contents).unwrap()
}

#[test]
fn test_in_memory_is_empty() {
    let manager = StateManager::in_memory();
    assert!(manager.state().is_empty());
    assert!(manager.path().is_none());
}

#[tokio::test]
async fn test_in_memory_save_is_noop() {
    let mut manager = StateManager::in_memory();
    manager.checkpoint(EntityKind::Parcels, Utc::now());
    manager.save().await.unwrap();
    assert!(manager.state().bookmark(EntityKind::Parcels).is_some());
}

#[tokio::test]
async fn test_load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    let manager = StateManager::load(&path).await.unwrap();
    assert!(manager.state().is_empty());
    assert_eq!(manager.path(), Some(path.as_path()));
}

#[tokio::test]
async fn test_load_malformed_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ this is not json").unwrap();

    let manager = StateManager::load(&path).await.unwrap();
    assert!(manager.state().is_empty());
}

#[tokio::test]
async fn test_load_non_utf8_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, [0xff, 0xfe, b'{', b'}']).unwrap();

    let mut manager = StateManager::load(&path).await.unwrap();
    assert!(manager.state().is_empty());

    manager.checkpoint(EntityKind::Refunds, Utc::now());
    manager.save().await.unwrap();
    assert_eq!(read_json(&path).as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_load_non_object_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let manager = StateManager::load(&path).await.unwrap();
    assert!(manager.state().is_empty());
}

#[tokio::test]
async fn test_load_takes_last_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(
        &path,
        "{\"refunds\": \"2023-01-01T00:00:00Z\"}\n{\"refunds\": \"2024-01-01T00:00:00Z\"}\n",
    )
    .unwrap();

    let manager = StateManager::load(&path).await.unwrap();
    assert_eq!(
        manager.state().bookmark(EntityKind::Refunds),
        Some("2024-01-01T00:00:00Z")
    );
}

#[tokio::test]
async fn test_save_overwrites_whole_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, r#"{"parcels": "2020-01-01T00:00:00Z", "padding": "xxxxxxxxxxxxxxxxxxxxxxxx"}"#)
        .unwrap();

    let mut manager = StateManager::load(&path).await.unwrap();
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    manager.checkpoint(EntityKind::Parcels, at);
    manager.save().await.unwrap();

    assert_eq!(
        read_json(&path),
        json!({"parcels": "2024-06-01T12:00:00Z", "padding": "xxxxxxxxxxxxxxxxxxxxxxxx"})
    );
    assert!(!path.with_extension("tmp").exists());
}

#[tokio::test]
async fn test_commit_persists_bookmark() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");

    let mut manager = StateManager::load(&path).await.unwrap();
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
    manager.commit(EntityKind::Shipments, at).await.unwrap();

    assert_eq!(read_json(&path), json!({"shipments": "2024-03-01T08:30:00Z"}));
}

#[tokio::test]
async fn test_failed_commit_keeps_previous_bookmark() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("state.json");

    let prior: State = serde_json::from_value(json!({"parcels": "2020-01-01T00:00:00Z"})).unwrap();
    let mut manager = StateManager::load(&path).await.unwrap();
    manager.merge(prior.clone());

    let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
    let err = manager.commit(EntityKind::Parcels, at).await.unwrap_err();
    assert!(matches!(err, Error::State { .. }), "{err}");
    assert_eq!(manager.state(), &prior);
    assert!(manager.commit(EntityKind::Refunds, at).await.is_err());
    assert!(manager.state().bookmark(EntityKind::Refunds).is_none());
}

#[tokio::test]
async fn test_unknown_keys_survive_a_full_checkpoint_cycle() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(
        &path,
        r#"{"legacy_cursor": {"page": 7}, "shipments": "2020-01-01T00:00:00Z"}"#,
    )
    .unwrap();

    let mut manager = StateManager::load(&path).await.unwrap();
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for descriptor in &ENTITIES {
        manager.checkpoint(descriptor.kind, at);
        manager.save().await.unwrap();
    }

    let saved = read_json(&path);
    assert_eq!(saved["legacy_cursor"], json!({"page": 7}));
    for descriptor in &ENTITIES {
        assert_eq!(saved[descriptor.name()], "2024-01-01T00:00:00Z");
    }
    assert_eq!(saved.as_object().unwrap().len(), 6);
}

#[tokio::test]
async fn test_with_state_merges_prior() {
    let prior: State = serde_json::from_value(json!({"addresses": "x"})).unwrap();
    let mut manager = StateManager::with_state(prior);

    let newer: State = serde_json::from_value(json!({"addresses": "y", "refunds": "z"})).unwrap();
    manager.merge(newer);

    assert_eq!(manager.state().get("addresses"), Some(&json!("y")));
    assert_eq!(manager.state().len(), 2);
}
