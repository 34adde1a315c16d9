//! Tests for engine module

use super::*;
use crate::catalog::EntityKind;
use crate::state::State;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

const BASE: &str = "https://api.test/";

/// In-memory transport serving canned bodies by URL
#[derive(Default)]
struct ScriptedTransport {
    bodies: HashMap<String, Value>,
    delay: Option<Duration>,
}

impl ScriptedTransport {
    /// Serve one page of `ids` for an entity, optionally followed by more
    fn first_page(mut self, entity: &str, ids: &[&str], next: Option<&str>) -> Self {
        let url = format!("{BASE}{entity}/?results=1000");
        self.bodies.insert(url, page(ids, next));
        self
    }

    fn body(mut self, url: &str, body: Value) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    /// Every entity returns one record
    fn all_single() -> Self {
        ENTITIES.iter().fold(Self::default(), |t, d| {
            let id = format!("{}-1", d.name());
            t.first_page(d.name(), &[id.as_str()], None)
        })
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get_json(&self, url: &str) -> Result<Value> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| Error::http_status(404, url))
    }

    fn resolve_url(&self, url: &str) -> Result<String> {
        if url.starts_with("http") {
            Ok(url.to_string())
        } else {
            Ok(format!("{BASE}{url}"))
        }
    }
}

fn page(ids: &[&str], next: Option<&str>) -> Value {
    let results: Vec<Value> = ids.iter().map(|id| json!({"object_id": id})).collect();
    json!({"next": next, "results": results})
}

fn engine(transport: ScriptedTransport) -> SyncEngine<Vec<u8>> {
    SyncEngine::new(transport, Emitter::new(Vec::new()), StateManager::in_memory())
}

fn output(engine: SyncEngine<Vec<u8>>) -> Vec<Value> {
    let bytes = engine.into_emitter().into_inner();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn records_for<'a>(messages: &'a [Value], stream: &str) -> Vec<&'a Value> {
    messages
        .iter()
        .filter(|m| m["type"] == "RECORD" && m["stream"] == stream)
        .collect()
}

// ============================================================================
// SyncConfig / SyncReport Tests
// ============================================================================

#[test]
fn test_sync_config_default() {
    let config = SyncConfig::default();
    assert!(!config.strict);
    assert_eq!(config.max_pages, crate::pagination::DEFAULT_MAX_PAGES);
    assert!(config.run_timeout.is_none());
}

#[test]
fn test_sync_config_builder() {
    let config = SyncConfig::new()
        .with_strict(true)
        .with_max_pages(5)
        .with_run_timeout(Some(Duration::from_secs(30)));

    assert!(config.strict);
    assert_eq!(config.max_pages, 5);
    assert_eq!(config.run_timeout, Some(Duration::from_secs(30)));
}

#[test]
fn test_report_exit_code() {
    let mut report = SyncReport::default();
    report.entities.push((
        EntityKind::Addresses,
        EntityOutcome::Succeeded {
            stats: SyncStats::new(),
        },
    ));
    assert_eq!(report.exit_code(), 0);

    report.entities.push((EntityKind::Parcels, EntityOutcome::Skipped));
    assert_eq!(report.exit_code(), 1);
    assert_eq!(report.incomplete().collect::<Vec<_>>(), vec![EntityKind::Parcels]);
    assert_eq!(report.outcome(EntityKind::Parcels).unwrap().label(), "SKIPPED");
    assert!(report.outcome(EntityKind::Refunds).is_none());
}

// ============================================================================
// Run Tests
// ============================================================================

#[tokio::test]
async fn test_full_run_message_order() {
    let mut engine = engine(ScriptedTransport::all_single());

    let report = engine.run().await.unwrap();
    assert_eq!(report.exit_code(), 0);
    assert_eq!(engine.state().state().len(), 5);

    let kinds: Vec<(String, String)> = output(engine)
        .iter()
        .map(|m| {
            (
                m["type"].as_str().unwrap().to_string(),
                m["stream"].as_str().unwrap_or("").to_string(),
            )
        })
        .collect();

    let mut expected = Vec::new();
    for d in &ENTITIES {
        expected.push(("SCHEMA".to_string(), d.name().to_string()));
        expected.push(("RECORD".to_string(), d.name().to_string()));
        expected.push(("STATE".to_string(), String::new()));
    }
    expected.push(("STATE".to_string(), String::new()));
    assert_eq!(kinds, expected);
}

#[tokio::test]
async fn test_multi_page_entity() {
    let transport = ScriptedTransport::all_single()
        .first_page("parcels", &["p1", "p2"], Some("https://api.test/parcels/?page=2"))
        .body("https://api.test/parcels/?page=2", page(&["p3"], None));
    let mut engine = engine(transport);

    let report = engine.run().await.unwrap();
    let stats = report.outcome(EntityKind::Parcels).unwrap().stats().unwrap();
    assert_eq!(stats.pages_fetched, 2);
    assert_eq!(stats.records_emitted, 3);

    let messages = output(engine);
    let ids: Vec<_> = records_for(&messages, "parcels")
        .iter()
        .map(|m| m["record"]["object_id"].clone())
        .collect();
    assert_eq!(ids, vec![json!("p1"), json!("p2"), json!("p3")]);
}

#[tokio::test]
async fn test_schema_violation_is_skipped_by_default() {
    let transport = ScriptedTransport::all_single().body(
        "https://api.test/refunds/?results=1000",
        json!({"next": null, "results": [{"object_id": "r1"}, {"transaction": "t"}, {"object_id": "r2"}]}),
    );
    let mut engine = engine(transport);

    let report = engine.run().await.unwrap();
    assert_eq!(report.exit_code(), 0);

    let stats = report.outcome(EntityKind::Refunds).unwrap().stats().unwrap();
    assert_eq!(stats.records_read, 3);
    assert_eq!(stats.records_emitted, 2);
    assert_eq!(stats.records_skipped, 1);
}

#[tokio::test]
async fn test_strict_violation_aborts_run() {
    let transport = ScriptedTransport::all_single().body(
        "https://api.test/parcels/?results=1000",
        json!({"next": null, "results": [{"object_id": "p1"}, {"test": "maybe", "object_id": "p2"}]}),
    );
    let mut engine = engine(transport).with_config(SyncConfig::new().with_strict(true));

    let report = engine.run().await.unwrap();
    assert_eq!(report.exit_code(), 1);

    let labels: Vec<_> = report
        .entities
        .iter()
        .map(|(kind, outcome)| (*kind, outcome.label()))
        .collect();
    assert_eq!(
        labels,
        vec![
            (EntityKind::Addresses, "SUCCEEDED"),
            (EntityKind::Parcels, "FAILED"),
            (EntityKind::Shipments, "SKIPPED"),
            (EntityKind::Transactions, "SKIPPED"),
            (EntityKind::Refunds, "SKIPPED"),
        ]
    );

    let state: Vec<_> = engine.state().state().keys().map(str::to_string).collect();
    assert_eq!(state, vec!["addresses"]);

    let messages = output(engine);
    assert_eq!(records_for(&messages, "parcels").len(), 1);
    let last = messages.last().unwrap();
    assert_eq!(last["type"], "STATE");
    assert_eq!(last["value"].as_object().unwrap().len(), 1);
}

#[tokio::test]
async fn test_entity_failure_is_isolated() {
    let transport = ScriptedTransport::all_single().body(
        "https://api.test/shipments/?results=1000",
        json!({"detail": "unexpected"}),
    );
    let mut engine = engine(transport);

    let report = engine.run().await.unwrap();
    assert_eq!(report.exit_code(), 1);

    match report.outcome(EntityKind::Shipments).unwrap() {
        EntityOutcome::Failed { error, .. } => assert!(matches!(error, Error::Protocol { .. })),
        other => panic!("Expected failure, got {other:?}"),
    }
    for kind in [
        EntityKind::Addresses,
        EntityKind::Parcels,
        EntityKind::Transactions,
        EntityKind::Refunds,
    ] {
        assert!(report.outcome(kind).unwrap().is_success(), "{kind}");
    }

    assert!(engine.state().state().bookmark(EntityKind::Shipments).is_none());
    let messages = output(engine);
    assert!(records_for(&messages, "shipments").is_empty());
    assert_eq!(records_for(&messages, "refunds").len(), 1);
}

#[tokio::test]
async fn test_prior_unknown_keys_are_kept() {
    let prior: State =
        serde_json::from_value(json!({"custom": 42, "addresses": "2000-01-01T00:00:00Z"})).unwrap();
    let mut engine = SyncEngine::new(
        ScriptedTransport::all_single(),
        Emitter::new(Vec::new()),
        StateManager::with_state(prior),
    );

    engine.run().await.unwrap();

    let state = engine.state().state();
    assert_eq!(state.get("custom"), Some(&json!(42)));
    assert_ne!(
        state.bookmark(EntityKind::Addresses),
        Some("2000-01-01T00:00:00Z")
    );
    assert_eq!(state.len(), 6);
}

#[tokio::test]
async fn test_shutdown_skips_remaining_entities() {
    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let mut engine = engine(ScriptedTransport::all_single()).with_shutdown(rx);
    let report = engine.run().await.unwrap();

    assert!(matches!(
        report.outcome(EntityKind::Addresses),
        Some(EntityOutcome::Failed {
            error: Error::Cancelled,
            ..
        })
    ));
    assert_eq!(
        report.outcome(EntityKind::Refunds).unwrap().label(),
        "SKIPPED"
    );

    let messages = output(engine);
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0], json!({"type": "STATE", "value": {}}));
}

#[tokio::test]
async fn test_run_timeout_fails_in_flight_entity() {
    let transport = ScriptedTransport {
        delay: Some(Duration::from_secs(5)),
        ..ScriptedTransport::all_single()
    };
    let mut engine = engine(transport).with_config(
        SyncConfig::new().with_run_timeout(Some(Duration::from_millis(50))),
    );

    let report = engine.run().await.unwrap();

    assert!(matches!(
        report.outcome(EntityKind::Addresses),
        Some(EntityOutcome::Failed {
            error: Error::Timeout { timeout_ms: 50 },
            ..
        })
    ));
    assert_eq!(report.incomplete().count(), 5);
    assert!(engine.state().state().is_empty());
}

#[tokio::test]
async fn test_unsaved_checkpoint_never_reaches_the_stream() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("missing").join("state.json");
    let state = StateManager::load(&path).await.unwrap();
    let mut engine = SyncEngine::new(
        ScriptedTransport::all_single(),
        Emitter::new(Vec::new()),
        state,
    );

    let err = engine.run().await.unwrap_err();
    assert!(matches!(err, Error::State { .. }), "{err}");
    assert!(engine.state().state().is_empty());

    let messages = output(engine);
    let records = messages.iter().filter(|m| m["type"] == "RECORD").count();
    assert_eq!(records, 5);
    let states: Vec<_> = messages.iter().filter(|m| m["type"] == "STATE").collect();
    assert_eq!(states, vec![&json!({"type": "STATE", "value": {}})]);
}
