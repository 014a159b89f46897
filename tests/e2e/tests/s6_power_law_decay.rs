//! Power-law decay is a function of elapsed wall-clock hours, not of
//! how many times the pass has been run.

use chrono::{Duration, Utc};
use synapse_core::config::DecayConfig;
use synapse_core::memory::{MemoryType, NodeKind};
use synapse_core::storage::{NewMemory, Storage};
use synapse_core::consolidation;

fn temp_storage() -> (Storage, tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("test.db");
    let storage = Storage::new(Some(path.clone())).expect("storage");
    (storage, dir, path)
}

fn insert_with_activation(storage: &Storage, activation: f32) -> String {
    let id = storage
        .insert_memory(NewMemory {
            content: "deployed the canary".to_string(),
            summary: None,
            trigger_situation: "t".to_string(),
            resolution: None,
            memory_type: MemoryType::Episodic,
            source_agent: "agent".to_string(),
            keywords: vec![],
            salience_score: 0.5,
            context: Default::default(),
            embedding: None,
        })
        .unwrap();
    storage.set_activation(&id, NodeKind::Memory, activation).unwrap();
    id
}

fn backdate_last_activated(db_path: &std::path::Path, id: &str, hours_ago: i64) {
    let conn = rusqlite::Connection::open(db_path).expect("open raw connection");
    let when = Utc::now() - Duration::hours(hours_ago);
    conn.execute(
        "UPDATE memories SET last_activated = ?1 WHERE id = ?2",
        rusqlite::params![when, id],
    )
    .expect("backdate last_activated");
}

fn fetch_activation(storage: &Storage, id: &str) -> f32 {
    storage.fetch_by_id(id).unwrap().current_activation
}

#[test]
fn four_hours_elapsed_decays_to_the_documented_value() {
    let (storage, _dir, db_path) = temp_storage();
    let id = insert_with_activation(&storage, 0.8);
    backdate_last_activated(&db_path, &id, 4);

    let config = DecayConfig {
        exponent: 0.5,
        min_hours: 1.0,
        ..DecayConfig::default()
    };
    consolidation::run_decay(&storage, &config).unwrap();

    // 0.8 * 4^(-0.5) = 0.4
    let activation = fetch_activation(&storage, &id);
    assert!((activation - 0.4).abs() < 1e-3, "got {activation}");
}

#[test]
fn one_week_elapsed_decays_further_in_a_single_pass() {
    let (storage, _dir, db_path) = temp_storage();
    let id = insert_with_activation(&storage, 0.8);
    backdate_last_activated(&db_path, &id, 168);

    let config = DecayConfig {
        exponent: 0.5,
        min_hours: 1.0,
        ..DecayConfig::default()
    };
    consolidation::run_decay(&storage, &config).unwrap();

    // 0.8 * 168^(-0.5) ~= 0.0617
    let activation = fetch_activation(&storage, &id);
    assert!((activation - 0.0617).abs() < 1e-3, "got {activation}");
}

#[test]
fn zero_exponent_is_the_identity() {
    let (storage, _dir, db_path) = temp_storage();
    let id = insert_with_activation(&storage, 0.8);
    backdate_last_activated(&db_path, &id, 168);

    let config = DecayConfig {
        exponent: 0.0,
        min_hours: 1.0,
        ..DecayConfig::default()
    };
    consolidation::run_decay(&storage, &config).unwrap();

    let activation = fetch_activation(&storage, &id);
    assert!((activation - 0.8).abs() < 1e-4, "exponent 0 should not change activation, got {activation}");
}

#[test]
fn running_decay_twice_with_no_further_elapsed_time_is_idempotent() {
    let (storage, _dir, db_path) = temp_storage();
    let id = insert_with_activation(&storage, 0.8);
    backdate_last_activated(&db_path, &id, 4);

    let config = DecayConfig::default();
    consolidation::run_decay(&storage, &config).unwrap();
    let once = fetch_activation(&storage, &id);

    // `last_activated` now reflects the decay pass itself (current time),
    // so immediately re-running with no further elapsed time is a no-op:
    // elapsed hours are below `min_hours` and the node is skipped.
    consolidation::run_decay(&storage, &config).unwrap();
    let twice = fetch_activation(&storage, &id);

    assert_eq!(once, twice);
}
