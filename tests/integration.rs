//! Integration tests for the field store.

use fieldstore::{Operation, Output, Store, StoreConfig, Timestamp};
use std::sync::Arc;
use std::thread;

fn test_store() -> Store {
    Store::new(StoreConfig::default())
}

fn run(store: &Store, records: &[&[&str]]) -> Vec<String> {
    store.run_records(records).unwrap()
}

// --- Realistic Workflow Tests ---

#[test]
fn test_session_cache_workflow() {
    let store = test_store();

    // Log a user in with a 30 tick session token and a persistent profile
    let out = run(
        &store,
        &[
            &["SET", "100", "user:1", "name", "ada"],
            &["SET_TTL", "100", "user:1", "token", "abc123", "30"],
            &["FIELDS", "110", "user:1"],
            &["GET", "129", "user:1", "token"],
            &["GET", "130", "user:1", "token"],
            &["FIELDS", "130", "user:1"],
        ],
    );

    assert_eq!(
        out,
        vec!["name=ada,token=abc123", "abc123", "", "name=ada"]
    );
}

#[test]
fn test_refreshing_ttl_extends_lifetime() {
    let store = test_store();

    let out = run(
        &store,
        &[
            &["SET_TTL", "0", "s", "lock", "owner1", "10"],
            &["SET_TTL", "8", "s", "lock", "owner1", "10"],
            &["GET", "12", "s", "lock"],
            &["GET", "17", "s", "lock"],
            &["GET", "18", "s", "lock"],
        ],
    );

    assert_eq!(out, vec!["owner1", "owner1", ""]);
}

#[test]
fn test_set_clears_ttl() {
    let store = test_store();

    let out = run(
        &store,
        &[
            &["SET_TTL", "0", "k", "f", "v", "5"],
            &["SET", "1", "k", "f", "v2"],
            &["GET", "1000", "k", "f"],
        ],
    );

    assert_eq!(out, vec!["v2"]);
}

#[test]
fn test_delete_twice() {
    let store = test_store();

    let out = run(
        &store,
        &[
            &["SET", "1", "k", "f", "v"],
            &["DELETE", "2", "k", "f"],
            &["DELETE", "3", "k", "f"],
            &["GET", "3", "k", "f"],
        ],
    );

    assert_eq!(out, vec!["true", "false", ""]);
}

#[test]
fn test_set_after_expiry_revives_field() {
    let store = test_store();

    let out = run(
        &store,
        &[
            &["SET_TTL", "0", "k", "f", "old", "2"],
            &["GET", "3", "k", "f"],
            &["SET", "4", "k", "f", "new"],
            &["FIELDS", "4", "k"],
        ],
    );

    assert_eq!(out, vec!["", "f=new"]);
}

#[test]
fn test_fields_sorted_lexicographically() {
    let store = test_store();

    let out = run(
        &store,
        &[
            &["SET", "1", "k", "b", "2"],
            &["SET", "1", "k", "B", "upper"],
            &["SET", "1", "k", "a", "1"],
            &["SET", "1", "k", "aa", "3"],
            &["FIELDS", "1", "k"],
        ],
    );

    assert_eq!(out, vec!["B=upper,a=1,aa=3,b=2"]);
}

#[test]
fn test_outputs_in_arrival_order() {
    let store = test_store();

    let outputs: Vec<Option<Output>> = vec![
        Operation::Get {
            at: Timestamp(1),
            key: "k".into(),
            field: "f".into(),
        },
        Operation::Set {
            at: Timestamp(2),
            key: "k".into(),
            field: "f".into(),
            value: "v".into(),
        },
        Operation::Backup { at: Timestamp(3) },
        Operation::Delete {
            at: Timestamp(4),
            key: "k".into(),
            field: "f".into(),
        },
    ]
    .into_iter()
    .map(|op| store.apply(op))
    .collect();

    assert_eq!(
        outputs,
        vec![
            Some(Output::Value(String::new())),
            None,
            Some(Output::BackupCount(1)),
            Some(Output::Deleted(true)),
        ]
    );
}

// --- Concurrency ---

#[test]
fn test_shared_store_serializes_writers() {
    let store = Arc::new(test_store());
    let mut handles = Vec::new();

    for worker in 0..4 {
        let store = Arc::clone(&store);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                let key = format!("worker:{worker}");
                let field = format!("f{i}");
                store
                    .apply_record(&["SET", "1", key.as_str(), field.as_str(), "v"])
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let out = store.run_records(&[&["BACKUP", "2"][..]]).unwrap();
    assert_eq!(out, vec!["200"]);
}

// --- Volume ---

#[test]
fn test_many_keys_expire_together() {
    let store = test_store();

    for i in 0..1_000 {
        let ttl = if i % 2 == 0 { "10" } else { "20" };
        let key = format!("k{i}");
        store
            .apply_record(&["SET_TTL", "0", key.as_str(), "f", "v", ttl])
            .unwrap();
    }

    let out = run(
        &store,
        &[&["BACKUP", "9"], &["BACKUP", "10"], &["BACKUP", "20"]],
    );
    assert_eq!(out, vec!["1000", "500", "0"]);

    let stats = store.stats();
    assert_eq!(stats.stored_entries, 1_000);
    assert_eq!(stats.alive_entries, 0);
    assert_eq!(stats.snapshot_count, 3);
}

#[test]
fn test_many_keys_pruned_when_enabled() {
    let store = Store::new(StoreConfig {
        prune_on_backup: true,
        ..Default::default()
    });

    for i in 0..1_000 {
        let key = format!("k{i}");
        store
            .apply_record(&["SET_TTL", "0", key.as_str(), "f", "v", "10"])
            .unwrap();
    }

    assert_eq!(run(&store, &[&["BACKUP", "10"]]), vec!["0"]);
    let stats = store.stats();
    assert_eq!(stats.stored_entries, 0);
    assert_eq!(stats.key_count, 0);
}
