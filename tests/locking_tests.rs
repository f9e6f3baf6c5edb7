mod common;

use common::meeting;
use eventbook::{EventStore, LockMode, StoreError};
use tempfile::tempdir;

#[test]
fn test_second_store_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.csv");
    let _store = EventStore::open(&path).unwrap();

    let result = EventStore::open(&path);
    assert!(
        matches!(result, Err(StoreError::Locked { .. })),
        "second store should fail to open"
    );
}

#[test]
fn test_lock_error_mentions_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.csv");
    let _store = EventStore::open(&path).unwrap();

    let msg = EventStore::open(&path).unwrap_err().to_string();
    assert!(
        msg.contains("another writer holds the lock"),
        "error should mention the lock: {msg}"
    );
    assert!(msg.contains("events.csv"), "error should mention the file: {msg}");
}

#[test]
fn test_lock_released_on_drop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.csv");

    {
        let mut store = EventStore::open(&path).unwrap();
        store.insert(meeting()).unwrap();
        // store dropped here
    }

    let store = EventStore::open(&path).unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn test_lock_mode_none_allows_multiple() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.csv");
    let _a = EventStore::builder(&path)
        .lock_mode(LockMode::None)
        .open()
        .unwrap();
    let _b = EventStore::builder(&path)
        .lock_mode(LockMode::None)
        .open()
        .unwrap();
}

#[test]
fn test_unlocked_store_ignores_held_lock() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.csv");
    let _locked = EventStore::open(&path).unwrap();

    let unlocked = EventStore::builder(&path).lock_mode(LockMode::None).open();
    assert!(unlocked.is_ok());
}

#[test]
fn test_lock_survives_writes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("events.csv");
    let mut store = EventStore::open(&path).unwrap();

    // Each write renames a fresh file over the data file; the lock lives on
    // the sidecar and must not be affected.
    for _ in 0..3 {
        store.insert(meeting()).unwrap();
    }
    store.remove_at(0).unwrap();

    assert!(matches!(
        EventStore::open(&path),
        Err(StoreError::Locked { .. })
    ));
}

#[test]
fn test_different_files_lock_independently() {
    let dir = tempdir().unwrap();
    let _a = EventStore::open(dir.path().join("a.csv")).unwrap();
    let _b = EventStore::open(dir.path().join("b.csv")).unwrap();
}
