use pretty_assertions::assert_eq;
use serde_json::json;
use syncstack_storage::{MemoryStore, PersistentStore, StorageError, StoreHandle};

// ── Staging ──────────────────────────────────────────────────────

#[test]
fn created_row_is_invisible_until_commit() {
    let store = MemoryStore::new();
    let h = store.create_record("User");
    store.set_field(h, "name", json!("ada"));
    assert!(!store.contains(h));
    assert_eq!(store.pending(), 2);

    store.commit().unwrap();
    assert!(store.contains(h));
    assert_eq!(store.pending(), 0);
    assert_eq!(store.field(h, "name").unwrap(), json!("ada"));
    assert_eq!(store.row(h).unwrap().type_name, "User");
}

#[test]
fn handles_are_distinct() {
    let store = MemoryStore::new();
    let a = store.create_record("User");
    let b = store.create_record("User");
    assert_ne!(a, b);
}

#[test]
fn later_writes_win() {
    let store = MemoryStore::new();
    let h = store.create_record("User");
    store.set_field(h, "name", json!("a"));
    store.set_field(h, "name", json!("b"));
    store.commit().unwrap();
    assert_eq!(store.field(h, "name").unwrap(), json!("b"));
}

// ── Delete ───────────────────────────────────────────────────────

#[test]
fn delete_removes_row_on_commit() {
    let store = MemoryStore::new();
    let h = store.create_record("User");
    store.commit().unwrap();

    store.delete(h);
    assert!(store.contains(h));
    store.commit().unwrap();
    assert!(!store.contains(h));
    assert!(store.is_empty());
}

#[test]
fn write_after_delete_is_dropped() {
    let store = MemoryStore::new();
    let h = store.create_record("User");
    store.delete(h);
    store.set_field(h, "name", json!("ghost"));
    store.commit().unwrap();
    assert!(!store.contains(h));
}

// ── Atomicity ────────────────────────────────────────────────────

#[test]
fn failed_commit_applies_nothing_and_keeps_batch() {
    let store = MemoryStore::new();
    let h = store.create_record("User");
    store.set_field(h, "name", json!("ada"));
    store.fail_next_commit("disk full");

    let err = store.commit().unwrap_err();
    assert!(matches!(err, StorageError::CommitFailed(ref r) if r == "disk full"));
    assert!(!store.contains(h));
    assert_eq!(store.pending(), 2);
    assert_eq!(store.commit_count(), 0);

    store.commit().unwrap();
    assert_eq!(store.field(h, "name").unwrap(), json!("ada"));
    assert_eq!(store.commit_count(), 1);
}

// ── Queries ──────────────────────────────────────────────────────

#[test]
fn rows_of_filters_by_type() {
    let store = MemoryStore::new();
    let u = store.create_record("User");
    let _p = store.create_record("Post");
    store.commit().unwrap();

    let users = store.rows_of("User");
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].0, u);
    assert_eq!(store.len(), 2);
}

#[test]
fn missing_field_is_not_found() {
    let store = MemoryStore::new();
    let h = store.create_record("User");
    store.commit().unwrap();
    assert!(matches!(store.field(h, "nope"), Err(StorageError::NotFound(_))));
    assert!(matches!(
        store.field(StoreHandle::from_raw(99), "id"),
        Err(StorageError::NotFound(_))
    ));
}

#[test]
fn json_export() {
    let store = MemoryStore::new();
    let h = store.create_record("User");
    store.set_field(h, "remote_id", json!("7"));
    store.commit().unwrap();
    let exported: serde_json::Value = serde_json::from_str(&store.to_json().unwrap()).unwrap();
    let key = h.as_raw().to_string();
    assert_eq!(
        exported[key.as_str()],
        json!({ "type_name": "User", "fields": { "remote_id": "7" } })
    );
}
