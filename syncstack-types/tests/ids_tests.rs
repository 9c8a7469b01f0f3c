use syncstack_types::{ClientId, ListenerId, SourceId};
use std::collections::HashSet;
use std::str::FromStr;

// ── SourceId ──────────────────────────────────────────────────────

#[test]
fn source_id_new_is_unique() {
    let a = SourceId::new();
    let b = SourceId::new();
    assert_ne!(a, b);
}

#[test]
fn source_id_from_uuid_roundtrip() {
    let uuid = uuid::Uuid::now_v7();
    let id = SourceId::from_uuid(uuid);
    assert_eq!(id.as_uuid(), uuid);
}

#[test]
fn source_id_display_and_parse() {
    let id = SourceId::new();
    let parsed = SourceId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn source_id_parse_invalid() {
    assert!(SourceId::parse("not-a-uuid").is_err());
    assert!(SourceId::from_str("garbage").is_err());
}

#[test]
fn source_id_hash_and_eq() {
    let id = SourceId::new();
    let mut set = HashSet::new();
    set.insert(id);
    set.insert(id);
    assert_eq!(set.len(), 1);
}

// ── ListenerId / ClientId ─────────────────────────────────────────

#[test]
fn listener_id_default_is_unique() {
    assert_ne!(ListenerId::default(), ListenerId::default());
}

#[test]
fn client_id_serde_is_transparent() {
    let id = ClientId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let parsed: ClientId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn client_ids_are_time_ordered() {
    let a = ClientId::new();
    let b = ClientId::new();
    assert!(a <= b);
}
