use pretty_assertions::assert_eq;
use syncstack_sync::{SyncConfig, SyncError};
use syncstack_types::Encoding;

#[test]
fn defaults() {
    let config = SyncConfig::default();
    assert_eq!(config.default_encoding, Encoding::Json);
    assert!(config.headers.is_empty());
    assert_eq!(config.timeout_ms, None);
}

#[test]
fn partial_json_fills_defaults() {
    let config = SyncConfig::from_json(r#"{"default_encoding": "url", "timeout_ms": 5000}"#).unwrap();
    assert_eq!(config.default_encoding, Encoding::Url);
    assert_eq!(config.timeout_ms, Some(5000));
    assert_eq!(config.user_agent, SyncConfig::default().user_agent);
}

#[test]
fn serde_roundtrip() {
    let config = SyncConfig::default().with_header("X-Api-Key", "secret");
    let json = config.to_json().unwrap();
    assert_eq!(SyncConfig::from_json(&json).unwrap(), config);
}

#[test]
fn rejects_bad_values() {
    assert!(matches!(
        SyncConfig::from_json(r#"{"user_agent": " "}"#),
        Err(SyncError::Config(_))
    ));
    assert!(matches!(
        SyncConfig::from_json(r#"{"headers": {"a:b": "x"}}"#),
        Err(SyncError::Config(_))
    ));
    assert!(matches!(SyncConfig::from_json("not json"), Err(SyncError::Serialization(_))));
}
