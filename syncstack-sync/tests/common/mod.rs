//! Shared test helpers for sync tests.

#![allow(dead_code)]

use serde_json::Value;
use std::sync::{Arc, Mutex};
use syncstack_model::{
    DefaultCollection, EventBus, Notification, NotificationKind, Record, RecordHooks,
    RecordSchema, RecordSet, Services,
};
use syncstack_storage::MemoryStore;
use syncstack_sync::mock::MockTransport;
use syncstack_sync::{SyncClient, SyncConfig};
use syncstack_types::{ListenerId, Method, PropertyMap, Request};

/// Installs a test log writer once; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn services() -> (Services, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Services::new(Arc::new(EventBus::new()), store.clone()), store)
}

pub fn client() -> (SyncClient, Arc<MockTransport>) {
    client_with(SyncConfig::default())
}

pub fn client_with(config: SyncConfig) -> (SyncClient, Arc<MockTransport>) {
    init_tracing();
    let transport = Arc::new(MockTransport::new());
    (SyncClient::new(transport.clone(), config), transport)
}

/// A `User` record type served at `http://api.test/users`.
pub fn user_schema() -> Arc<RecordSchema> {
    Arc::new(
        RecordSchema::new("User", "http://api.test", "users")
            .field("id", "remote_id")
            .field("email", "email"),
    )
}

pub fn props(value: Value) -> PropertyMap {
    value.as_object().cloned().expect("object literal")
}

pub fn user(services: &Services, value: Value) -> Record {
    Record::with_properties(user_schema(), services, props(value))
}

pub fn users(services: &Services) -> RecordSet {
    RecordSet::new(user_schema(), Arc::new(DefaultCollection), services)
}

/// User type that refuses to save without an email and tags requests.
pub struct StrictUser;

impl RecordHooks for StrictUser {
    fn type_name(&self) -> &str {
        "User"
    }

    fn defaults(&self) -> PropertyMap {
        props(serde_json::json!({"url": "http://api.test", "name": "users"}))
    }

    fn validate(&self, properties: &PropertyMap, method: Option<Method>) -> Result<(), String> {
        let has_email = properties
            .get("email")
            .and_then(Value::as_str)
            .is_some_and(|e| !e.is_empty());
        match method {
            Some(Method::Post | Method::Put) if !has_email => Err("email is required".into()),
            _ => Ok(()),
        }
    }

    fn authenticate(&self, request: &mut Request) {
        request.set_header("Authorization", "Bearer test-token");
    }
}

/// Collects every notification of one kind from the bus.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl Recorder {
    pub fn any(bus: &EventBus, kind: NotificationKind) -> Self {
        let recorder = Self::default();
        let seen = recorder.seen.clone();
        bus.subscribe(ListenerId::new(), None, kind, move |n| {
            seen.lock().unwrap().push(n.clone());
        });
        recorder
    }

    pub fn count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().unwrap().last().cloned()
    }
}
