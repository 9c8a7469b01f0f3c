//! Shared test helpers for model tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use syncstack_model::{
    DefaultCollection, EventBus, Notification, NotificationKind, Record, RecordSchema, RecordSet,
    Services,
};
use syncstack_storage::MemoryStore;
use syncstack_types::{ListenerId, PropertyMap};

/// Services over a fresh bus and an inspectable in-memory store.
pub fn services() -> (Services, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (Services::new(Arc::new(EventBus::new()), store.clone()), store)
}

/// A `User` record type served at `http://api.test/users`.
pub fn user_schema() -> Arc<RecordSchema> {
    Arc::new(
        RecordSchema::new("User", "http://api.test", "users")
            .field("id", "remote_id")
            .field("email", "email"),
    )
}

pub fn props(value: serde_json::Value) -> PropertyMap {
    value.as_object().cloned().expect("object literal")
}

pub fn user(services: &Services, value: serde_json::Value) -> Record {
    Record::with_properties(user_schema(), services, props(value))
}

pub fn users(services: &Services) -> RecordSet {
    RecordSet::new(user_schema(), Arc::new(DefaultCollection), services)
}

/// Collects every notification of one kind from the bus.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl Recorder {
    /// Listens for `kind` from any source.
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

    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Notification> {
        self.seen.lock().unwrap().last().cloned()
    }
}
