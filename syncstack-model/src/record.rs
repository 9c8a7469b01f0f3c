//! A single synchronized record.
//!
//! A [`Record`] is a cheap, clonable handle; clones share one underlying
//! object and compare equal only to each other. Properties are a flat
//! [`PropertyMap`] that always holds `id`, `name`, `url` and `clientId`.
//! Dirty tracking compares the live properties against the snapshot taken at
//! the last successful sync ([`Record::prior_properties`]).
//!
//! Locks are never held while notifications are published, so callbacks may
//! freely read or mutate the record that fired them.

use crate::{diff, FieldMap, NotificationKind, Payload, RecordHooks, Services, SetOptions};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use syncstack_storage::{PersistentStore, StorageResult, StoreHandle};
use syncstack_types::{value_to_string, ClientId, ListenerId, Method, PropertyMap, SourceId, Value};
use tracing::debug;

/// Server identity property.
pub const ID: &str = "id";
/// Remote resource name property.
pub const NAME: &str = "name";
/// Remote base URL property.
pub const URL: &str = "url";
/// Local identity property.
pub const CLIENT_ID: &str = "clientId";

/// Keys that are blanked instead of removed when unset.
pub const PRESERVED_KEYS: [&str; 3] = [ID, NAME, URL];

fn is_preserved(key: &str) -> bool {
    PRESERVED_KEYS.contains(&key)
}

#[derive(Default)]
struct RecordState {
    properties: PropertyMap,
    prior: PropertyMap,
    fields: FieldMap,
    validation_error: Option<String>,
    collection: Option<SourceId>,
}

struct RecordInner {
    source: SourceId,
    client_id: String,
    hooks: Arc<dyn RecordHooks>,
    services: Services,
    handle: StoreHandle,
    state: RwLock<RecordState>,
}

impl Drop for RecordInner {
    fn drop(&mut self) {
        self.services.bus().unsubscribe_source(self.source);
    }
}

/// Handle to one record.
#[derive(Clone)]
pub struct Record {
    inner: Arc<RecordInner>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("type", &self.inner.hooks.type_name())
            .field("source", &self.inner.source)
            .field("properties", &self.inner.state.read().properties)
            .finish()
    }
}

impl Record {
    /// Constructs a record: allocates its store row, applies defaults, then
    /// runs the `extend` and `map_fields` hooks.
    pub fn new(hooks: Arc<dyn RecordHooks>, services: &Services) -> Self {
        let handle = services.store().create_record(hooks.type_name());
        let record = Self {
            inner: Arc::new(RecordInner {
                source: SourceId::new(),
                client_id: ClientId::new().to_string(),
                hooks,
                services: services.clone(),
                handle,
                state: RwLock::new(RecordState::default()),
            }),
        };
        record.inner.state.write().properties = record.default_properties();

        record.inner.hooks.extend(&record);
        let fields = record.inner.hooks.map_fields();
        record.inner.state.write().fields = fields;
        debug!(
            "constructed {} record {} ({})",
            record.inner.hooks.type_name(),
            record.inner.client_id,
            handle
        );
        record
    }

    /// Constructs a record and silently applies `properties` over its
    /// defaults.
    pub fn with_properties(hooks: Arc<dyn RecordHooks>, services: &Services, properties: PropertyMap) -> Self {
        let record = Self::new(hooks, services);
        record.set_many(properties, SetOptions::silent());
        record
    }

    fn default_properties(&self) -> PropertyMap {
        let mut properties = PropertyMap::new();
        for key in PRESERVED_KEYS {
            properties.insert(key.into(), Value::String(String::new()));
        }
        properties.extend(self.inner.hooks.defaults());
        properties.insert(CLIENT_ID.into(), Value::String(self.inner.client_id.clone()));
        properties
    }

    // ── Accessors ────────────────────────────────────────────────

    /// Returns a property value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.state.read().properties.get(key).cloned()
    }

    /// Whether a property is present.
    pub fn has(&self, key: &str) -> bool {
        self.inner.state.read().properties.contains_key(key)
    }

    /// Returns a copy of every property.
    pub fn properties(&self) -> PropertyMap {
        self.inner.state.read().properties.clone()
    }

    /// Returns the snapshot taken at the last successful sync.
    pub fn prior_properties(&self) -> PropertyMap {
        self.inner.state.read().prior.clone()
    }

    /// The value a property had at the last successful sync.
    pub fn previous(&self, key: &str) -> Option<Value> {
        self.inner.state.read().prior.get(key).cloned()
    }

    /// Server identity, empty when not yet persisted remotely.
    pub fn id(&self) -> String {
        self.get(ID).map(|v| value_to_string(&v)).unwrap_or_default()
    }

    /// Local identity, stable for the object's lifetime.
    pub fn client_id(&self) -> &str {
        &self.inner.client_id
    }

    /// Remote base URL.
    pub fn url(&self) -> String {
        self.get(URL).map(|v| value_to_string(&v)).unwrap_or_default()
    }

    /// Remote resource name.
    pub fn name(&self) -> String {
        self.get(NAME).map(|v| value_to_string(&v)).unwrap_or_default()
    }

    /// Event bus source identity of this record.
    pub fn source(&self) -> SourceId {
        self.inner.source
    }

    /// The record's capability hooks.
    pub fn hooks(&self) -> &Arc<dyn RecordHooks> {
        &self.inner.hooks
    }

    /// The services the record was constructed with.
    pub fn services(&self) -> &Services {
        &self.inner.services
    }

    /// The record's row in the persistent store.
    pub fn store_handle(&self) -> StoreHandle {
        self.inner.handle
    }

    /// Property → store field mapping captured at construction.
    pub fn field_map(&self) -> FieldMap {
        self.inner.state.read().fields.clone()
    }

    /// The record set currently holding this record, if any.
    pub fn collection(&self) -> Option<SourceId> {
        self.inner.state.read().collection
    }

    pub(crate) fn attach(&self, set: SourceId) {
        self.inner.state.write().collection = Some(set);
    }

    pub(crate) fn detach(&self, set: SourceId) {
        let mut state = self.inner.state.write();
        if state.collection == Some(set) {
            state.collection = None;
        }
    }

    // ── Mutation ─────────────────────────────────────────────────

    /// Writes one property and returns what was stored, or `None` when the
    /// key is read-only.
    fn apply(&self, properties: &mut PropertyMap, key: &str, value: Value) -> Option<Value> {
        if key == CLIENT_ID {
            debug!("ignoring write of {CLIENT_ID} on {}", self.inner.client_id);
            return None;
        }
        if !value.is_null() {
            properties.insert(key.to_string(), value.clone());
            Some(value)
        } else if is_preserved(key) {
            let blank = Value::String(String::new());
            properties.insert(key.to_string(), blank.clone());
            Some(blank)
        } else {
            properties.remove(key);
            Some(Value::Null)
        }
    }

    /// Sets one property. A null value unsets it: preserved keys become the
    /// empty string, every other key is removed. `clientId` is read-only and
    /// writes to it are ignored.
    ///
    /// Publishes Change unless silent, even when the value is unchanged.
    pub fn set(&self, key: &str, value: impl Into<Value>, options: SetOptions) {
        let written = {
            let mut state = self.inner.state.write();
            self.apply(&mut state.properties, key, value.into())
        };
        let Some(written) = written else {
            return;
        };
        if !options.silent {
            let mut changes = PropertyMap::new();
            changes.insert(key.to_string(), written);
            self.publish(NotificationKind::Change, Payload::Changes(changes));
        }
    }

    /// Sets every entry of `properties`, then publishes a single Change
    /// unless silent.
    pub fn set_many(&self, properties: PropertyMap, options: SetOptions) {
        let requested = properties.len();
        let written: PropertyMap = {
            let mut state = self.inner.state.write();
            properties
                .into_iter()
                .filter_map(|(key, value)| {
                    let written = self.apply(&mut state.properties, &key, value)?;
                    Some((key, written))
                })
                .collect()
        };
        // Nothing to announce when every key was read-only.
        if !options.silent && (requested == 0 || !written.is_empty()) {
            self.publish(NotificationKind::Change, Payload::Changes(written));
        }
    }

    /// Equivalent to setting the key to null.
    pub fn unset(&self, key: &str, options: SetOptions) {
        self.set(key, Value::Null, options);
    }

    /// Drops every property and reapplies defaults. The client id survives.
    pub fn clear(&self, options: SetOptions) {
        let defaults = self.default_properties();
        self.inner.state.write().properties = defaults.clone();
        if !options.silent {
            self.publish(NotificationKind::Change, Payload::Changes(defaults));
        }
    }

    /// Merges parsed response properties, writing only what differs from the
    /// current values. Returns whether anything was written.
    ///
    /// Null entries follow unset semantics; a null for a key the record does
    /// not have is not a difference.
    pub fn merge_parsed(&self, parsed: PropertyMap, options: SetOptions) -> bool {
        let delta = {
            let state = self.inner.state.read();
            let effective: PropertyMap = parsed
                .into_iter()
                .filter(|(key, _)| key != CLIENT_ID)
                .filter_map(|(key, value)| match value {
                    Value::Null if is_preserved(&key) => Some((key, Value::String(String::new()))),
                    Value::Null if !state.properties.contains_key(&key) => None,
                    value => Some((key, value)),
                })
                .collect();
            diff(&effective, &state.properties)
        };
        if delta.is_empty() {
            return false;
        }
        debug!("merging {} changed properties into {}", delta.len(), self.inner.client_id);
        self.set_many(delta, options);
        true
    }

    // ── Serialization ────────────────────────────────────────────

    /// Percent-encodes the string form of a property.
    pub fn escape(&self, key: &str) -> Option<String> {
        self.get(key)
            .map(|value| urlencoding::encode(&value_to_string(&value)).into_owned())
    }

    /// Serializes every property, or only the named ones.
    pub fn to_json(&self, keys: Option<&[&str]>) -> String {
        Value::Object(self.subset(keys)).to_string()
    }

    /// Copies every property, or only the named ones that are present.
    pub fn subset(&self, keys: Option<&[&str]>) -> PropertyMap {
        let state = self.inner.state.read();
        match keys {
            None => state.properties.clone(),
            Some(keys) => keys
                .iter()
                .filter_map(|k| state.properties.get(*k).map(|v| (k.to_string(), v.clone())))
                .collect(),
        }
    }

    // ── State ────────────────────────────────────────────────────

    /// Whether the record lacks a server identity: `id` is absent, null or
    /// the empty string. Whitespace is an identity like any other.
    pub fn is_new(&self) -> bool {
        match self.inner.state.read().properties.get(ID) {
            None | Some(Value::Null) => true,
            Some(Value::String(id)) => id.is_empty(),
            Some(_) => false,
        }
    }

    /// Properties that differ from the last synced snapshot.
    pub fn changed_properties(&self) -> PropertyMap {
        let state = self.inner.state.read();
        diff(&state.properties, &state.prior)
    }

    /// Names of the properties that differ from the last synced snapshot.
    pub fn changed_keys(&self) -> Vec<String> {
        self.changed_properties().into_iter().map(|(k, _)| k).collect()
    }

    /// Whether anything differs from the last synced snapshot.
    pub fn has_changed(&self) -> bool {
        let state = self.inner.state.read();
        state
            .properties
            .iter()
            .any(|(k, v)| state.prior.get(k) != Some(v))
    }

    /// Runs the validate hook and records its error.
    pub fn is_valid(&self, method: Option<Method>) -> bool {
        let properties = self.properties();
        let result = self.inner.hooks.validate(&properties, method);
        let valid = result.is_ok();
        self.inner.state.write().validation_error = result.err();
        valid
    }

    /// The error recorded by the last validation.
    pub fn validation_error(&self) -> Option<String> {
        self.inner.state.read().validation_error.clone()
    }

    // ── Sync seams ───────────────────────────────────────────────

    /// Snapshots the current properties as the synced baseline.
    pub fn mark_synced(&self) {
        let mut state = self.inner.state.write();
        state.prior = state.properties.clone();
    }

    /// Stages every mapped property into the store row without committing.
    pub fn stage_fields(&self) {
        let store = self.inner.services.store();
        let state = self.inner.state.read();
        for (property, field) in state.fields.iter() {
            let value = state.properties.get(property).cloned().unwrap_or(Value::Null);
            store.set_field(self.inner.handle, field, value);
        }
    }

    /// Writes mapped properties to the store and commits.
    pub fn persist(&self) -> StorageResult<()> {
        self.stage_fields();
        self.inner.services.store().commit()
    }

    /// Deletes the store row and commits.
    pub fn remove_from_store(&self) -> StorageResult<()> {
        let store = self.inner.services.store();
        store.delete(self.inner.handle);
        store.commit()
    }

    /// Publishes a notification with this record as source.
    pub fn publish(&self, kind: NotificationKind, payload: Payload) -> usize {
        self.inner.services.bus().publish(self.inner.source, kind, payload)
    }

    /// Subscribes `listener` to `kind` notifications from this record.
    pub fn on<F>(&self, listener: ListenerId, kind: NotificationKind, callback: F) -> bool
    where
        F: Fn(&crate::Notification) + Send + Sync + 'static,
    {
        self.inner
            .services
            .bus()
            .subscribe(listener, Some(self.inner.source), kind, callback)
    }
}
