//! Ordered, identity-unique collections of records.
//!
//! Membership is by record identity (handle equality), never by value. Every
//! bulk mutation publishes at most one notification for the whole batch, and
//! nothing when the batch changed nothing.
//!
//! The set lock is released before any record is touched or any notification
//! is published.

use crate::{
    CollectionHooks, Notification, NotificationKind, Payload, Record, RecordHooks, Services,
    SetOptions, NAME, URL,
};
use parking_lot::RwLock;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use syncstack_types::{value_to_string, ListenerId, PropertyMap, SourceId, Value};

/// Ordering function used by [`RecordSet::sort`].
pub type Comparator = Arc<dyn Fn(&Record, &Record) -> Ordering + Send + Sync>;

#[derive(Default)]
struct SetState {
    records: Vec<Record>,
    prior: Vec<Record>,
    comparator: Option<Comparator>,
}

struct SetInner {
    source: SourceId,
    factory: Arc<dyn RecordHooks>,
    hooks: Arc<dyn CollectionHooks>,
    services: Services,
    state: RwLock<SetState>,
}

impl Drop for SetInner {
    fn drop(&mut self) {
        self.services.bus().unsubscribe_source(self.source);
        for record in &self.state.get_mut().records {
            record.detach(self.source);
        }
    }
}

/// Handle to one record set.
#[derive(Clone)]
pub struct RecordSet {
    inner: Arc<SetInner>,
}

impl PartialEq for RecordSet {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for RecordSet {}

impl fmt::Debug for RecordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSet")
            .field("type", &self.inner.factory.type_name())
            .field("source", &self.inner.source)
            .field("len", &self.len())
            .finish()
    }
}

impl RecordSet {
    /// Creates an empty set whose new members are built by `factory`.
    pub fn new(factory: Arc<dyn RecordHooks>, hooks: Arc<dyn CollectionHooks>, services: &Services) -> Self {
        Self {
            inner: Arc::new(SetInner {
                source: SourceId::new(),
                factory,
                hooks,
                services: services.clone(),
                state: RwLock::new(SetState::default()),
            }),
        }
    }

    /// Creates a set pre-populated with `records` (silently).
    pub fn with_records(
        factory: Arc<dyn RecordHooks>,
        hooks: Arc<dyn CollectionHooks>,
        services: &Services,
        records: &[Record],
    ) -> Self {
        let set = Self::new(factory, hooks, services);
        set.add(records, SetOptions::silent());
        set
    }

    /// Event bus source identity of this set.
    pub fn source(&self) -> SourceId {
        self.inner.source
    }

    /// Hooks used to build member records.
    pub fn factory(&self) -> &Arc<dyn RecordHooks> {
        &self.inner.factory
    }

    /// The set's own capability hooks.
    pub fn hooks(&self) -> &Arc<dyn CollectionHooks> {
        &self.inner.hooks
    }

    /// The services the set was constructed with.
    pub fn services(&self) -> &Services {
        &self.inner.services
    }

    /// Remote base URL, from the factory defaults.
    pub fn url(&self) -> String {
        self.factory_default(URL)
    }

    /// Remote resource name, from the factory defaults.
    pub fn name(&self) -> String {
        self.factory_default(NAME)
    }

    fn factory_default(&self, key: &str) -> String {
        self.inner
            .factory
            .defaults()
            .get(key)
            .map(value_to_string)
            .unwrap_or_default()
    }

    /// Builds a new, unattached record through the factory.
    pub fn create_record(&self, properties: PropertyMap) -> Record {
        Record::with_properties(self.inner.factory.clone(), &self.inner.services, properties)
    }

    fn notify(&self, kind: NotificationKind, records: Vec<Record>, options: SetOptions) {
        if options.silent || records.is_empty() {
            return;
        }
        self.publish(kind, Payload::Records(records));
    }

    /// Publishes a notification with this set as source.
    pub fn publish(&self, kind: NotificationKind, payload: Payload) -> usize {
        self.inner.services.bus().publish(self.inner.source, kind, payload)
    }

    /// Subscribes `listener` to `kind` notifications from this set.
    pub fn on<F>(&self, listener: ListenerId, kind: NotificationKind, callback: F) -> bool
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.inner
            .services
            .bus()
            .subscribe(listener, Some(self.inner.source), kind, callback)
    }

    // ── Membership ───────────────────────────────────────────────

    /// Appends every record not already present. Returns the appended ones.
    pub fn add(&self, records: &[Record], options: SetOptions) -> Vec<Record> {
        let added = {
            let mut state = self.inner.state.write();
            let mut added = Vec::new();
            for record in records {
                if !state.records.contains(record) {
                    state.records.push(record.clone());
                    added.push(record.clone());
                }
            }
            added
        };
        for record in &added {
            record.attach(self.inner.source);
        }
        self.notify(NotificationKind::Add, added.clone(), options);
        added
    }

    /// Alias of [`add`](Self::add).
    pub fn push(&self, records: &[Record], options: SetOptions) -> Vec<Record> {
        self.add(records, options)
    }

    /// Inserts records starting at `index` (clamped to the length). A record
    /// already present is moved rather than duplicated.
    pub fn insert(&self, records: &[Record], index: usize, options: SetOptions) -> Vec<Record> {
        let inserted = {
            let mut state = self.inner.state.write();
            let mut at = index.min(state.records.len());
            let mut inserted: Vec<Record> = Vec::new();
            for record in records {
                if inserted.contains(record) {
                    continue;
                }
                if let Some(pos) = state.records.iter().position(|r| r == record) {
                    state.records.remove(pos);
                }
                let target = at.min(state.records.len());
                state.records.insert(target, record.clone());
                inserted.push(record.clone());
                at = target + 1;
            }
            inserted
        };
        for record in &inserted {
            record.attach(self.inner.source);
        }
        self.notify(NotificationKind::Add, inserted.clone(), options);
        inserted
    }

    /// Removes records by identity. Returns the ones that were members.
    pub fn remove(&self, records: &[Record], options: SetOptions) -> Vec<Record> {
        let removed = {
            let mut state = self.inner.state.write();
            let mut removed = Vec::new();
            for record in records {
                if let Some(pos) = state.records.iter().position(|r| r == record) {
                    removed.push(state.records.remove(pos));
                }
            }
            removed
        };
        for record in &removed {
            record.detach(self.inner.source);
        }
        self.notify(NotificationKind::Remove, removed.clone(), options);
        removed
    }

    /// Replaces the whole membership and publishes a single Reset.
    pub fn reset(&self, records: &[Record], options: SetOptions) {
        let previous = {
            let mut state = self.inner.state.write();
            state.prior = state.records.clone();
            std::mem::take(&mut state.records)
        };
        for record in &previous {
            record.detach(self.inner.source);
        }
        let added = self.add(records, SetOptions::silent());
        if !options.silent {
            self.publish(NotificationKind::Reset, Payload::Records(added));
        }
    }

    /// Reconciles membership to exactly `records`: removes the stale ones,
    /// then adds the missing ones, with granular Remove/Add notifications.
    pub fn set(&self, records: &[Record], options: SetOptions) {
        let stale: Vec<Record> = self
            .records()
            .into_iter()
            .filter(|r| !records.contains(r))
            .collect();
        self.remove(&stale, options);
        self.add(records, options);
    }

    /// Inserts at the front.
    pub fn unshift(&self, records: &[Record], options: SetOptions) -> Vec<Record> {
        self.insert(records, 0, options)
    }

    /// Removes and returns the first record.
    pub fn shift(&self, options: SetOptions) -> Option<Record> {
        let first = self.at(0)?;
        self.remove(std::slice::from_ref(&first), options);
        Some(first)
    }

    /// Removes and returns the last record.
    pub fn pop(&self, options: SetOptions) -> Option<Record> {
        let last = self.inner.state.read().records.last().cloned()?;
        self.remove(std::slice::from_ref(&last), options);
        Some(last)
    }

    /// Removes and returns up to `length` records starting at `start`.
    pub fn slice(&self, start: usize, length: usize, options: SetOptions) -> Vec<Record> {
        let window: Vec<Record> = {
            let state = self.inner.state.read();
            state.records.iter().skip(start).take(length).cloned().collect()
        };
        self.remove(&window, options)
    }

    /// [`slice`](Self::slice) followed by inserting `records` at `start`.
    pub fn splice(&self, records: &[Record], start: usize, length: usize, options: SetOptions) -> Vec<Record> {
        let removed = self.slice(start, length, options);
        self.insert(records, start, options);
        removed
    }

    // ── Ordering ─────────────────────────────────────────────────

    /// Sets the comparator used when [`sort`](Self::sort) gets none.
    pub fn set_comparator(&self, comparator: Option<Comparator>) {
        self.inner.state.write().comparator = comparator;
    }

    /// Stable-sorts the records with `comparator`, or the set's own one.
    /// Without either, the order is left alone. Returns the resulting order.
    pub fn sort(&self, comparator: Option<Comparator>) -> Vec<Record> {
        let (mut records, comparator) = {
            let state = self.inner.state.read();
            (state.records.clone(), comparator.or_else(|| state.comparator.clone()))
        };
        let Some(comparator) = comparator else {
            return records;
        };
        records.sort_by(|a, b| comparator(a, b));

        let mut state = self.inner.state.write();
        // Write back only if membership is unchanged since the read.
        if state.records.len() == records.len() && records.iter().all(|r| state.records.contains(r)) {
            state.records = records.clone();
        }
        records
    }

    // ── Snapshots ────────────────────────────────────────────────

    /// Current members, in order.
    pub fn records(&self) -> Vec<Record> {
        self.inner.state.read().records.clone()
    }

    /// Members captured at the start of the last fetch or reset.
    pub fn prior_records(&self) -> Vec<Record> {
        self.inner.state.read().prior.clone()
    }

    /// Captures the current members as the reconciliation baseline.
    pub fn snapshot_prior(&self) {
        let mut state = self.inner.state.write();
        state.prior = state.records.clone();
    }

    /// Members that are new since the baseline or individually dirty.
    pub fn updated_records(&self) -> Vec<Record> {
        let state = self.inner.state.read();
        state
            .records
            .iter()
            .filter(|r| !state.prior.contains(r) || r.has_changed())
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.read().records.is_empty()
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Finds a member whose `id` or `clientId` equals `id`.
    pub fn get(&self, id: &str) -> Option<Record> {
        if id.trim().is_empty() {
            return None;
        }
        self.inner
            .state
            .read()
            .records
            .iter()
            .find(|r| r.client_id() == id || r.id() == id)
            .cloned()
    }

    pub fn contains(&self, record: &Record) -> bool {
        self.inner.state.read().records.contains(record)
    }

    pub fn at(&self, index: usize) -> Option<Record> {
        self.inner.state.read().records.get(index).cloned()
    }

    /// The first `n` members.
    pub fn first(&self, n: usize) -> Vec<Record> {
        self.inner.state.read().records.iter().take(n).cloned().collect()
    }

    /// The last `n` members, in order.
    pub fn last(&self, n: usize) -> Vec<Record> {
        let state = self.inner.state.read();
        let skip = state.records.len().saturating_sub(n);
        state.records[skip..].to_vec()
    }

    pub fn index_of(&self, record: &Record) -> Option<usize> {
        self.inner.state.read().records.iter().position(|r| r == record)
    }

    pub fn map<T>(&self, f: impl FnMut(&Record) -> T) -> Vec<T> {
        self.records().iter().map(f).collect()
    }

    pub fn filter(&self, mut f: impl FnMut(&Record) -> bool) -> Vec<Record> {
        self.records().into_iter().filter(|r| f(r)).collect()
    }

    pub fn find(&self, mut f: impl FnMut(&Record) -> bool) -> Option<Record> {
        self.records().into_iter().find(|r| f(r))
    }

    pub fn every(&self, f: impl FnMut(&Record) -> bool) -> bool {
        self.records().iter().all(f)
    }

    pub fn some(&self, f: impl FnMut(&Record) -> bool) -> bool {
        self.records().iter().any(f)
    }

    /// Groups members by a key, preserving member order inside each group.
    pub fn group_by<K: Ord>(&self, mut f: impl FnMut(&Record) -> K) -> BTreeMap<K, Vec<Record>> {
        let mut groups: BTreeMap<K, Vec<Record>> = BTreeMap::new();
        for record in self.records() {
            groups.entry(f(&record)).or_default().push(record);
        }
        groups
    }

    /// One property from every member.
    pub fn pluck(&self, key: &str) -> Vec<Option<Value>> {
        self.map(|r| r.get(key))
    }

    /// Members whose properties include every entry of `properties`.
    pub fn where_matching(&self, properties: &PropertyMap) -> Vec<Record> {
        self.filter(|r| properties.iter().all(|(k, v)| r.get(k).as_ref() == Some(v)))
    }

    /// A shuffled copy of the members; the set itself is not reordered.
    pub fn shuffle(&self) -> Vec<Record> {
        let mut records = self.records();
        records.shuffle(&mut rand::thread_rng());
        records
    }
}
