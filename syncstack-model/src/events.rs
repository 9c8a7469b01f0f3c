//! Notification dispatch.
//!
//! The [`EventBus`] is an explicitly constructed service shared by reference
//! (`Arc<EventBus>`) between every record and record set that should see each
//! other's notifications. A subscription is the tuple (listener, optional
//! source filter, kind, callback); listener and source compare by identity,
//! kind by value.
//!
//! Callbacks are invoked after the subscription table lock is released, so a
//! callback may subscribe, unsubscribe or publish on the same bus.

use crate::Record;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use syncstack_types::{Exchange, ListenerId, PropertyMap, SourceId};
use tracing::trace;

/// The category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Properties of a record changed.
    Change,
    /// A save round trip finished.
    Save,
    /// A destroy round trip finished.
    Delete,
    /// A fetch round trip finished (record or record set).
    Fetch,
    /// Records were added to a set.
    Add,
    /// Records were removed from a set.
    Remove,
    /// A set's membership was replaced wholesale.
    Reset,
}

impl NotificationKind {
    /// Kinds only ever published by record sets.
    #[must_use]
    pub const fn is_collection_only(&self) -> bool {
        matches!(self, Self::Add | Self::Remove | Self::Reset)
    }
}

/// Data delivered with a notification.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    #[default]
    Empty,
    /// The properties written by a Change.
    Changes(PropertyMap),
    /// The records affected by Add/Remove/Reset.
    Records(Vec<Record>),
    /// The round trip behind Save/Fetch/Delete.
    Exchange(Exchange),
}

impl Payload {
    /// The exchange, for lifecycle notifications.
    pub fn exchange(&self) -> Option<&Exchange> {
        match self {
            Self::Exchange(exchange) => Some(exchange),
            _ => None,
        }
    }

    /// The affected records, for membership notifications.
    pub fn records(&self) -> &[Record] {
        match self {
            Self::Records(records) => records,
            _ => &[],
        }
    }

    /// The written properties, for Change notifications.
    pub fn changes(&self) -> Option<&PropertyMap> {
        match self {
            Self::Changes(changes) => Some(changes),
            _ => None,
        }
    }
}

/// A published notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub source: SourceId,
    pub kind: NotificationKind,
    pub payload: Payload,
}

/// A subscription callback.
pub type Callback = Arc<dyn Fn(&Notification) + Send + Sync>;

struct Subscription {
    listener: ListenerId,
    source: Option<SourceId>,
    kind: NotificationKind,
    callback: Callback,
    once: bool,
}

impl Subscription {
    fn same_key(&self, listener: ListenerId, source: Option<SourceId>, kind: NotificationKind) -> bool {
        self.listener == listener && self.source == source && self.kind == kind
    }

    fn matches_filter(
        &self,
        listener: Option<ListenerId>,
        source: Option<SourceId>,
        kind: Option<NotificationKind>,
    ) -> bool {
        listener.is_none_or(|l| l == self.listener)
            && source.is_none_or(|s| self.source == Some(s))
            && kind.is_none_or(|k| k == self.kind)
    }

    fn accepts(&self, source: SourceId, kind: NotificationKind) -> bool {
        self.kind == kind && self.source.is_none_or(|s| s == source)
    }
}

/// Publish/subscribe hub for record and record set notifications.
#[derive(Default)]
pub struct EventBus {
    subscriptions: Mutex<Vec<Subscription>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.len())
            .finish()
    }
}

impl EventBus {
    /// Creates a bus with no subscriptions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for `kind` notifications, optionally only those
    /// published by `source`.
    ///
    /// Returns `false` (and registers nothing) when the same listener already
    /// holds a subscription for the same source filter and kind.
    pub fn subscribe<F>(
        &self,
        listener: ListenerId,
        source: Option<SourceId>,
        kind: NotificationKind,
        callback: F,
    ) -> bool
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.insert(listener, source, kind, Arc::new(callback), false)
    }

    /// Like [`subscribe`](Self::subscribe), but the subscription is removed
    /// right after its first delivery.
    pub fn subscribe_once<F>(
        &self,
        listener: ListenerId,
        source: Option<SourceId>,
        kind: NotificationKind,
        callback: F,
    ) -> bool
    where
        F: Fn(&Notification) + Send + Sync + 'static,
    {
        self.insert(listener, source, kind, Arc::new(callback), true)
    }

    fn insert(
        &self,
        listener: ListenerId,
        source: Option<SourceId>,
        kind: NotificationKind,
        callback: Callback,
        once: bool,
    ) -> bool {
        let mut subs = self.subscriptions.lock();
        if subs.iter().any(|s| s.same_key(listener, source, kind)) {
            return false;
        }
        subs.push(Subscription {
            listener,
            source,
            kind,
            callback,
            once,
        });
        true
    }

    /// Removes every subscription of `listener` matching the optional source
    /// and kind; `None` matches anything. Returns how many were removed.
    pub fn unsubscribe(
        &self,
        listener: ListenerId,
        source: Option<SourceId>,
        kind: Option<NotificationKind>,
    ) -> usize {
        self.remove_where(|s| s.matches_filter(Some(listener), source, kind))
    }

    /// Removes every subscription filtered on `source`, whoever registered it.
    pub fn unsubscribe_source(&self, source: SourceId) -> usize {
        self.remove_where(|s| s.source == Some(source))
    }

    fn remove_where(&self, pred: impl Fn(&Subscription) -> bool) -> usize {
        let mut subs = self.subscriptions.lock();
        let before = subs.len();
        subs.retain(|s| !pred(s));
        before - subs.len()
    }

    /// Whether `listener` holds a subscription for exactly this source filter
    /// and kind.
    pub fn is_subscribed(
        &self,
        listener: ListenerId,
        source: Option<SourceId>,
        kind: NotificationKind,
    ) -> bool {
        self.subscriptions
            .lock()
            .iter()
            .any(|s| s.same_key(listener, source, kind))
    }

    /// Delivers a notification to every matching subscription in
    /// registration order. Returns the number of callbacks invoked.
    pub fn publish(&self, source: SourceId, kind: NotificationKind, payload: Payload) -> usize {
        let callbacks: Vec<Callback> = {
            let mut subs = self.subscriptions.lock();
            let matched = subs
                .iter()
                .filter(|s| s.accepts(source, kind))
                .map(|s| s.callback.clone())
                .collect();
            subs.retain(|s| !(s.once && s.accepts(source, kind)));
            matched
        };

        trace!(?kind, %source, listeners = callbacks.len(), "publishing notification");
        let notification = Notification {
            source,
            kind,
            payload,
        };
        for callback in &callbacks {
            callback(&notification);
        }
        callbacks.len()
    }

    /// Number of live subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Whether there are no subscriptions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
