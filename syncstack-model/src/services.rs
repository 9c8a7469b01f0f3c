use crate::EventBus;
use std::fmt;
use std::sync::Arc;
use syncstack_storage::{MemoryStore, PersistentStore};

/// The shared services every record and record set is constructed with.
///
/// Built once at start-up and cloned into each object; clones share the same
/// bus and store.
#[derive(Clone)]
pub struct Services {
    bus: Arc<EventBus>,
    store: Arc<dyn PersistentStore>,
}

impl Services {
    /// Bundles a bus and a store.
    pub fn new(bus: Arc<EventBus>, store: Arc<dyn PersistentStore>) -> Self {
        Self { bus, store }
    }

    /// A fresh bus over an in-memory store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(EventBus::new()), Arc::new(MemoryStore::new()))
    }

    /// The event bus.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// The persistent store.
    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.store
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").field("bus", &self.bus).finish_non_exhaustive()
    }
}
