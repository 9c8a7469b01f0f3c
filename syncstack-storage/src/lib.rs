//! Persistent record storage for syncstack.
//!
//! The sync core only ever talks to storage through [`PersistentStore`]: a
//! generic key/record store with transactional save semantics. Writes are
//! staged against a [`StoreHandle`] and become visible atomically when
//! [`PersistentStore::commit`] succeeds.
//!
//! [`MemoryStore`] is the in-process engine used by default and in tests.

mod error;
mod memory;

pub use error::{StorageError, StorageResult};
pub use memory::{MemoryStore, StoredRow};

use serde::{Deserialize, Serialize};
use std::fmt;
use syncstack_types::Value;

/// Opaque handle to one row in a persistent store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreHandle(u64);

impl StoreHandle {
    /// Wraps a raw row number.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw row number.
    #[must_use]
    pub const fn as_raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row#{}", self.0)
    }
}

/// A generic record store with transactional save semantics.
///
/// Every mutating call stages work; nothing is visible until `commit`
/// succeeds, and a failed commit applies nothing.
pub trait PersistentStore: Send + Sync {
    /// Allocates a new row of the given type.
    fn create_record(&self, type_name: &str) -> StoreHandle;

    /// Stages a field write on a row.
    fn set_field(&self, handle: StoreHandle, name: &str, value: Value);

    /// Stages removal of a row.
    fn delete(&self, handle: StoreHandle);

    /// Applies every staged change atomically.
    fn commit(&self) -> StorageResult<()>;
}
