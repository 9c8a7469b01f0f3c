//! In-memory transactional store.
//!
//! Staged operations are kept in submission order and replayed against the
//! committed rows on `commit`. A rejected commit leaves both the committed rows
//! and the staged queue untouched, so the next commit retries the same batch.

use crate::{PersistentStore, StorageError, StorageResult, StoreHandle};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use syncstack_types::{PropertyMap, Value};
use tracing::{debug, warn};

/// A committed row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRow {
    pub type_name: String,
    pub fields: PropertyMap,
}

#[derive(Debug, Clone)]
enum StagedOp {
    Create { handle: StoreHandle, type_name: String },
    Set { handle: StoreHandle, name: String, value: Value },
    Delete { handle: StoreHandle },
}

#[derive(Debug, Default)]
struct Inner {
    next_handle: u64,
    rows: BTreeMap<StoreHandle, StoredRow>,
    staged: Vec<StagedOp>,
    commits: usize,
    fail_next_commit: Option<String>,
}

/// A [`PersistentStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a committed row.
    pub fn row(&self, handle: StoreHandle) -> Option<StoredRow> {
        self.inner.lock().rows.get(&handle).cloned()
    }

    /// Returns one committed field of a row.
    pub fn field(&self, handle: StoreHandle, name: &str) -> StorageResult<Value> {
        let inner = self.inner.lock();
        let row = inner
            .rows
            .get(&handle)
            .ok_or_else(|| StorageError::NotFound(handle.to_string()))?;
        row.fields
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("{handle}.{name}")))
    }

    /// Whether a committed row exists for the handle.
    pub fn contains(&self, handle: StoreHandle) -> bool {
        self.inner.lock().rows.contains_key(&handle)
    }

    /// Committed rows of a given type, in creation order.
    pub fn rows_of(&self, type_name: &str) -> Vec<(StoreHandle, StoredRow)> {
        self.inner
            .lock()
            .rows
            .iter()
            .filter(|(_, row)| row.type_name == type_name)
            .map(|(h, row)| (*h, row.clone()))
            .collect()
    }

    /// Number of committed rows.
    pub fn len(&self) -> usize {
        self.inner.lock().rows.len()
    }

    /// Whether no rows are committed.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().rows.is_empty()
    }

    /// Number of staged operations awaiting commit.
    pub fn pending(&self) -> usize {
        self.inner.lock().staged.len()
    }

    /// Number of successful commits so far.
    pub fn commit_count(&self) -> usize {
        self.inner.lock().commits
    }

    /// Makes the next commit fail with the given reason.
    pub fn fail_next_commit(&self, reason: impl Into<String>) {
        self.inner.lock().fail_next_commit = Some(reason.into());
    }

    /// Serializes every committed row, keyed by raw handle.
    pub fn to_json(&self) -> StorageResult<String> {
        let inner = self.inner.lock();
        let rows: BTreeMap<u64, &StoredRow> =
            inner.rows.iter().map(|(h, row)| (h.as_raw(), row)).collect();
        Ok(serde_json::to_string(&rows)?)
    }
}

impl PersistentStore for MemoryStore {
    fn create_record(&self, type_name: &str) -> StoreHandle {
        let mut inner = self.inner.lock();
        inner.next_handle += 1;
        let handle = StoreHandle::from_raw(inner.next_handle);
        inner.staged.push(StagedOp::Create {
            handle,
            type_name: type_name.to_string(),
        });
        handle
    }

    fn set_field(&self, handle: StoreHandle, name: &str, value: Value) {
        self.inner.lock().staged.push(StagedOp::Set {
            handle,
            name: name.to_string(),
            value,
        });
    }

    fn delete(&self, handle: StoreHandle) {
        self.inner.lock().staged.push(StagedOp::Delete { handle });
    }

    fn commit(&self) -> StorageResult<()> {
        let mut inner = self.inner.lock();
        if let Some(reason) = inner.fail_next_commit.take() {
            warn!("memory store commit rejected: {reason}");
            return Err(StorageError::CommitFailed(reason));
        }

        let staged = std::mem::take(&mut inner.staged);
        let count = staged.len();
        for op in staged {
            match op {
                StagedOp::Create { handle, type_name } => {
                    inner.rows.entry(handle).or_insert(StoredRow {
                        type_name,
                        fields: PropertyMap::new(),
                    });
                }
                StagedOp::Set { handle, name, value } => match inner.rows.get_mut(&handle) {
                    Some(row) => {
                        row.fields.insert(name, value);
                    }
                    None => debug!("dropping write to missing {handle}.{name}"),
                },
                StagedOp::Delete { handle } => {
                    inner.rows.remove(&handle);
                }
            }
        }
        inner.commits += 1;
        debug!("memory store committed {count} staged operations");
        Ok(())
    }
}
