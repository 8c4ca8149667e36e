//! In-memory backing store.
//!
//! `MemStore` implements `StateStore` over a `BTreeMap` guarded by a
//! `parking_lot::RwLock`. Reads share the lock; `put_batch` takes it
//! exclusively, validates the batch's expected values and applies every
//! change before releasing it, so concurrent calls see commits whole.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::HostError;
use crate::state_store::{StateStore, WriteBatch};

/// In-memory state store backed by `BTreeMap`.
///
/// BTreeMap is used instead of HashMap for deterministic iteration order.
#[derive(Debug, Default)]
pub struct MemStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with data.
    pub fn with_data(data: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Insert a key-value pair directly, bypassing batch validation.
    pub fn insert(&self, key: Vec<u8>, value: Vec<u8>) {
        self.data.write().insert(key, value);
    }

    /// Remove a key directly, bypassing batch validation.
    pub fn remove(&self, key: &[u8]) {
        self.data.write().remove(key);
    }

    /// Returns the number of entries in the store.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Copy of the current contents, for assertions and replay.
    pub fn snapshot(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.data.read().clone()
    }
}

impl Clone for MemStore {
    fn clone(&self) -> Self {
        Self::with_data(self.snapshot())
    }
}

impl StateStore for MemStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn contains(&self, key: &[u8]) -> Result<bool, HostError> {
        Ok(self.data.read().contains_key(key))
    }

    fn put_batch(&self, batch: &WriteBatch) -> Result<(), HostError> {
        let mut data = self.data.write();

        for (key, expected) in &batch.expected {
            if data.get(key) != expected.as_ref() {
                debug!(key_len = key.len(), "rejecting batch: stale read");
                return Err(HostError::commit_conflict(format!(
                    "key {:?} changed since it was read",
                    String::from_utf8_lossy(key)
                )));
            }
        }

        for (key, value) in &batch.diff.writes {
            data.insert(key.clone(), value.clone());
        }
        for key in &batch.diff.removals {
            data.remove(key);
        }
        Ok(())
    }
}
