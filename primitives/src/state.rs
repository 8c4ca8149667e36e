//! Call-scoped state overlay.
//!
//! The overlay buffers writes and removals during one call and makes them
//! visible to later reads within the same call. On success the buffered
//! changes are handed to the backing store as one [`StateDiff`]; on failure
//! they are dropped.
//!
//! Keys and values are opaque bytes. `BTreeMap`/`BTreeSet` keep iteration
//! order deterministic so the same call always yields the same diff.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Transactional write buffer overlaying the backing store.
///
/// A key is never present in both `pending_writes` and `pending_removals`:
/// the last operation on a key wins.
#[derive(Debug, Clone, Default)]
pub struct StateOverlay {
    pending_writes: BTreeMap<Vec<u8>, Vec<u8>>,
    pending_removals: BTreeSet<Vec<u8>>,
    /// Bytes held in the buffer (keys + values) for enforcing `max_write_bytes`.
    total_write_bytes: u64,
}

/// Result of looking up a key in the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayResult {
    /// Key was written in this overlay with this value.
    Found(Vec<u8>),
    /// Key was removed in this overlay.
    Removed,
    /// Key has not been touched; caller must consult the backing store.
    NotInOverlay,
}

impl StateOverlay {
    /// Create a new empty overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a write, replacing any earlier write or removal of the key.
    pub fn write(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.forget(&key);
        self.total_write_bytes = self
            .total_write_bytes
            .saturating_add((key.len() + value.len()) as u64);
        self.pending_writes.insert(key, value);
    }

    /// Buffer a removal, replacing any earlier write of the key.
    ///
    /// Removing a key that exists nowhere is not an error.
    pub fn remove(&mut self, key: Vec<u8>) {
        self.forget(&key);
        // Removals still count the key bytes toward the write budget
        self.total_write_bytes = self.total_write_bytes.saturating_add(key.len() as u64);
        self.pending_removals.insert(key);
    }

    /// Drop whatever is buffered for `key`, releasing its byte budget.
    fn forget(&mut self, key: &[u8]) {
        if let Some(prev) = self.pending_writes.remove(key) {
            let released = (key.len() + prev.len()) as u64;
            self.total_write_bytes = self.total_write_bytes.saturating_sub(released);
        } else if self.pending_removals.remove(key) {
            self.total_write_bytes = self.total_write_bytes.saturating_sub(key.len() as u64);
        }
    }

    /// Look up a key in the overlay.
    pub fn get(&self, key: &[u8]) -> OverlayResult {
        if let Some(value) = self.pending_writes.get(key) {
            OverlayResult::Found(value.clone())
        } else if self.pending_removals.contains(key) {
            OverlayResult::Removed
        } else {
            OverlayResult::NotInOverlay
        }
    }

    /// Returns true if the overlay holds a write or a removal for this key.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.pending_writes.contains_key(key) || self.pending_removals.contains(key)
    }

    /// Buffered writes, sorted by key.
    pub fn pending_writes(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.pending_writes
    }

    /// Buffered removals, sorted by key.
    pub fn pending_removals(&self) -> &BTreeSet<Vec<u8>> {
        &self.pending_removals
    }

    /// Consume the overlay and return its changes.
    pub fn into_diff(self) -> StateDiff {
        StateDiff {
            writes: self.pending_writes,
            removals: self.pending_removals,
        }
    }

    /// Clear all buffered changes. Used when discarding on failure.
    pub fn clear(&mut self) {
        self.pending_writes.clear();
        self.pending_removals.clear();
        self.total_write_bytes = 0;
    }

    /// Returns the number of keys touched (written or removed).
    pub fn len(&self) -> usize {
        self.pending_writes.len() + self.pending_removals.len()
    }

    /// Returns true if nothing has been buffered.
    pub fn is_empty(&self) -> bool {
        self.pending_writes.is_empty() && self.pending_removals.is_empty()
    }

    /// Returns the buffered bytes (keys + values) for limit enforcement.
    pub fn total_write_bytes(&self) -> u64 {
        self.total_write_bytes
    }
}

/// The storage changes of one call, as applied to the backing store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDiff {
    pub writes: BTreeMap<Vec<u8>, Vec<u8>>,
    pub removals: BTreeSet<Vec<u8>>,
}

impl StateDiff {
    /// An empty diff.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the diff changes nothing.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty() && self.removals.is_empty()
    }

    /// Number of keys the diff touches.
    pub fn len(&self) -> usize {
        self.writes.len() + self.removals.len()
    }
}
