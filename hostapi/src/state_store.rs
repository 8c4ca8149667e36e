//! Backing store abstraction.
//!
//! `StateStore` is the durable key-value store a call reads through and
//! commits into. The runtime layers a per-call `StateOverlay` over it:
//! reads check the overlay first, then fall through to the store; writes
//! reach the store only through one atomic `put_batch` at commit.
//!
//! Implementations:
//! - `MemStore` (this crate): in-memory, lock-protected
//! - persistent backends live outside this workspace

use std::collections::BTreeMap;

use keystone_primitives::StateDiff;

use crate::error::HostError;

/// One atomic commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    /// Writes and removals to apply.
    pub diff: StateDiff,
    /// Values the call observed in the store (`None` = absent).
    ///
    /// A store enforcing optimistic concurrency rejects the batch if any of
    /// these no longer match. Empty means "apply unconditionally".
    pub expected: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl WriteBatch {
    /// A batch applied unconditionally.
    pub fn new(diff: StateDiff) -> Self {
        Self {
            diff,
            expected: BTreeMap::new(),
        }
    }

    /// A batch guarded by the values the call read.
    pub fn with_expected(diff: StateDiff, expected: BTreeMap<Vec<u8>, Option<Vec<u8>>>) -> Self {
        Self { diff, expected }
    }

    /// Returns true if the batch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }
}

/// Abstraction over the durable key-value store.
///
/// `put_batch` is the only mutating operation and must be atomic with
/// respect to concurrent `put_batch` and `get` calls: a reader observes
/// either none or all of a batch.
pub trait StateStore: Send + Sync {
    /// Get the value for a key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, HostError>;

    /// Check if a key exists.
    ///
    /// Default implementation uses `get()`, but backends may optimize this.
    fn contains(&self, key: &[u8]) -> Result<bool, HostError> {
        Ok(self.get(key)?.is_some())
    }

    /// Apply a batch of writes and removals atomically.
    ///
    /// Returns `Err` with `ErrorCode::StorageCommitConflict` if the store
    /// rejects the batch; in that case nothing from the batch is applied.
    fn put_batch(&self, batch: &WriteBatch) -> Result<(), HostError>;
}
