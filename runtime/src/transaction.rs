//! Scoped storage transaction.
//!
//! A `StorageTransaction` buffers one call's writes and removals in a
//! `StateOverlay` over the backing `StateStore`. Reads see the call's own
//! pending changes first. Nothing reaches the store until `commit`, which
//! hands the whole diff over in a single `WriteBatch`.

use std::collections::BTreeMap;
use std::sync::Arc;

use keystone_hostapi::{ExecutionConfig, HostError, HostFunction, HostResult, StateStore, WriteBatch};
use keystone_primitives::{OverlayResult, StateDiff, StateOverlay};
use tracing::debug;

/// Lifecycle of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    Open,
    Committed,
    Discarded,
}

/// Pending storage changes of one call.
pub struct StorageTransaction {
    backing: Arc<dyn StateStore>,
    overlay: StateOverlay,
    /// First value observed in the backing store for each key read.
    read_set: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    limits: ExecutionConfig,
    read_only: bool,
    state: TransactionState,
}

impl StorageTransaction {
    /// Open a transaction that may write.
    pub fn new(backing: Arc<dyn StateStore>, limits: ExecutionConfig) -> Self {
        Self {
            backing,
            overlay: StateOverlay::new(),
            read_set: BTreeMap::new(),
            limits,
            read_only: false,
            state: TransactionState::Open,
        }
    }

    /// Open a transaction that rejects writes and removals with `ReadOnly`.
    pub fn read_only(backing: Arc<dyn StateStore>, limits: ExecutionConfig) -> Self {
        Self {
            read_only: true,
            ..Self::new(backing, limits)
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Pending writes and removals.
    pub fn overlay(&self) -> &StateOverlay {
        &self.overlay
    }

    /// Values observed in the backing store so far.
    pub fn read_set(&self) -> &BTreeMap<Vec<u8>, Option<Vec<u8>>> {
        &self.read_set
    }

    /// Read a key: pending write, then pending removal, then the store.
    pub fn read(&mut self, key: &[u8]) -> HostResult<Option<Vec<u8>>> {
        self.ensure_open()?;
        self.check_key(key)?;
        match self.overlay.get(key) {
            OverlayResult::Found(value) => Ok(Some(value)),
            OverlayResult::Removed => Ok(None),
            OverlayResult::NotInOverlay => {
                let value = self.backing.get(key)?;
                self.read_set
                    .entry(key.to_vec())
                    .or_insert_with(|| value.clone());
                Ok(value)
            }
        }
    }

    /// True if `read(key)` would return a value.
    pub fn has_key(&mut self, key: &[u8]) -> HostResult<bool> {
        Ok(self.read(key)?.is_some())
    }

    /// Buffer a write. Clears a pending removal of the same key.
    pub fn write(&mut self, key: &[u8], value: &[u8]) -> HostResult<()> {
        self.ensure_open()?;
        if self.read_only {
            return Err(HostError::read_only(HostFunction::StorageWrite.name()));
        }
        self.check_key(key)?;
        if value.len() > self.limits.max_value_len {
            return Err(HostError::value_too_large());
        }
        self.overlay.write(key.to_vec(), value.to_vec());
        self.check_write_bytes()
    }

    /// Buffer a removal. Clears a pending write; removing twice is fine.
    pub fn remove(&mut self, key: &[u8]) -> HostResult<()> {
        self.ensure_open()?;
        if self.read_only {
            return Err(HostError::read_only(HostFunction::StorageRemove.name()));
        }
        self.check_key(key)?;
        self.overlay.remove(key.to_vec());
        self.check_write_bytes()
    }

    /// Apply all pending changes to the backing store in one batch.
    ///
    /// With `validate_reads` the batch carries the read set, so the store
    /// can refuse it if anything this call read has changed since. On
    /// failure the transaction is discarded. Returns the applied diff.
    pub fn commit(&mut self, validate_reads: bool) -> HostResult<StateDiff> {
        self.ensure_open()?;
        let diff = std::mem::take(&mut self.overlay).into_diff();
        let read_set = std::mem::take(&mut self.read_set);

        if diff.is_empty() {
            self.state = TransactionState::Committed;
            return Ok(diff);
        }

        let batch = if validate_reads {
            WriteBatch::with_expected(diff, read_set)
        } else {
            WriteBatch::new(diff)
        };

        match self.backing.put_batch(&batch) {
            Ok(()) => {
                self.state = TransactionState::Committed;
                Ok(batch.diff)
            }
            Err(e) => {
                debug!(error = %e, "commit rejected by backing store");
                self.state = TransactionState::Discarded;
                Err(e)
            }
        }
    }

    /// Drop all pending changes.
    pub fn discard(&mut self) -> HostResult<()> {
        match self.state {
            TransactionState::Committed => {
                Err(HostError::invalid_state("transaction already committed"))
            }
            TransactionState::Discarded => Ok(()),
            TransactionState::Open => {
                self.overlay.clear();
                self.read_set.clear();
                self.state = TransactionState::Discarded;
                Ok(())
            }
        }
    }

    fn ensure_open(&self) -> HostResult<()> {
        match self.state {
            TransactionState::Open => Ok(()),
            TransactionState::Committed => {
                Err(HostError::invalid_state("transaction already committed"))
            }
            TransactionState::Discarded => {
                Err(HostError::invalid_state("transaction already discarded"))
            }
        }
    }

    fn check_key(&self, key: &[u8]) -> HostResult<()> {
        if key.is_empty() {
            return Err(HostError::invalid_key());
        }
        if key.len() > self.limits.max_key_len {
            return Err(HostError::key_too_large());
        }
        Ok(())
    }

    fn check_write_bytes(&self) -> HostResult<()> {
        if self.overlay.total_write_bytes() > self.limits.max_write_bytes {
            return Err(HostError::write_limit());
        }
        Ok(())
    }
}
