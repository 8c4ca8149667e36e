//! Host API trait: the function-call surface contracts run against.
//!
//! The host function set is closed and known at build time: `HostFunction`
//! names every member and `HostApi` has one typed method per member. The
//! runtime creates one `HostApi` implementation per call and passes it to
//! the contract body as an explicit argument; there is no ambient access
//! to "the current call".

use core::fmt;

use keystone_primitives::{AccountId, BlockHeight, Hash, Timestamp};

use crate::error::{HostError, HostResult};

/// The closed set of host functions available to contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HostFunction {
    ValueReturn,
    Input,
    Log,
    StorageWrite,
    StorageRead,
    StorageRemove,
    StorageHasKey,
    CurrentAccountId,
    PredecessorAccountId,
    SignerAccountId,
    BlockHeight,
    BlockTimestamp,
    Sha256,
    Keccak256,
}

impl HostFunction {
    /// Every host function, in declaration order.
    pub const ALL: [HostFunction; 14] = [
        Self::ValueReturn,
        Self::Input,
        Self::Log,
        Self::StorageWrite,
        Self::StorageRead,
        Self::StorageRemove,
        Self::StorageHasKey,
        Self::CurrentAccountId,
        Self::PredecessorAccountId,
        Self::SignerAccountId,
        Self::BlockHeight,
        Self::BlockTimestamp,
        Self::Sha256,
        Self::Keccak256,
    ];

    /// The name contracts import this function under.
    pub fn name(self) -> &'static str {
        match self {
            Self::ValueReturn => "value_return",
            Self::Input => "input",
            Self::Log => "log",
            Self::StorageWrite => "storage_write",
            Self::StorageRead => "storage_read",
            Self::StorageRemove => "storage_remove",
            Self::StorageHasKey => "storage_has_key",
            Self::CurrentAccountId => "current_account_id",
            Self::PredecessorAccountId => "predecessor_account_id",
            Self::SignerAccountId => "signer_account_id",
            Self::BlockHeight => "block_height",
            Self::BlockTimestamp => "block_timestamp",
            Self::Sha256 => "sha256",
            Self::Keccak256 => "keccak256",
        }
    }

    /// Look up a host function by import name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }

    /// True for the functions that change storage.
    pub fn mutates_storage(self) -> bool {
        matches!(self, Self::StorageWrite | Self::StorageRemove)
    }
}

impl fmt::Display for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Host-side implementation of the contract host API.
///
/// Every method returns `HostResult` so that any host function can fail
/// the call, and every method takes `&mut self` so the implementation can
/// record that failure. A contract that receives an `Err` should propagate
/// it; the runtime fails the call on the first host error regardless.
pub trait HostApi {
    // ── Return value & input ──

    /// Set the call's return value. Fails with `DuplicateReturn` if it was
    /// already set.
    fn value_return(&mut self, value: &[u8]) -> HostResult<()>;

    /// The call's raw input bytes. Not consumed; any number of calls
    /// return the same bytes.
    fn input(&mut self) -> HostResult<&[u8]>;

    // ── Logging ──

    /// Append a message to the call's log. Never fails for a running call.
    fn log(&mut self, message: &str) -> HostResult<()>;

    // ── Storage ──

    /// Buffer a write. Visible to later reads in this call immediately,
    /// to other calls only after commit.
    fn storage_write(&mut self, key: &[u8], value: &[u8]) -> HostResult<()>;

    /// Read a value, observing this call's own uncommitted changes.
    ///
    /// Returns `Ok(None)` if the key is absent or was removed in this call.
    fn storage_read(&mut self, key: &[u8]) -> HostResult<Option<Vec<u8>>>;

    /// Buffer a removal. Removing an absent key is not an error.
    fn storage_remove(&mut self, key: &[u8]) -> HostResult<()>;

    /// True if `storage_read(key)` would return a value.
    fn storage_has_key(&mut self, key: &[u8]) -> HostResult<bool>;

    // ── Context ──

    fn current_account_id(&mut self) -> HostResult<AccountId>;

    fn predecessor_account_id(&mut self) -> HostResult<AccountId>;

    fn signer_account_id(&mut self) -> HostResult<AccountId>;

    fn block_height(&mut self) -> HostResult<BlockHeight>;

    /// Block timestamp in nanoseconds.
    fn block_timestamp(&mut self) -> HostResult<Timestamp>;

    // ── Crypto ──

    fn sha256(&mut self, data: &[u8]) -> HostResult<Hash>;

    fn keccak256(&mut self, data: &[u8]) -> HostResult<Hash>;

    // ── Failure reporting ──

    /// Hand back an error raised outside the typed host functions.
    ///
    /// The text conveniences below route their decode failures through
    /// here, so an implementation that tracks the call's first fault sees
    /// them too. The default passes the error through unchanged.
    fn report(&mut self, error: HostError) -> HostError {
        error
    }

    // ── Text conveniences ──
    //
    // Contracts written against string values go through these. All text
    // is UTF-8; bytes that do not decode fail the call with
    // `MalformedEncoding` instead of being guessed at.

    /// The input decoded as UTF-8.
    fn input_str(&mut self) -> HostResult<String> {
        let bytes = self.input()?.to_vec();
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(_) => Err(self.report(HostError::malformed_encoding("input is not valid UTF-8"))),
        }
    }

    fn value_return_str(&mut self, value: &str) -> HostResult<()> {
        self.value_return(value.as_bytes())
    }

    fn storage_write_str(&mut self, key: &str, value: &str) -> HostResult<()> {
        self.storage_write(key.as_bytes(), value.as_bytes())
    }

    /// Read a value and decode it as UTF-8.
    fn storage_read_str(&mut self, key: &str) -> HostResult<Option<String>> {
        match self.storage_read(key.as_bytes())? {
            None => Ok(None),
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(text) => Ok(Some(text)),
                Err(_) => Err(self.report(HostError::malformed_encoding(format!(
                    "value of {:?} is not valid UTF-8",
                    key
                )))),
            },
        }
    }

    fn storage_remove_str(&mut self, key: &str) -> HostResult<()> {
        self.storage_remove(key.as_bytes())
    }

    fn storage_has_key_str(&mut self, key: &str) -> HostResult<bool> {
        self.storage_has_key(key.as_bytes())
    }

    /// SHA-256 as 64 lowercase hex characters.
    fn sha256_hex(&mut self, data: &[u8]) -> HostResult<String> {
        Ok(keystone_primitives::types::to_hex(&self.sha256(data)?))
    }

    /// Keccak-256 as 64 lowercase hex characters.
    fn keccak256_hex(&mut self, data: &[u8]) -> HostResult<String> {
        Ok(keystone_primitives::types::to_hex(&self.keccak256(data)?))
    }
}
