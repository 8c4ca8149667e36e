//! Call boundary types: request in, result out.
//!
//! The external caller (a contract loader or executor) supplies a
//! [`CallRequest`] and receives a [`CallResult`]. The result is the only
//! externally observable signal of a call; failures never escape as
//! panics or side effects on the backing store.

use serde::{Deserialize, Serialize};

use crate::context::ExecutionContext;
use crate::error::{ErrorCode, MissingContextField};
use crate::state::StateDiff;
use crate::types::{AccountId, BlockHeight, Hash, Timestamp};

/// How the call may touch storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    /// State-changing call; storage is committed on success.
    #[default]
    Call,
    /// Read-only call; storage mutations fail and nothing is committed.
    View,
}

/// Input to one call.
///
/// Context fields are optional so that an incomplete request is
/// representable; it is rejected before any contract code runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRequest {
    /// Raw input bytes handed to the contract unchanged.
    pub input: Vec<u8>,
    pub current_account: Option<AccountId>,
    pub predecessor_account: Option<AccountId>,
    pub signer_account: Option<AccountId>,
    pub block_height: Option<BlockHeight>,
    /// Nanoseconds.
    pub block_timestamp: Option<Timestamp>,
    #[serde(default)]
    pub kind: CallKind,
}

impl CallRequest {
    /// A request carrying `input` and no context.
    pub fn new(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    /// Set the three account identities.
    pub fn with_accounts(
        mut self,
        current: impl Into<AccountId>,
        predecessor: impl Into<AccountId>,
        signer: impl Into<AccountId>,
    ) -> Self {
        self.current_account = Some(current.into());
        self.predecessor_account = Some(predecessor.into());
        self.signer_account = Some(signer.into());
        self
    }

    /// Set block height and timestamp.
    pub fn with_block(mut self, height: BlockHeight, timestamp: Timestamp) -> Self {
        self.block_height = Some(height);
        self.block_timestamp = Some(timestamp);
        self
    }

    pub fn with_kind(mut self, kind: CallKind) -> Self {
        self.kind = kind;
        self
    }

    /// Build the context snapshot for this request.
    pub fn context(&self) -> Result<ExecutionContext, MissingContextField> {
        let mut builder = ExecutionContext::builder();
        if let Some(account) = &self.current_account {
            builder = builder.current_account(account.clone());
        }
        if let Some(account) = &self.predecessor_account {
            builder = builder.predecessor_account(account.clone());
        }
        if let Some(account) = &self.signer_account {
            builder = builder.signer_account(account.clone());
        }
        if let Some(height) = self.block_height {
            builder = builder.block_height(height);
        }
        if let Some(timestamp) = self.block_timestamp {
            builder = builder.block_timestamp(timestamp);
        }
        builder.build()
    }
}

/// Terminal state of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// Contract body returned normally and storage was finalized.
    Completed,
    /// Contract or host function faulted; storage was discarded.
    Failed,
}

impl CallStatus {
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl core::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Completed => write!(f, "COMPLETED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

/// Why a call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFailure {
    pub code: ErrorCode,
    pub message: String,
}

impl CallFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl core::fmt::Display for CallFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Output of one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallResult {
    pub status: CallStatus,
    /// Set at most once by the contract; always `None` on failure.
    pub return_value: Option<Vec<u8>>,
    /// Contract log messages in call order.
    pub logs: Vec<String>,
    /// Whether storage changes reached the backing store.
    pub committed: bool,
    pub failure: Option<CallFailure>,
    /// The changes applied to the backing store (empty unless committed).
    pub diff: StateDiff,
    /// BLAKE3 of the canonical diff encoding.
    pub diff_digest: Hash,
}

impl CallResult {
    /// Result of a call that returned normally.
    pub fn completed(
        return_value: Option<Vec<u8>>,
        logs: Vec<String>,
        committed: bool,
        diff: StateDiff,
        diff_digest: Hash,
    ) -> Self {
        Self {
            status: CallStatus::Completed,
            return_value,
            logs,
            committed,
            failure: None,
            diff,
            diff_digest,
        }
    }

    /// Result of a failed call: no return value, nothing committed.
    pub fn failed(failure: CallFailure, logs: Vec<String>, empty_digest: Hash) -> Self {
        Self {
            status: CallStatus::Failed,
            return_value: None,
            logs,
            committed: false,
            failure: Some(failure),
            diff: StateDiff::new(),
            diff_digest: empty_digest,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// The return value as UTF-8, if present and valid.
    pub fn return_str(&self) -> Option<&str> {
        self.return_value
            .as_deref()
            .and_then(|bytes| core::str::from_utf8(bytes).ok())
    }

    /// Failure code, or `ErrorCode::Ok` for completed calls.
    pub fn error_code(&self) -> ErrorCode {
        self.failure
            .as_ref()
            .map(|f| f.code)
            .unwrap_or(ErrorCode::Ok)
    }
}
