//! Host-side error types for Keystone calls.
//!
//! `HostError` is the error type of every `HostApi` method and of the
//! backing-store interface. It carries an `ErrorCode` from
//! `keystone-primitives` so a failed call can report a stable reason, and
//! an `Internal` variant for host faults that have no dedicated code.

use keystone_primitives::ErrorCode;
use std::fmt;

/// Host-side error type returned by `HostApi` and `StateStore` methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// A call error code.
    Code(ErrorCode),
    /// A call error code with context for the failure reason.
    Detailed(ErrorCode, String),
    /// An internal host error not directly mapped to a code.
    /// Reported as `ERR_INTERNAL`.
    Internal(String),
}

impl HostError {
    /// The error code this error is reported under.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Code(code) | Self::Detailed(code, _) => *code,
            Self::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Convert to the `i32` error code.
    pub fn to_error_code(&self) -> i32 {
        self.code().as_i32()
    }

    /// Create a duplicate-return error.
    pub fn duplicate_return() -> Self {
        Self::Detailed(
            ErrorCode::DuplicateReturn,
            "value_return called more than once".into(),
        )
    }

    /// Create a malformed-encoding error naming what failed to decode.
    pub fn malformed_encoding(what: impl Into<String>) -> Self {
        Self::Detailed(ErrorCode::MalformedEncoding, what.into())
    }

    /// Create a commit-conflict error.
    pub fn commit_conflict(reason: impl Into<String>) -> Self {
        Self::Detailed(ErrorCode::StorageCommitConflict, reason.into())
    }

    /// Create an empty-key error.
    pub fn invalid_key() -> Self {
        Self::Detailed(ErrorCode::InvalidKey, "storage key must not be empty".into())
    }

    /// Create a key-too-large error.
    pub fn key_too_large() -> Self {
        Self::Code(ErrorCode::KeyTooLarge)
    }

    /// Create a value-too-large error.
    pub fn value_too_large() -> Self {
        Self::Code(ErrorCode::ValueTooLarge)
    }

    /// Create a write-limit error.
    pub fn write_limit() -> Self {
        Self::Code(ErrorCode::WriteLimit)
    }

    /// Create a read-only error for the named host function.
    pub fn read_only(function: &str) -> Self {
        Self::Detailed(ErrorCode::ReadOnly, format!("{} in view call", function))
    }

    /// Create an invalid-state error.
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        Self::Detailed(ErrorCode::InvalidState, reason.into())
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "host error: {}", code),
            Self::Detailed(code, detail) => write!(f, "host error: {} ({})", code, detail),
            Self::Internal(msg) => write!(f, "internal host error: {}", msg),
        }
    }
}

impl std::error::Error for HostError {}

impl From<ErrorCode> for HostError {
    fn from(code: ErrorCode) -> Self {
        Self::Code(code)
    }
}

/// Convenience result type for host functions.
pub type HostResult<T> = Result<T, HostError>;
