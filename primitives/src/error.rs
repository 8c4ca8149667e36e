//! Error codes for Keystone calls.
//!
//! Every failure that can end a call maps to one stable numeric code so
//! independent re-executions can compare failure reasons exactly.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Call error codes.
///
/// The repr values are part of the call result contract and must not be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    DuplicateReturn = 1,
    MalformedEncoding = 2,
    StorageCommitConflict = 3,
    MissingContextField = 4,
    InvalidKey = 5,
    KeyTooLarge = 6,
    ValueTooLarge = 7,
    WriteLimit = 8,
    ReadOnly = 9,
    InvalidState = 10,
    ContractFault = 11,
    Internal = 12,
}

impl ErrorCode {
    /// Convert from an i32 error code.
    pub fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Ok),
            1 => Some(Self::DuplicateReturn),
            2 => Some(Self::MalformedEncoding),
            3 => Some(Self::StorageCommitConflict),
            4 => Some(Self::MissingContextField),
            5 => Some(Self::InvalidKey),
            6 => Some(Self::KeyTooLarge),
            7 => Some(Self::ValueTooLarge),
            8 => Some(Self::WriteLimit),
            9 => Some(Self::ReadOnly),
            10 => Some(Self::InvalidState),
            11 => Some(Self::ContractFault),
            12 => Some(Self::Internal),
            _ => None,
        }
    }

    /// Return the i32 representation of this error code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns true if this is the `Ok` variant.
    pub fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::DuplicateReturn => write!(f, "ERR_DUPLICATE_RETURN"),
            Self::MalformedEncoding => write!(f, "ERR_MALFORMED_ENCODING"),
            Self::StorageCommitConflict => write!(f, "ERR_STORAGE_COMMIT_CONFLICT"),
            Self::MissingContextField => write!(f, "ERR_MISSING_CONTEXT_FIELD"),
            Self::InvalidKey => write!(f, "ERR_INVALID_KEY"),
            Self::KeyTooLarge => write!(f, "ERR_KEY_TOO_LARGE"),
            Self::ValueTooLarge => write!(f, "ERR_VALUE_TOO_LARGE"),
            Self::WriteLimit => write!(f, "ERR_WRITE_LIMIT"),
            Self::ReadOnly => write!(f, "ERR_READ_ONLY"),
            Self::InvalidState => write!(f, "ERR_INVALID_STATE"),
            Self::ContractFault => write!(f, "ERR_CONTRACT_FAULT"),
            Self::Internal => write!(f, "ERR_INTERNAL"),
        }
    }
}

/// Snapshot construction was attempted without one of the required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("missing context field: {0}")]
pub struct MissingContextField(pub &'static str);

/// Decoding a canonical encoding failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("decode error: {0}")]
pub struct DecodeError(pub String);
