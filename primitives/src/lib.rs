//! `keystone-primitives`: foundational types for the Keystone call runtime.
//!
//! This crate provides the error codes, cryptographic digests, execution
//! context snapshot, state overlay, call boundary types and canonical
//! encoding shared by the host API and the runtime.

pub mod types;
pub mod error;
pub mod crypto;
pub mod context;
pub mod state;
pub mod execution;
pub mod codec;

// Re-export commonly used types at the crate root for convenience.
pub use types::{AccountId, BlockHeight, Hash, Timestamp, MAX_KEY_LEN, MAX_VALUE_LEN};
pub use error::{DecodeError, ErrorCode, MissingContextField};
pub use context::{ContextBuilder, ExecutionContext};
pub use state::{OverlayResult, StateDiff, StateOverlay};
pub use execution::{CallFailure, CallKind, CallRequest, CallResult, CallStatus};
