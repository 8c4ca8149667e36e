//! Runtime error types.
//!
//! These errors are returned before a contract body starts (bad request,
//! unknown entry point) or while setting the runtime up (configuration,
//! registration). Anything that goes wrong once a call is running is
//! reported inside the `CallResult` instead.

use keystone_primitives::{ErrorCode, MissingContextField};

/// Top-level error type for the runtime crate.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The request did not carry all five context fields.
    #[error(transparent)]
    MissingContextField(#[from] MissingContextField),

    /// No entry point is registered under this name.
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    /// An entry point was registered twice.
    #[error("duplicate entry point: {0}")]
    DuplicateEntry(String),

    /// Entry-point name does not follow the export naming rule.
    #[error("invalid entry point name: {0:?}")]
    InvalidEntryName(String),

    /// A contract imports a host function outside the closed set.
    #[error("unknown host function import: {0}")]
    UnknownImport(String),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// Configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    /// The call error code matching this error, where one exists.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::MissingContextField(_) => Some(ErrorCode::MissingContextField),
            _ => None,
        }
    }
}
