//! `keystone-runtime`: runs contract bodies against the Keystone host API.
//!
//! Each call gets a fresh `Dispatcher` bound to:
//!
//! - **Context:** an immutable snapshot of accounts and block data
//! - **Storage:** a `StorageTransaction` buffering writes until commit
//! - **Logs:** a bounded, call-scoped `LogSink`
//!
//! A call either completes and commits its whole diff in one batch, or
//! fails and leaves the backing store untouched.
//!
//! The primary entry point is [`Runtime::execute_call`].

pub mod error;
pub mod config;
pub mod transaction;
pub mod host_impl;
pub mod validation;
pub mod linker;
pub mod runtime;

pub use error::RuntimeError;
pub use config::RuntimeConfig;
pub use transaction::{StorageTransaction, TransactionState};
pub use host_impl::{Dispatcher, DispatcherState};
pub use linker::EntryPoints;
pub use runtime::{Contract, Runtime};
