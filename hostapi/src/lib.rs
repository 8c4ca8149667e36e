//! `keystone-hostapi`: host API trait definitions and types for Keystone calls.
//!
//! This crate defines the interface between contract code and the host:
//!
//! - `HostApi` trait and the closed `HostFunction` set
//! - `StateStore` trait: backing store abstraction with atomic batches
//! - `MemStore`: in-memory `StateStore`
//! - `LogSink`: call-scoped log collection
//! - `ExecutionConfig`: resource limits for one call
//! - `HostError`: host-side error type with `ErrorCode` conversion

pub mod error;
pub mod types;
pub mod state_store;
pub mod mem_store;
pub mod log_sink;
pub mod traits;

// Re-export commonly used types at the crate root.
pub use error::{HostError, HostResult};
pub use types::ExecutionConfig;
pub use state_store::{StateStore, WriteBatch};
pub use mem_store::MemStore;
pub use log_sink::LogSink;
pub use traits::{HostApi, HostFunction};
