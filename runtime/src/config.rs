//! Runtime configuration.

use std::path::Path;

use keystone_hostapi::ExecutionConfig;
use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// Configuration for the call runtime.
///
/// Loadable from TOML; every field is optional there and falls back to the
/// default:
///
/// ```toml
/// validate_reads = true
/// mirror_contract_logs = false
///
/// [execution]
/// max_key_len = 256
/// max_write_bytes = 4194304
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Per-call resource limits.
    pub execution: ExecutionConfig,

    /// Send the call's read set with each commit so the backing store can
    /// reject commits based on stale reads.
    pub validate_reads: bool,

    /// Also emit contract log messages through `tracing` at debug level.
    pub mirror_contract_logs: bool,

    /// Turn a panicking contract body into a failed call instead of
    /// unwinding into the caller.
    pub catch_panics: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            execution: ExecutionConfig::default(),
            validate_reads: true,
            mirror_contract_logs: false,
            catch_panics: true,
        }
    }
}

impl RuntimeConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self, RuntimeError> {
        toml::from_str(s).map_err(|e| RuntimeError::Config(e.to_string()))
    }

    /// Read and parse a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn with_execution(mut self, execution: ExecutionConfig) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_validate_reads(mut self, enabled: bool) -> Self {
        self.validate_reads = enabled;
        self
    }

    pub fn with_mirror_contract_logs(mut self, enabled: bool) -> Self {
        self.mirror_contract_logs = enabled;
        self
    }

    pub fn with_catch_panics(mut self, enabled: bool) -> Self {
        self.catch_panics = enabled;
        self
    }
}
