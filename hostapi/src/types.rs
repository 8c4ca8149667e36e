//! Host-side configuration types.
//!
//! `ExecutionConfig` bundles the resource limits for a single call.

use keystone_primitives::{MAX_KEY_LEN, MAX_VALUE_LEN};
use serde::{Deserialize, Serialize};

/// Resource limits for a single call.
///
/// Key, value and write-byte limits fail the call when exceeded. Log
/// limits never do: excess lines are dropped and long lines truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Maximum length of a storage key in bytes.
    pub max_key_len: usize,
    /// Maximum length of a storage value in bytes.
    pub max_value_len: usize,
    /// Maximum bytes (keys + values) buffered by one call.
    pub max_write_bytes: u64,
    /// Maximum number of log lines kept per call.
    pub max_log_lines: u32,
    /// Maximum length of a single log line in bytes.
    pub max_log_line_len: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_key_len: MAX_KEY_LEN,
            max_value_len: MAX_VALUE_LEN,
            max_write_bytes: 4 * 1024 * 1024, // 4 MiB
            max_log_lines: 256,
            max_log_line_len: 1024,
        }
    }
}
