//! Core type aliases and constants for Keystone calls.
//!
//! These types are shared by the host API, the runtime and the test fixtures.

use core::fmt;

use serde::{Deserialize, Serialize};

/// 32-byte digest produced by the crypto primitives.
pub type Hash = [u8; 32];

/// Block height (monotonically increasing).
pub type BlockHeight = u64;

/// Block timestamp in nanoseconds.
pub type Timestamp = u64;

/// Default maximum key length in the key-value store.
pub const MAX_KEY_LEN: usize = 256;

/// Default maximum value length in the key-value store.
pub const MAX_VALUE_LEN: usize = 65_536; // 64 KiB

/// Account identifier (e.g. `counter.testnet`).
///
/// Identifiers are opaque to the runtime: no normalization or validation
/// is applied, the string is handed to contracts exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Wrap an account identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for AccountId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Render bytes as lowercase hex, two characters per byte, no prefix.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use core::fmt::Write;
        let _ = write!(s, "{:02x}", byte);
    }
    s
}

/// Encode a u32 as little-endian bytes.
pub fn u32_to_le_bytes(v: u32) -> [u8; 4] {
    v.to_le_bytes()
}

/// Decode a u32 from little-endian bytes.
pub fn u32_from_le_bytes(bytes: &[u8]) -> Option<u32> {
    let buf: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    Some(u32::from_le_bytes(buf))
}
