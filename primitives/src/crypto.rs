//! Cryptographic primitives exposed to contracts.
//!
//! - SHA-256 and Keccak-256 back the `sha256` / `keccak256` host functions
//! - BLAKE3 digests the committed state diff of a call
//!
//! All functions are pure and total over arbitrary-length input.

use crate::types::{to_hex, Hash};

/// Compute the SHA-256 digest of the input data.
pub fn sha256(data: &[u8]) -> Hash {
    use sha2::Digest;
    let result = sha2::Sha256::digest(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Compute the Keccak-256 digest of the input data.
///
/// This is the original Keccak padding (as used by Ethereum and NEAR), not
/// the NIST SHA3-256 variant.
pub fn keccak256(data: &[u8]) -> Hash {
    use sha3::Digest;
    let result = sha3::Keccak256::digest(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Compute the BLAKE3 digest of the input data.
pub fn hash_blake3(data: &[u8]) -> Hash {
    *blake3::hash(data).as_bytes()
}

/// SHA-256 rendered as 64 lowercase hex characters.
pub fn sha256_hex(data: &[u8]) -> String {
    to_hex(&sha256(data))
}

/// Keccak-256 rendered as 64 lowercase hex characters.
pub fn keccak256_hex(data: &[u8]) -> String {
    to_hex(&keccak256(data))
}
