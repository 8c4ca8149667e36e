//! Canonical binary encoding of call outcomes.
//!
//! Independent re-executions of the same call must agree byte for byte,
//! so the storage diff and the consensus-relevant part of a call result
//! have one canonical encoding each. Their BLAKE3 digests are what nodes
//! compare.
//!
//! Encoding format (all integers little-endian):
//! - Variable-length fields are length-prefixed (u32)
//! - A diff is `[count u32]` then one entry per touched key in ascending
//!   key order: `[tag u8: 1=write, 0=removal][key][value if write]`
//! - A call outcome is `[status u8][optional return value][error code i32][diff]`
//!
//! Logs are diagnostic only and never part of the outcome encoding.

use std::collections::{BTreeMap, BTreeSet};

use crate::crypto::hash_blake3;
use crate::error::DecodeError;
use crate::execution::{CallResult, CallStatus};
use crate::state::StateDiff;
use crate::types::{u32_from_le_bytes, u32_to_le_bytes, Hash};

const TAG_REMOVAL: u8 = 0;
const TAG_WRITE: u8 = 1;

/// A cursor for reading bytes during decoding.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if n > self.remaining() {
            return Err(DecodeError("unexpected end of data".into()));
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let bytes = self.read_bytes(1)?;
        Ok(bytes[0])
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        u32_from_le_bytes(self.read_bytes(4)?)
            .ok_or_else(|| DecodeError("unexpected end of data".into()))
    }

    fn read_var_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_u32()? as usize;
        Ok(self.read_bytes(len)?.to_vec())
    }
}

// ── Encoding helpers ──

fn write_u8(buf: &mut Vec<u8>, v: u8) {
    buf.push(v);
}

fn write_u32(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&u32_to_le_bytes(v));
}

fn write_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

fn write_var_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    write_u32(buf, data.len() as u32);
    buf.extend_from_slice(data);
}

// ── StateDiff encoding ──

/// Encode a `StateDiff` to canonical bytes.
///
/// Writes and removals are merged into one key-ordered sequence; a diff
/// never holds the same key in both sets.
pub fn encode_state_diff(diff: &StateDiff) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64);
    write_state_diff(&mut buf, diff);
    buf
}

fn write_state_diff(buf: &mut Vec<u8>, diff: &StateDiff) {
    write_u32(buf, diff.len() as u32);

    let mut writes = diff.writes.iter().peekable();
    let mut removals = diff.removals.iter().peekable();
    loop {
        let take_write = match (writes.peek(), removals.peek()) {
            (Some((wk, _)), Some(rk)) => wk.as_slice() < rk.as_slice(),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        if take_write {
            if let Some((key, value)) = writes.next() {
                write_u8(buf, TAG_WRITE);
                write_var_bytes(buf, key);
                write_var_bytes(buf, value);
            }
        } else if let Some(key) = removals.next() {
            write_u8(buf, TAG_REMOVAL);
            write_var_bytes(buf, key);
        }
    }
}

/// Decode a `StateDiff`, rejecting anything that is not canonical.
pub fn decode_state_diff(data: &[u8]) -> Result<StateDiff, DecodeError> {
    let mut r = Reader::new(data);
    let diff = read_state_diff(&mut r)?;
    if r.remaining() != 0 {
        return Err(DecodeError("trailing bytes after diff".into()));
    }
    Ok(diff)
}

fn read_state_diff(r: &mut Reader<'_>) -> Result<StateDiff, DecodeError> {
    let count = r.read_u32()? as usize;
    let mut writes = BTreeMap::new();
    let mut removals = BTreeSet::new();
    let mut last_key: Option<Vec<u8>> = None;

    for _ in 0..count {
        let tag = r.read_u8()?;
        let key = r.read_var_bytes()?;
        if let Some(prev) = &last_key {
            if key <= *prev {
                return Err(DecodeError("diff keys not strictly ascending".into()));
            }
        }
        last_key = Some(key.clone());
        match tag {
            TAG_WRITE => {
                let value = r.read_var_bytes()?;
                writes.insert(key, value);
            }
            TAG_REMOVAL => {
                removals.insert(key);
            }
            other => {
                return Err(DecodeError(format!("invalid diff entry tag {}", other)));
            }
        }
    }

    Ok(StateDiff { writes, removals })
}

/// BLAKE3 digest of the canonical diff encoding.
pub fn diff_digest(diff: &StateDiff) -> Hash {
    hash_blake3(&encode_state_diff(diff))
}

// ── Call outcome encoding ──

/// Encode the consensus-relevant part of a `CallResult`.
pub fn encode_call_outcome(result: &CallResult) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64);
    write_u8(
        &mut buf,
        match result.status {
            CallStatus::Completed => 0,
            CallStatus::Failed => 1,
        },
    );
    match &result.return_value {
        None => write_u8(&mut buf, 0),
        Some(value) => {
            write_u8(&mut buf, 1);
            write_var_bytes(&mut buf, value);
        }
    }
    write_i32(&mut buf, result.error_code().as_i32());
    write_state_diff(&mut buf, &result.diff);
    buf
}

/// BLAKE3 digest of the canonical call outcome encoding.
pub fn outcome_digest(result: &CallResult) -> Hash {
    hash_blake3(&encode_call_outcome(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::execution::CallFailure;

    fn sample_diff() -> StateDiff {
        let mut diff = StateDiff::new();
        diff.writes.insert(b"count".to_vec(), b"1".to_vec());
        diff.writes.insert(b"a".to_vec(), Vec::new());
        diff.removals.insert(b"mykey".to_vec());
        diff
    }

    #[test]
    fn test_diff_roundtrip() {
        let diff = sample_diff();
        let encoded = encode_state_diff(&diff);
        let decoded = decode_state_diff(&encoded).unwrap();
        assert_eq!(decoded, diff);
    }

    #[test]
    fn test_diff_entries_interleaved_by_key() {
        let encoded = encode_state_diff(&sample_diff());
        // count = 3
        assert_eq!(&encoded[..4], &[3, 0, 0, 0]);
        // first entry is the write of "a" (empty value)
        assert_eq!(encoded[4], TAG_WRITE);
        assert_eq!(&encoded[5..9], &[1, 0, 0, 0]);
        assert_eq!(encoded[9], b'a');
        assert_eq!(&encoded[10..14], &[0, 0, 0, 0]);
        // second entry is the write of "count"
        assert_eq!(encoded[14], TAG_WRITE);
        // last entry is the removal of "mykey"
        let tail = &encoded[encoded.len() - 10..];
        assert_eq!(tail[0], TAG_REMOVAL);
        assert_eq!(&tail[5..], b"mykey");
    }

    #[test]
    fn test_empty_diff_encoding() {
        assert_eq!(encode_state_diff(&StateDiff::new()), vec![0, 0, 0, 0]);
        assert_eq!(diff_digest(&StateDiff::new()), hash_blake3(&[0, 0, 0, 0]));
    }

    #[test]
    fn test_count_prefix_is_little_endian() {
        let encoded = encode_state_diff(&sample_diff());
        assert_eq!(u32_from_le_bytes(&encoded[..4]), Some(sample_diff().len() as u32));
        assert!(decode_state_diff(&encoded[..3]).is_err());
    }

    #[test]
    fn test_decode_rejects_unsorted_keys() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 2);
        write_u8(&mut buf, TAG_REMOVAL);
        write_var_bytes(&mut buf, b"b");
        write_u8(&mut buf, TAG_REMOVAL);
        write_var_bytes(&mut buf, b"a");
        assert!(decode_state_diff(&buf).is_err());
    }

    #[test]
    fn test_decode_rejects_bad_tag() {
        let mut buf = Vec::new();
        write_u32(&mut buf, 1);
        write_u8(&mut buf, 7);
        write_var_bytes(&mut buf, b"a");
        assert!(decode_state_diff(&buf).is_err());
    }

    #[test]
    fn test_decode_rejects_truncated_and_trailing() {
        let encoded = encode_state_diff(&sample_diff());
        assert!(decode_state_diff(&encoded[..encoded.len() - 1]).is_err());

        let mut trailing = encoded.clone();
        trailing.push(0);
        assert!(decode_state_diff(&trailing).is_err());
    }

    #[test]
    fn test_diff_digest_sensitive_to_values() {
        let a = sample_diff();
        let mut b = sample_diff();
        b.writes.insert(b"count".to_vec(), b"2".to_vec());
        assert_ne!(diff_digest(&a), diff_digest(&b));
        assert_eq!(diff_digest(&a), diff_digest(&sample_diff()));
    }

    #[test]
    fn test_outcome_ignores_logs() {
        let diff = sample_diff();
        let digest = diff_digest(&diff);
        let quiet = CallResult::completed(Some(b"1".to_vec()), Vec::new(), true, diff.clone(), digest);
        let chatty = CallResult::completed(
            Some(b"1".to_vec()),
            vec!["LOG: hi".into()],
            true,
            diff,
            digest,
        );
        assert_eq!(outcome_digest(&quiet), outcome_digest(&chatty));
    }

    #[test]
    fn test_outcome_distinguishes_failure_codes() {
        let empty = diff_digest(&StateDiff::new());
        let dup = CallResult::failed(CallFailure::new(ErrorCode::DuplicateReturn, "x"), Vec::new(), empty);
        let conflict = CallResult::failed(
            CallFailure::new(ErrorCode::StorageCommitConflict, "x"),
            Vec::new(),
            empty,
        );
        assert_ne!(outcome_digest(&dup), outcome_digest(&conflict));
    }

    #[test]
    fn test_outcome_distinguishes_absent_and_empty_return() {
        let empty = diff_digest(&StateDiff::new());
        let absent = CallResult::completed(None, Vec::new(), true, StateDiff::new(), empty);
        let blank = CallResult::completed(Some(Vec::new()), Vec::new(), true, StateDiff::new(), empty);
        assert_ne!(encode_call_outcome(&absent), encode_call_outcome(&blank));
    }
}
