//! Hash-chain primitives: linking and per-record verification.
//!
//! Every record's hash commits to the previous record's hash and to its
//! own canonical encoding:
//!
//!   hash = hex(SHA-256(previous_hash as UTF-8 ‖ canonical bytes))
//!
//! The previous hash is fed in as its 64 ASCII hex characters, exactly
//! as stored, so the stored chain and the recomputed chain can never
//! diverge over an encoding detail.

use sha2::{Digest, Sha256};

use scorechain_contracts::record::LedgerRecord;

use crate::codec;

/// Compute the hash binding `payload` to its predecessor.
///
/// `previous_hash` is the stored 64-char hex hash of the preceding
/// record, or `LedgerRecord::GENESIS_HASH` for the first record.
/// Returns a lowercase 64-character hex string.
pub fn link_hash(previous_hash: &str, payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(previous_hash.as_bytes());
    hasher.update(payload);
    hex::encode(hasher.finalize())
}

/// Check one record against the chain position it claims.
///
/// Returns `true` only when both rules hold:
///
/// 1. **Prev-hash linkage** — `record.previous_hash` equals
///    `expected_previous`.
/// 2. **Hash correctness** — `record.hash` matches the value recomputed
///    from the record's own fields.
///
/// A record tampered into an unencodable state (emptied identity,
/// out-of-range score) fails rule 2.
pub fn record_matches(record: &LedgerRecord, expected_previous: &str) -> bool {
    if record.previous_hash != expected_previous {
        return false;
    }
    match codec::encode_record(record) {
        Ok(payload) => link_hash(&record.previous_hash, &payload) == record.hash,
        Err(_) => false,
    }
}

/// Verify a slice of consecutive records starting from
/// `expected_previous`.
///
/// Returns the sequence of the first offending record, or `None` when
/// the whole slice is valid.  An empty slice is valid.
pub fn first_break(records: &[LedgerRecord], expected_previous: &str) -> Option<u64> {
    let mut expected = expected_previous.to_string();
    for record in records {
        if !record_matches(record, &expected) {
            return Some(record.sequence);
        }
        expected = record.hash.clone();
    }
    None
}
