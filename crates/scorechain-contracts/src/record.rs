//! Persisted ledger records and paging shapes.
//!
//! `LedgerRecord` is one entry in the hash chain — immutable once
//! appended, never updated or deleted.  `RangeQuery`/`RecordListing`
//! are the paging contract consumed by the dashboard layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound of the reputation score range.  Scores above this are
/// rejected at the codec boundary before anything is hashed.
pub const MAX_SCORE: u8 = 100;

/// Largest page a single `get_range` call will return.
pub const MAX_PAGE_SIZE: u64 = 1000;

/// Page size used when a query asks for `limit == 0`.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// A single entry in the SHA-256 hash chain.
///
/// Each record commits to its predecessor via `previous_hash`, forming
/// an append-only chain over the *global* append order (all identities
/// interleaved).  Modifying any field invalidates `hash` and every
/// subsequent `previous_hash`, which the verifier detects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Dense position in the chain, starting at 0, assigned by the store.
    pub sequence: u64,

    /// The event that produced this record, used for duplicate rejection.
    pub event_id: Uuid,

    /// The tracked identity this record pertains to.
    pub identity: String,

    /// Score before the event (0–100).
    pub old_score: u8,

    /// Score after the event (0–100).
    pub new_score: u8,

    /// Classification label from the triggering event.
    pub attack_type: String,

    /// Whether the triggering event was judged malicious.
    pub malicious: bool,

    /// Append time (UTC), assigned by the store, millisecond precision,
    /// non-decreasing in append order.
    pub timestamp: DateTime<Utc>,

    /// SHA-256 hash (hex) of the previous record, or `GENESIS_HASH` for
    /// sequence 0.
    pub previous_hash: String,

    /// SHA-256 hash (hex) over `previous_hash` and this record's
    /// canonical encoding.
    pub hash: String,
}

impl LedgerRecord {
    /// The sentinel `previous_hash` of the first record in the chain.
    ///
    /// 64 hex zeros — a value that can never be the SHA-256 of real
    /// data, making genesis detection unambiguous.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// Parameters for a paged read over the ledger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeQuery {
    /// Records to skip from the newest end.
    pub skip: u64,
    /// Page size; 0 means `DEFAULT_PAGE_SIZE`, values above
    /// `MAX_PAGE_SIZE` are clamped.
    pub limit: u64,
    /// Restrict the page (and its total) to one identity, exact match.
    pub identity: Option<String>,
}

impl RangeQuery {
    /// The page size after applying the default and the clamp.
    pub fn effective_limit(&self) -> u64 {
        match self.limit {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        }
    }
}

/// One page of records, newest-first, plus the filtered total.
///
/// `total` counts every record matching the identity filter regardless
/// of `skip`/`limit`, so pagination UIs can size themselves.
/// `chain_integrity` is the verifier's current view and goes false —
/// and stays false — the moment tampering is detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListing {
    pub records: Vec<LedgerRecord>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub chain_integrity: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_limit_defaults_when_zero() {
        let q = RangeQuery { skip: 0, limit: 0, identity: None };
        assert_eq!(q.effective_limit(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn effective_limit_clamps_large_values() {
        let q = RangeQuery { skip: 0, limit: 1_000_000, identity: None };
        assert_eq!(q.effective_limit(), MAX_PAGE_SIZE);
    }

    #[test]
    fn effective_limit_passes_through_in_range() {
        let q = RangeQuery { skip: 5, limit: 25, identity: None };
        assert_eq!(q.effective_limit(), 25);
    }

    #[test]
    fn genesis_hash_is_64_hex_zeros() {
        assert_eq!(LedgerRecord::GENESIS_HASH.len(), 64);
        assert!(LedgerRecord::GENESIS_HASH.chars().all(|c| c == '0'));
    }
}
