//! In-memory implementation of `LedgerStore`.
//!
//! `InMemoryLedger` keeps the whole chain in a `Vec` behind an
//! `RwLock`: appends take the write lock (strict single-writer over
//! {read tail → hash → commit → advance tail}), while reads take the
//! read lock just long enough to copy a bounded batch.  The file-backed
//! store wraps this type and injects its durable write into the same
//! critical section.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use chrono::TimeZone;
use tracing::debug;
use uuid::Uuid;

use scorechain_contracts::{
    error::{LedgerError, LedgerResult},
    event::ScoreEvent,
    record::{LedgerRecord, RangeQuery},
};
use scorechain_core::traits::LedgerStore;

use crate::chain::link_hash;
use crate::codec;

// ── Internal mutable state ────────────────────────────────────────────────────

/// The mutable interior of an `InMemoryLedger`.
#[derive(Debug)]
struct LedgerState {
    /// All records, in append order; `records[i].sequence == i`.
    records: Vec<LedgerRecord>,

    /// Sequences per identity, ascending — the secondary index behind
    /// filtered queries.
    by_identity: HashMap<String, Vec<u64>>,

    /// Latest `new_score` per identity.
    current_scores: HashMap<String, u8>,

    /// Every event id ever appended, for duplicate rejection.
    seen_event_ids: HashSet<Uuid>,

    /// Hash of the last record, or the genesis sentinel when empty.
    last_hash: String,

    /// Timestamp (ms) of the last record, for per-append monotonicity.
    last_timestamp_ms: i64,
}

impl LedgerState {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            by_identity: HashMap::new(),
            current_scores: HashMap::new(),
            seen_event_ids: HashSet::new(),
            last_hash: LedgerRecord::GENESIS_HASH.to_string(),
            last_timestamp_ms: 0,
        }
    }

    /// Index one record into the secondary structures.
    fn index(&mut self, record: &LedgerRecord) {
        self.by_identity
            .entry(record.identity.clone())
            .or_default()
            .push(record.sequence);
        self.current_scores
            .insert(record.identity.clone(), record.new_score);
        self.seen_event_ids.insert(record.event_id);
        self.last_hash = record.hash.clone();
        self.last_timestamp_ms = record.timestamp.timestamp_millis();
    }
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An in-memory, append-only ledger backed by a SHA-256 hash chain.
///
/// # Thread safety
///
/// All trait methods synchronize internally; share the store across
/// request workers behind an `Arc`.
#[derive(Debug)]
pub struct InMemoryLedger {
    state: RwLock<LedgerState>,
}

impl InMemoryLedger {
    /// Create an empty ledger whose first append links to the genesis
    /// sentinel.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::empty()),
        }
    }

    /// Rebuild a ledger from an existing chain of records.
    ///
    /// Requires a dense sequence starting at 0 and rebuilds every
    /// index from the records as given.  Hashes are **not** checked —
    /// replay must be able to load a tampered chain so the verifier can
    /// report exactly where it breaks.
    pub fn from_records(records: Vec<LedgerRecord>) -> LedgerResult<Self> {
        let mut state = LedgerState::empty();
        for (position, record) in records.iter().enumerate() {
            if record.sequence != position as u64 {
                return Err(LedgerError::Validation {
                    reason: format!(
                        "non-dense chain: expected sequence {} at position {}, found {}",
                        position, position, record.sequence
                    ),
                });
            }
            state.index(record);
        }
        state.records = records;
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Append `event`, running `commit` on the fully built record inside
    /// the critical section, before any in-memory state advances.
    ///
    /// `commit` is the durable-write hook: if it fails, the in-memory
    /// chain is untouched and the error propagates — the record is
    /// either fully durable or absent.
    pub(crate) fn append_with_commit(
        &self,
        event: &ScoreEvent,
        commit: impl FnOnce(&LedgerRecord) -> LedgerResult<()>,
    ) -> LedgerResult<LedgerRecord> {
        let mut state = self.state.write().map_err(|e| LedgerError::AppendFailed {
            reason: format!("ledger lock poisoned: {}", e),
        })?;

        if state.seen_event_ids.contains(&event.event_id) {
            return Err(LedgerError::Validation {
                reason: format!("duplicate event id {}", event.event_id),
            });
        }

        // Optimistic score check: the event's old_score must still be the
        // identity's current score.  A first sighting accepts whatever
        // baseline the caller read from the policy.
        if let Some(&current) = state.current_scores.get(&event.identity) {
            if current != event.old_score {
                return Err(LedgerError::ConcurrencyConflict {
                    identity: event.identity.clone(),
                });
            }
        }

        // Store-assigned timestamp: wall clock, clamped so append order
        // and timestamp order never disagree.
        let now_ms = chrono::Utc::now()
            .timestamp_millis()
            .max(state.last_timestamp_ms);
        let timestamp = chrono::Utc
            .timestamp_millis_opt(now_ms)
            .single()
            .ok_or_else(|| LedgerError::AppendFailed {
                reason: format!("timestamp {} ms out of range", now_ms),
            })?;

        let mut record = LedgerRecord {
            sequence: state.records.len() as u64,
            event_id: event.event_id,
            identity: event.identity.clone(),
            old_score: event.old_score,
            new_score: event.new_score,
            attack_type: event.attack_type.clone(),
            malicious: event.malicious,
            timestamp,
            previous_hash: state.last_hash.clone(),
            hash: String::new(),
        };

        // encode_record also validates the event's field contract.
        let payload = codec::encode_record(&record)?;
        record.hash = link_hash(&record.previous_hash, &payload);

        commit(&record)?;

        state.index(&record);
        state.records.push(record.clone());

        debug!(
            sequence = record.sequence,
            identity = %record.identity,
            hash = %record.hash,
            "record appended"
        );

        Ok(record)
    }

    fn read(&self) -> LedgerResult<std::sync::RwLockReadGuard<'_, LedgerState>> {
        self.state.read().map_err(|e| LedgerError::Storage {
            reason: format!("ledger lock poisoned: {}", e),
        })
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedger {
    fn append(&self, event: &ScoreEvent) -> LedgerResult<LedgerRecord> {
        self.append_with_commit(event, |_| Ok(()))
    }

    /// One page, newest-first, plus the filtered total.
    fn get_range(&self, query: &RangeQuery) -> LedgerResult<(Vec<LedgerRecord>, u64)> {
        let state = self.read()?;
        let skip = query.skip as usize;
        let limit = query.effective_limit() as usize;

        match &query.identity {
            Some(identity) => {
                let sequences = state
                    .by_identity
                    .get(identity)
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let page = sequences
                    .iter()
                    .rev()
                    .skip(skip)
                    .take(limit)
                    .map(|&seq| state.records[seq as usize].clone())
                    .collect();
                Ok((page, sequences.len() as u64))
            }
            None => {
                let page = state
                    .records
                    .iter()
                    .rev()
                    .skip(skip)
                    .take(limit)
                    .cloned()
                    .collect();
                Ok((page, state.records.len() as u64))
            }
        }
    }

    fn records_from(&self, start_sequence: u64, max: usize) -> LedgerResult<Vec<LedgerRecord>> {
        let state = self.read()?;
        let start = (start_sequence as usize).min(state.records.len());
        Ok(state.records[start..]
            .iter()
            .take(max)
            .cloned()
            .collect())
    }

    fn tail_hash(&self) -> LedgerResult<String> {
        Ok(self.read()?.last_hash.clone())
    }

    fn record_count(&self) -> u64 {
        self.read().map(|s| s.records.len() as u64).unwrap_or(0)
    }

    fn current_score(&self, identity: &str) -> Option<u8> {
        self.read()
            .ok()
            .and_then(|s| s.current_scores.get(identity).copied())
    }

    fn identity_scores(&self) -> Vec<(String, u8)> {
        self.read()
            .map(|s| {
                s.current_scores
                    .iter()
                    .map(|(identity, &score)| (identity.clone(), score))
                    .collect()
            })
            .unwrap_or_default()
    }
}
