//! Core trait definitions for the scorechain pipeline.
//!
//! These three traits define the trust boundary:
//!
//! - `IngressValidator` — rejects malformed engine JSON before anything
//!   touches the ledger
//! - `ScorePolicy`      — pure score arithmetic (no I/O, no state)
//! - `LedgerStore`      — the only component allowed to mutate the chain
//!
//! The ingest service wires them together in that order.  A record is
//! structurally unreachable until validation and scoring have run.

use scorechain_contracts::{
    event::{IngestRequest, ScoreEvent},
    record::{LedgerRecord, RangeQuery},
    error::LedgerResult,
};

/// Validates raw classification-engine JSON at the ingress boundary.
///
/// Implementations are trusted and must be side-effect free.  A payload
/// that passes yields a typed `IngestRequest`; anything else is
/// rejected with `LedgerError::SchemaValidation` and never reaches the
/// scoring or storage layers.
pub trait IngressValidator: Send + Sync {
    /// Validate `raw` and extract the typed request.
    fn validate(&self, raw: &serde_json::Value) -> LedgerResult<IngestRequest>;
}

/// The scoring policy: pure arithmetic from (current score, outcome) to
/// the next score.
///
/// Implementations must be deterministic and must clamp their output to
/// the valid score range — the store rejects out-of-range scores.
pub trait ScorePolicy: Send + Sync {
    /// The score assigned to an identity that has never been seen.
    fn default_score(&self) -> u8;

    /// Compute the next score for an identity currently at `current`.
    fn apply(&self, current: u8, attack_type: &str, malicious: bool) -> u8;
}

/// The append-only, hash-chained record store.
///
/// Implementations own the chain tail exclusively: `append` performs
/// {read tail hash → compute hash → persist → advance tail} under a
/// single write lock, so two records can never claim the same
/// `previous_hash`.  Records are immutable once appended — the trait
/// deliberately has no update or delete operation.
pub trait LedgerStore: Send + Sync {
    /// Validate `event` and append it as the next record.
    ///
    /// # Errors
    ///
    /// - `Validation` — empty identity/attack type, score out of range,
    ///   or duplicate `event_id`; the ledger is untouched.
    /// - `ConcurrencyConflict` — `event.old_score` no longer matches the
    ///   identity's current score; the caller should re-read and retry.
    /// - `Storage` — the durable write failed; the record was not
    ///   committed and the whole event may be resubmitted.
    fn append(&self, event: &ScoreEvent) -> LedgerResult<LedgerRecord>;

    /// One page of records, newest-first, plus the filtered total.
    ///
    /// The total counts every record matching `query.identity`
    /// regardless of `skip`/`limit`.
    fn get_range(&self, query: &RangeQuery) -> LedgerResult<(Vec<LedgerRecord>, u64)>;

    /// Up to `max` records starting at `start_sequence`, ascending.
    ///
    /// This is the batch primitive behind verification and export: each
    /// call copies a bounded slice under the read lock and releases it,
    /// so long scans never block writers.
    fn records_from(&self, start_sequence: u64, max: usize) -> LedgerResult<Vec<LedgerRecord>>;

    /// Hash of the most recently appended record, or the genesis
    /// sentinel when the ledger is empty.
    fn tail_hash(&self) -> LedgerResult<String>;

    /// Number of records in the chain.
    fn record_count(&self) -> u64;

    /// The identity's current score (`new_score` of its latest record).
    fn current_score(&self, identity: &str) -> Option<u8>;

    /// Every tracked identity with its current score.
    fn identity_scores(&self) -> Vec<(String, u8)>;
}
