//! Inbound event types.
//!
//! `IngestRequest` is the shape the classification engine submits, after
//! JSON Schema validation but before scoring.  `ScoreEvent` is the fully
//! scored, ephemeral input to `LedgerStore::append` — the store copies
//! its fields into a `LedgerRecord` and discards it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A validated classification outcome, not yet scored.
///
/// Produced by the ingress validator from raw engine JSON.  `event_id`
/// is optional on the wire; the ingest service generates a v4 UUID when
/// the caller supplies none.  Callers that want resubmission after a
/// storage failure to be idempotent should supply their own id — the
/// store rejects a repeated id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    /// The tracked identity this outcome pertains to (e.g. an IP address).
    pub identity: String,
    /// Classification label (e.g. "SQLI", "XSS", "BENIGN").
    pub attack_type: String,
    /// Whether the classifier judged the interaction malicious.
    pub malicious: bool,
    /// Caller-supplied dedup id, if any.
    #[serde(default)]
    pub event_id: Option<Uuid>,
}

/// A fully scored event, ready to be appended.
///
/// `old_score` is the identity's score as read by the ingest service;
/// `new_score` is the policy's output.  The store checks `old_score`
/// against the identity's actual current score inside the append
/// critical section and rejects a stale read with
/// `LedgerError::ConcurrencyConflict`, so a torn read-compute-append
/// across workers can never record an inconsistent transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEvent {
    /// Unique id for this event, used for duplicate rejection.
    pub event_id: Uuid,
    /// The tracked identity.
    pub identity: String,
    /// Score before this event (0–100).
    pub old_score: u8,
    /// Score after this event (0–100).
    pub new_score: u8,
    /// Classification label copied from the triggering outcome.
    pub attack_type: String,
    /// Malicious flag copied from the triggering outcome.
    pub malicious: bool,
}
