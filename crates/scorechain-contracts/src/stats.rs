//! Derived analytics views.
//!
//! Everything in this module is recomputed on demand from the ledger —
//! nothing here is persisted.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::band::ScoreBand;

/// The aggregate dashboard view over the whole ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateView {
    /// Distinct identities that have at least one record.
    pub total_identities: u64,
    /// Total records in the chain.
    pub total_records: u64,
    /// Identities per band, keyed by band label, over *current* scores.
    /// Always contains all five bands, zero counts included.
    pub score_band_distribution: BTreeMap<String, u64>,
    /// Record counts per attack-type label, over the whole chain.
    pub attack_type_distribution: BTreeMap<String, u64>,
    /// Worst identities by current score, ascending.
    pub top_threats: Vec<IdentityReputation>,
    /// The verifier's current view of the chain.
    pub chain_integrity: bool,
}

/// Per-identity reputation summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityReputation {
    pub identity: String,
    /// Current score: the `new_score` of the identity's latest record.
    pub score: u8,
    pub band: ScoreBand,
    /// Dashboard color hex for `band`.
    pub color: String,
    /// Records with `malicious == true` for this identity.
    pub total_attacks: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    /// True when the score has dropped below 40 (Suspicious boundary).
    pub flagged: bool,
}
