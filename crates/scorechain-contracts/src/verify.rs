//! Verification results and checkpoints.

use serde::{Deserialize, Serialize};

use crate::record::LedgerRecord;

/// A saved `(sequence, hash)` pair marking the last verified prefix.
///
/// `sequence` is the *next* record to verify; `hash` is the hash of the
/// record before it (genesis sentinel when nothing has been verified).
/// Persisting a checkpoint lets verification resume after restart
/// without rescanning the whole chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub sequence: u64,
    pub hash: String,
}

impl Checkpoint {
    /// The starting checkpoint: verify from record 0, expecting the
    /// genesis sentinel as the previous hash.
    pub fn genesis() -> Self {
        Self {
            sequence: 0,
            hash: LedgerRecord::GENESIS_HASH.to_string(),
        }
    }
}

impl Default for Checkpoint {
    fn default() -> Self {
        Self::genesis()
    }
}

/// Outcome of a verification pass.
///
/// A broken chain is a *result*, not an error: `ok == false` with
/// `first_break` pinpointing the first offending sequence.  The scan
/// stops there — everything after the break is unverifiable anyway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    /// True when every scanned record re-hashed to its stored value.
    pub ok: bool,
    /// Sequence of the first record that failed, if any.
    pub first_break: Option<u64>,
    /// Records examined in this pass (0 for an already-current checkpoint).
    pub records_checked: u64,
    /// Where the next incremental pass will resume.
    pub checkpoint: Checkpoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_checkpoint_points_at_record_zero() {
        let cp = Checkpoint::genesis();
        assert_eq!(cp.sequence, 0);
        assert_eq!(cp.hash, LedgerRecord::GENESIS_HASH);
    }

    #[test]
    fn checkpoint_round_trips_through_json() {
        let cp = Checkpoint { sequence: 42, hash: "ab".repeat(32) };
        let json = serde_json::to_string(&cp).unwrap();
        let back: Checkpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cp);
    }
}
