//! Incremental hash-chain verification.
//!
//! `ChainVerifier` walks the chain in ascending batches, recomputing
//! each record's hash from the expected previous hash.  Between passes
//! it remembers a `Checkpoint` — the last known-good `(sequence, hash)`
//! — so steady-state verification is O(new records), not O(chain).
//!
//! The verifier never takes the store's append lock for more than one
//! bounded batch copy at a time; records are immutable once appended,
//! so a concurrent writer can never change what a pass has already
//! inspected.  Records appended after a pass starts are left for the
//! next pass.

use std::sync::Mutex;

use tracing::{error, info};

use scorechain_contracts::{
    error::{LedgerError, LedgerResult},
    verify::{Checkpoint, VerificationResult},
};
use scorechain_core::traits::LedgerStore;
use scorechain_ledger::chain::record_matches;

/// Records copied from the store per batch during a scan.
const VERIFY_BATCH: usize = 256;

struct VerifierState {
    checkpoint: Checkpoint,
    /// Latched sequence of the first detected break.  Once set, every
    /// subsequent result reports `ok == false` — a broken chain is
    /// never silently forgotten.
    first_break: Option<u64>,
}

/// Resumable chain verifier with a latched failure state.
pub struct ChainVerifier {
    state: Mutex<VerifierState>,
}

impl ChainVerifier {
    /// A verifier that has verified nothing yet.
    pub fn new() -> Self {
        Self::with_checkpoint(Checkpoint::genesis())
    }

    /// Resume from a previously persisted checkpoint.
    pub fn with_checkpoint(checkpoint: Checkpoint) -> Self {
        Self {
            state: Mutex::new(VerifierState {
                checkpoint,
                first_break: None,
            }),
        }
    }

    /// The checkpoint the next incremental pass will resume from.
    pub fn checkpoint(&self) -> Checkpoint {
        self.lock().checkpoint.clone()
    }

    /// Verify only the suffix appended since the stored checkpoint.
    pub fn verify_incremental(&self, store: &dyn LedgerStore) -> LedgerResult<VerificationResult> {
        let mut state = self.lock();
        let start = state.checkpoint.clone();
        let result = Self::scan(store, start, state.first_break)?;
        Self::absorb(&mut state, &result);
        Ok(result)
    }

    /// Re-verify the whole chain from genesis.
    ///
    /// Clears the checkpoint and the latched break first, so the result
    /// reflects the chain as it stands — a full pass over an untampered
    /// chain reports `ok == true` even if an earlier in-memory latch
    /// was set against a different store.
    pub fn verify_full(&self, store: &dyn LedgerStore) -> LedgerResult<VerificationResult> {
        let mut state = self.lock();
        let result = Self::scan(store, Checkpoint::genesis(), None)?;
        state.first_break = None;
        Self::absorb(&mut state, &result);
        Ok(result)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VerifierState> {
        // Lock poisoning would mean a panic mid-scan; the state is a
        // plain checkpoint and safe to reuse.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn absorb(state: &mut VerifierState, result: &VerificationResult) {
        state.checkpoint = result.checkpoint.clone();
        if let Some(sequence) = result.first_break {
            state.first_break = Some(sequence);
        }
    }

    /// One verification pass over `[start.sequence, tail-at-entry)`.
    ///
    /// `latched` carries a break found by an earlier pass; it forces
    /// `ok == false` even when the newly scanned suffix is clean.
    fn scan(
        store: &dyn LedgerStore,
        start: Checkpoint,
        latched: Option<u64>,
    ) -> LedgerResult<VerificationResult> {
        // Snapshot the tail once: records appended during the scan are
        // left for the next pass, keeping the result self-consistent.
        let tail = store.record_count();

        let mut expected_previous = start.hash.clone();
        let mut next_sequence = start.sequence;
        let mut records_checked = 0u64;

        while next_sequence < tail {
            let remaining = (tail - next_sequence) as usize;
            let batch = store.records_from(next_sequence, remaining.min(VERIFY_BATCH))?;
            if batch.is_empty() {
                // The store shrank below the snapshot, which an
                // append-only log cannot legally do.
                return Err(LedgerError::Storage {
                    reason: format!(
                        "ledger ended at sequence {} but reported {} records",
                        next_sequence, tail
                    ),
                });
            }

            for record in &batch {
                if !record_matches(record, &expected_previous) {
                    error!(
                        sequence = record.sequence,
                        identity = %record.identity,
                        "hash chain break detected"
                    );
                    return Ok(VerificationResult {
                        ok: false,
                        first_break: Some(record.sequence),
                        records_checked,
                        // Checkpoint stays at the last good record so a
                        // later pass re-reports the same break.
                        checkpoint: Checkpoint {
                            sequence: next_sequence,
                            hash: expected_previous,
                        },
                    });
                }
                expected_previous = record.hash.clone();
                next_sequence += 1;
                records_checked += 1;
            }
        }

        if records_checked > 0 {
            info!(
                records_checked,
                through_sequence = next_sequence,
                "chain verification pass complete"
            );
        }

        Ok(VerificationResult {
            ok: latched.is_none(),
            first_break: latched,
            records_checked,
            checkpoint: Checkpoint {
                sequence: next_sequence,
                hash: expected_previous,
            },
        })
    }
}

impl Default for ChainVerifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    use scorechain_contracts::event::ScoreEvent;
    use scorechain_contracts::record::LedgerRecord;
    use scorechain_ledger::InMemoryLedger;

    fn event(identity: &str, old_score: u8, new_score: u8) -> ScoreEvent {
        ScoreEvent {
            event_id: Uuid::new_v4(),
            identity: identity.to_string(),
            old_score,
            new_score,
            attack_type: "SQLI".to_string(),
            malicious: true,
        }
    }

    fn populated_ledger(len: u8) -> InMemoryLedger {
        let ledger = InMemoryLedger::new();
        let mut score = 100u8;
        for _ in 0..len {
            let next = score.saturating_sub(1);
            ledger.append(&event("10.0.0.5", score, next)).unwrap();
            score = next;
        }
        ledger
    }

    fn tampered_copy(ledger: &InMemoryLedger, victim: usize) -> InMemoryLedger {
        let mut records = ledger.records_from(0, usize::MAX).unwrap();
        records[victim].new_score = records[victim].new_score.wrapping_add(1).min(100);
        InMemoryLedger::from_records(records).unwrap()
    }

    #[test]
    fn untampered_chain_verifies_ok() {
        let ledger = populated_ledger(10);
        let verifier = ChainVerifier::new();
        let result = verifier.verify_full(&ledger).unwrap();
        assert!(result.ok);
        assert_eq!(result.first_break, None);
        assert_eq!(result.records_checked, 10);
        assert_eq!(result.checkpoint.sequence, 10);
        assert_eq!(result.checkpoint.hash, ledger.tail_hash().unwrap());
    }

    #[test]
    fn empty_ledger_verifies_ok() {
        let ledger = InMemoryLedger::new();
        let verifier = ChainVerifier::new();
        let result = verifier.verify_full(&ledger).unwrap();
        assert!(result.ok);
        assert_eq!(result.records_checked, 0);
        assert_eq!(result.checkpoint.hash, LedgerRecord::GENESIS_HASH);
    }

    #[test]
    fn tamper_reports_the_first_break_and_stops() {
        let ledger = populated_ledger(10);
        let tampered = tampered_copy(&ledger, 4);
        let verifier = ChainVerifier::new();
        let result = verifier.verify_full(&tampered).unwrap();
        assert!(!result.ok);
        assert_eq!(result.first_break, Some(4));
        // The scan stopped at the break.
        assert_eq!(result.records_checked, 4);
    }

    #[test]
    fn genesis_tamper_reports_break_at_zero() {
        let ledger = populated_ledger(3);
        let tampered = tampered_copy(&ledger, 0);
        let verifier = ChainVerifier::new();
        let result = verifier.verify_full(&tampered).unwrap();
        assert!(!result.ok);
        assert_eq!(result.first_break, Some(0));
    }

    #[test]
    fn incremental_pass_only_scans_the_new_suffix() {
        let ledger = populated_ledger(5);
        let verifier = ChainVerifier::new();
        assert_eq!(
            verifier.verify_incremental(&ledger).unwrap().records_checked,
            5
        );

        // No new records: nothing to scan.
        let idle = verifier.verify_incremental(&ledger).unwrap();
        assert!(idle.ok);
        assert_eq!(idle.records_checked, 0);

        // Three more records: only those are scanned.
        let mut score = ledger.current_score("10.0.0.5").unwrap();
        for _ in 0..3 {
            let next = score - 1;
            ledger.append(&event("10.0.0.5", score, next)).unwrap();
            score = next;
        }
        let suffix = verifier.verify_incremental(&ledger).unwrap();
        assert!(suffix.ok);
        assert_eq!(suffix.records_checked, 3);
        assert_eq!(suffix.checkpoint.sequence, 8);
    }

    #[test]
    fn resuming_from_a_persisted_checkpoint_skips_the_prefix() {
        let ledger = populated_ledger(6);
        let first = ChainVerifier::new();
        let checkpoint = first.verify_incremental(&ledger).unwrap().checkpoint;

        let resumed = ChainVerifier::with_checkpoint(checkpoint);
        let result = resumed.verify_incremental(&ledger).unwrap();
        assert!(result.ok);
        assert_eq!(result.records_checked, 0);
    }

    #[test]
    fn a_detected_break_latches_across_incremental_passes() {
        let ledger = populated_ledger(6);
        let tampered = tampered_copy(&ledger, 2);
        let verifier = ChainVerifier::new();

        let first = verifier.verify_incremental(&tampered).unwrap();
        assert_eq!(first.first_break, Some(2));

        // The next pass re-detects the same break from the checkpoint.
        let second = verifier.verify_incremental(&tampered).unwrap();
        assert!(!second.ok);
        assert_eq!(second.first_break, Some(2));
    }

    #[test]
    fn tamper_after_a_checkpoint_is_still_caught() {
        let ledger = populated_ledger(4);
        let verifier = ChainVerifier::new();
        verifier.verify_incremental(&ledger).unwrap();

        // Extend the chain, then tamper inside the new suffix.
        let mut score = ledger.current_score("10.0.0.5").unwrap();
        for _ in 0..3 {
            let next = score - 1;
            ledger.append(&event("10.0.0.5", score, next)).unwrap();
            score = next;
        }
        let mut records = ledger.records_from(0, usize::MAX).unwrap();
        records[5].malicious = false;
        let tampered = InMemoryLedger::from_records(records).unwrap();

        let resumed = ChainVerifier::with_checkpoint(verifier.checkpoint());
        let result = resumed.verify_incremental(&tampered).unwrap();
        assert!(!result.ok);
        assert_eq!(result.first_break, Some(5));
    }
}
