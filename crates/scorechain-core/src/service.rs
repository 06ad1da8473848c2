//! The ingest service: validate → score → append.
//!
//! `IngestService` is the single entry point the classification engine
//! calls after scoring an interaction.  Pipeline per event:
//!
//!   IngressValidator → read current score → ScorePolicy → LedgerStore::append
//!
//! The read-compute-append window is racy across workers by design: the
//! store detects a stale `old_score` and returns `ConcurrencyConflict`,
//! and this service re-reads and retries up to `MAX_APPEND_ATTEMPTS`
//! before surfacing `AppendFailed`.  The hash chain itself is never at
//! risk — the store serializes appends internally.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use scorechain_contracts::{
    error::{LedgerError, LedgerResult},
    event::{IngestRequest, ScoreEvent},
    record::LedgerRecord,
};

use crate::traits::{IngressValidator, LedgerStore, ScorePolicy};

/// How many times a conflicted append is retried before giving up.
pub const MAX_APPEND_ATTEMPTS: u32 = 5;

/// The pipeline that turns classification outcomes into chain records.
pub struct IngestService {
    store: Arc<dyn LedgerStore>,
    policy: Arc<dyn ScorePolicy>,
    validator: Arc<dyn IngressValidator>,
}

impl IngestService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        policy: Arc<dyn ScorePolicy>,
        validator: Arc<dyn IngressValidator>,
    ) -> Self {
        Self { store, policy, validator }
    }

    /// Submit a raw classification outcome as received from the engine.
    ///
    /// The payload is schema-validated before anything else runs;
    /// rejection leaves the ledger untouched.
    pub fn submit_raw(&self, raw: &serde_json::Value) -> LedgerResult<LedgerRecord> {
        let request = self.validator.validate(raw)?;
        self.submit(request)
    }

    /// Submit an already-validated request.
    ///
    /// Generates an event id when the caller supplied none, reads the
    /// identity's current score (policy default for a first sighting),
    /// applies the policy, and appends.  A `ConcurrencyConflict` from
    /// the store triggers a re-read and recompute; after
    /// `MAX_APPEND_ATTEMPTS` failed attempts the error surfaces as
    /// `AppendFailed`.
    pub fn submit(&self, request: IngestRequest) -> LedgerResult<LedgerRecord> {
        let event_id = request.event_id.unwrap_or_else(Uuid::new_v4);

        for attempt in 1..=MAX_APPEND_ATTEMPTS {
            let old_score = self
                .store
                .current_score(&request.identity)
                .unwrap_or_else(|| self.policy.default_score());
            let new_score =
                self.policy
                    .apply(old_score, &request.attack_type, request.malicious);

            let event = ScoreEvent {
                event_id,
                identity: request.identity.clone(),
                old_score,
                new_score,
                attack_type: request.attack_type.clone(),
                malicious: request.malicious,
            };

            match self.store.append(&event) {
                Ok(record) => {
                    info!(
                        sequence = record.sequence,
                        identity = %record.identity,
                        attack_type = %record.attack_type,
                        old_score,
                        new_score,
                        "event appended to score chain"
                    );
                    return Ok(record);
                }
                Err(LedgerError::ConcurrencyConflict { identity }) => {
                    debug!(
                        identity = %identity,
                        attempt,
                        "score moved during append, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            identity = %request.identity,
            attempts = MAX_APPEND_ATTEMPTS,
            "append retry budget exhausted"
        );
        Err(LedgerError::AppendFailed {
            reason: format!(
                "score for identity '{}' kept changing across {} attempts",
                request.identity, MAX_APPEND_ATTEMPTS
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use scorechain_contracts::record::RangeQuery;

    /// Fixed-behavior policy: malicious −10, benign +1, clamped 0–100.
    struct TestPolicy;

    impl ScorePolicy for TestPolicy {
        fn default_score(&self) -> u8 {
            100
        }

        fn apply(&self, current: u8, _attack_type: &str, malicious: bool) -> u8 {
            if malicious {
                current.saturating_sub(10)
            } else {
                (current + 1).min(100)
            }
        }
    }

    /// Pass-through validator for typed submissions.
    struct TestValidator;

    impl IngressValidator for TestValidator {
        fn validate(&self, raw: &serde_json::Value) -> LedgerResult<IngestRequest> {
            serde_json::from_value(raw.clone()).map_err(|e| LedgerError::SchemaValidation {
                reason: e.to_string(),
            })
        }
    }

    /// Store double that reports a moving score for the first
    /// `conflicts` appends, then accepts.
    struct ConflictingStore {
        conflicts: AtomicU32,
        records: Mutex<Vec<LedgerRecord>>,
    }

    impl ConflictingStore {
        fn new(conflicts: u32) -> Self {
            Self {
                conflicts: AtomicU32::new(conflicts),
                records: Mutex::new(Vec::new()),
            }
        }
    }

    impl LedgerStore for ConflictingStore {
        fn append(&self, event: &ScoreEvent) -> LedgerResult<LedgerRecord> {
            if self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                return Err(LedgerError::ConcurrencyConflict {
                    identity: event.identity.clone(),
                });
            }
            let mut records = self.records.lock().unwrap();
            let record = LedgerRecord {
                sequence: records.len() as u64,
                event_id: event.event_id,
                identity: event.identity.clone(),
                old_score: event.old_score,
                new_score: event.new_score,
                attack_type: event.attack_type.clone(),
                malicious: event.malicious,
                timestamp: chrono_now(),
                previous_hash: LedgerRecord::GENESIS_HASH.to_string(),
                hash: "ff".repeat(32),
            };
            records.push(record.clone());
            Ok(record)
        }

        fn get_range(&self, _query: &RangeQuery) -> LedgerResult<(Vec<LedgerRecord>, u64)> {
            let records = self.records.lock().unwrap();
            Ok((records.clone(), records.len() as u64))
        }

        fn records_from(&self, start: u64, max: usize) -> LedgerResult<Vec<LedgerRecord>> {
            let records = self.records.lock().unwrap();
            Ok(records
                .iter()
                .skip(start as usize)
                .take(max)
                .cloned()
                .collect())
        }

        fn tail_hash(&self) -> LedgerResult<String> {
            Ok(LedgerRecord::GENESIS_HASH.to_string())
        }

        fn record_count(&self) -> u64 {
            self.records.lock().unwrap().len() as u64
        }

        fn current_score(&self, identity: &str) -> Option<u8> {
            let records = self.records.lock().unwrap();
            records
                .iter()
                .rev()
                .find(|r| r.identity == identity)
                .map(|r| r.new_score)
        }

        fn identity_scores(&self) -> Vec<(String, u8)> {
            Vec::new()
        }
    }

    fn chrono_now() -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }

    fn service(conflicts: u32) -> (IngestService, Arc<ConflictingStore>) {
        let store = Arc::new(ConflictingStore::new(conflicts));
        let service = IngestService::new(
            store.clone(),
            Arc::new(TestPolicy),
            Arc::new(TestValidator),
        );
        (service, store)
    }

    fn request(identity: &str, malicious: bool) -> IngestRequest {
        IngestRequest {
            identity: identity.to_string(),
            attack_type: if malicious { "SQLI" } else { "BENIGN" }.to_string(),
            malicious,
            event_id: None,
        }
    }

    #[test]
    fn first_sighting_scores_from_policy_default() {
        let (service, _) = service(0);
        let record = service.submit(request("10.0.0.5", true)).unwrap();
        assert_eq!(record.old_score, 100);
        assert_eq!(record.new_score, 90);
    }

    #[test]
    fn subsequent_events_read_the_stored_score() {
        let (service, _) = service(0);
        service.submit(request("10.0.0.5", true)).unwrap();
        let second = service.submit(request("10.0.0.5", true)).unwrap();
        assert_eq!(second.old_score, 90);
        assert_eq!(second.new_score, 80);
    }

    #[test]
    fn conflicts_are_retried_transparently() {
        let (service, store) = service(MAX_APPEND_ATTEMPTS - 1);
        let record = service.submit(request("10.0.0.5", true)).unwrap();
        assert_eq!(record.sequence, 0);
        assert_eq!(store.record_count(), 1);
    }

    #[test]
    fn retry_budget_exhaustion_surfaces_as_append_failed() {
        let (service, store) = service(MAX_APPEND_ATTEMPTS);
        let err = service.submit(request("10.0.0.5", true)).unwrap_err();
        assert!(matches!(err, LedgerError::AppendFailed { .. }));
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn submit_raw_rejects_unparseable_payloads() {
        let (service, store) = service(0);
        let err = service
            .submit_raw(&serde_json::json!({ "identity": 42 }))
            .unwrap_err();
        assert!(matches!(err, LedgerError::SchemaValidation { .. }));
        assert_eq!(store.record_count(), 0);
    }

    #[test]
    fn caller_supplied_event_id_is_preserved() {
        let (service, _) = service(0);
        let id = Uuid::new_v4();
        let record = service
            .submit(IngestRequest {
                identity: "10.0.0.5".to_string(),
                attack_type: "XSS".to_string(),
                malicious: true,
                event_id: Some(id),
            })
            .unwrap();
        assert_eq!(record.event_id, id);
    }
}
