//! The read-only query surface consumed by the dashboard layer.
//!
//! `QueryService` derives every view from the store without mutating
//! it.  Each response that exposes records also carries the verifier's
//! current `chain_integrity` flag — an incremental pass runs on every
//! read, which is O(new records) in steady state, and a detected break
//! is latched so it can never be silently hidden by later reads.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use scorechain_contracts::{
    band::ScoreBand,
    error::LedgerResult,
    record::{RangeQuery, RecordListing, MAX_SCORE},
    stats::{AggregateView, IdentityReputation},
};
use scorechain_core::traits::LedgerStore;
use scorechain_verify::ChainVerifier;

use crate::export::ExportIter;

/// Records copied from the store per batch during aggregate scans.
const SCAN_BATCH: usize = 256;

/// Identities at or below this score are flagged in reports.
const FLAG_THRESHOLD: u8 = 40;

/// Per-identity facts accumulated in one chain scan.
struct IdentityScan {
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    attacks: u64,
}

/// Read-only views over a shared ledger.
pub struct QueryService {
    store: Arc<dyn LedgerStore>,
    verifier: Arc<ChainVerifier>,
}

impl QueryService {
    pub fn new(store: Arc<dyn LedgerStore>, verifier: Arc<ChainVerifier>) -> Self {
        Self { store, verifier }
    }

    /// One page of records, newest-first, with the filtered total and
    /// the chain integrity flag.
    pub fn list_records(&self, query: &RangeQuery) -> LedgerResult<RecordListing> {
        let chain_integrity = self.verifier.verify_incremental(self.store.as_ref())?.ok;
        let (records, total) = self.store.get_range(query)?;
        debug!(
            skip = query.skip,
            limit = query.effective_limit(),
            identity = query.identity.as_deref().unwrap_or("*"),
            total,
            "record listing served"
        );
        Ok(RecordListing {
            records,
            total,
            skip: query.skip,
            limit: query.effective_limit(),
            chain_integrity,
        })
    }

    /// Aggregate dashboard view: band and attack-type distributions,
    /// worst `top_n` identities, chain integrity.
    ///
    /// One pass over current scores plus one batch scan over the chain.
    pub fn analytics(&self, top_n: usize) -> LedgerResult<AggregateView> {
        let chain_integrity = self.verifier.verify_incremental(self.store.as_ref())?.ok;
        let scores = self.store.identity_scores();

        let mut score_band_distribution: std::collections::BTreeMap<String, u64> = ScoreBand::ALL
            .iter()
            .map(|band| (band.label().to_string(), 0))
            .collect();
        for (_, score) in &scores {
            *score_band_distribution
                .entry(ScoreBand::from_score(*score).label().to_string())
                .or_default() += 1;
        }

        let (attack_type_distribution, per_identity) = self.scan_chain()?;

        let mut worst: Vec<&(String, u8)> =
            scores.iter().filter(|(_, score)| *score < MAX_SCORE).collect();
        worst.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let top_threats = worst
            .into_iter()
            .take(top_n)
            .filter_map(|(identity, score)| {
                per_identity
                    .get(identity)
                    .map(|scan| Self::reputation(identity, *score, scan))
            })
            .collect();

        Ok(AggregateView {
            total_identities: scores.len() as u64,
            total_records: self.store.record_count(),
            score_band_distribution,
            attack_type_distribution,
            top_threats,
            chain_integrity,
        })
    }

    /// Reputation summary for one identity, or `None` when it has no
    /// records.
    pub fn identity_report(&self, identity: &str) -> LedgerResult<Option<IdentityReputation>> {
        let Some(score) = self.store.current_score(identity) else {
            return Ok(None);
        };
        let (_, per_identity) = self.scan_chain()?;
        Ok(per_identity
            .get(identity)
            .map(|scan| Self::reputation(identity, score, scan)))
    }

    /// Lazy ascending export of the chain as of now, optionally
    /// filtered to one identity.
    pub fn export(&self, identity: Option<String>) -> ExportIter {
        ExportIter::new(self.store.clone(), identity)
    }

    /// Map a score to its band — re-exported so callers share the
    /// exact threshold contract the listings use.
    pub fn score_band(score: u8) -> ScoreBand {
        ScoreBand::from_score(score)
    }

    fn reputation(identity: &str, score: u8, scan: &IdentityScan) -> IdentityReputation {
        let band = ScoreBand::from_score(score);
        IdentityReputation {
            identity: identity.to_string(),
            score,
            band,
            color: band.color().to_string(),
            total_attacks: scan.attacks,
            first_seen: scan.first_seen,
            last_seen: scan.last_seen,
            flagged: score < FLAG_THRESHOLD,
        }
    }

    /// Single batched pass over the chain: attack-type counts plus
    /// per-identity first/last sighting and attack tallies.
    fn scan_chain(
        &self,
    ) -> LedgerResult<(
        std::collections::BTreeMap<String, u64>,
        HashMap<String, IdentityScan>,
    )> {
        let mut attack_types = std::collections::BTreeMap::new();
        let mut per_identity: HashMap<String, IdentityScan> = HashMap::new();

        let mut next = 0u64;
        loop {
            let batch = self.store.records_from(next, SCAN_BATCH)?;
            if batch.is_empty() {
                break;
            }
            next += batch.len() as u64;
            for record in &batch {
                *attack_types
                    .entry(record.attack_type.clone())
                    .or_default() += 1;
                per_identity
                    .entry(record.identity.clone())
                    .and_modify(|scan| {
                        scan.last_seen = record.timestamp;
                        scan.attacks += u64::from(record.malicious);
                    })
                    .or_insert_with(|| IdentityScan {
                        first_seen: record.timestamp,
                        last_seen: record.timestamp,
                        attacks: u64::from(record.malicious),
                    });
            }
        }

        Ok((attack_types, per_identity))
    }
}
