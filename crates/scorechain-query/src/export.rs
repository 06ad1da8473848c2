//! Lazy bulk export over the chain.
//!
//! `ExportIter` walks the ledger in ascending chain order, copying one
//! bounded batch at a time — no lock is held between batches, so a
//! long-running download never blocks appends.  The end sequence is
//! snapshotted at creation: records appended while the export runs are
//! excluded, keeping the output a consistent prefix of the chain.
//!
//! Dropping the iterator cancels the export; `resume_from` continues a
//! cancelled one from any sequence.

use std::collections::VecDeque;
use std::sync::Arc;

use scorechain_contracts::{
    error::{LedgerError, LedgerResult},
    record::LedgerRecord,
};
use scorechain_core::traits::LedgerStore;

/// Records copied from the store per batch.
const EXPORT_BATCH: usize = 256;

/// Ascending, snapshot-bounded iterator over ledger records.
pub struct ExportIter {
    store: Arc<dyn LedgerStore>,
    identity: Option<String>,
    next_sequence: u64,
    /// Exclusive upper bound, fixed at creation.
    end_sequence: u64,
    buffer: VecDeque<LedgerRecord>,
    failed: bool,
}

impl ExportIter {
    /// Export the whole chain (optionally one identity) as of now.
    pub fn new(store: Arc<dyn LedgerStore>, identity: Option<String>) -> Self {
        Self::resume_from(store, identity, 0)
    }

    /// Resume an export from `start_sequence` (the cursor of a
    /// previously cancelled pass).
    pub fn resume_from(
        store: Arc<dyn LedgerStore>,
        identity: Option<String>,
        start_sequence: u64,
    ) -> Self {
        let end_sequence = store.record_count();
        Self {
            store,
            identity,
            next_sequence: start_sequence,
            end_sequence,
            buffer: VecDeque::new(),
            failed: false,
        }
    }

    /// The sequence the next batch would start from — persist this to
    /// resume after cancellation.
    pub fn cursor(&self) -> u64 {
        self.next_sequence
    }

    fn refill(&mut self) -> LedgerResult<()> {
        while self.buffer.is_empty() && self.next_sequence < self.end_sequence {
            let want = (self.end_sequence - self.next_sequence) as usize;
            let batch = self
                .store
                .records_from(self.next_sequence, want.min(EXPORT_BATCH))?;
            if batch.is_empty() {
                return Err(LedgerError::Storage {
                    reason: format!(
                        "ledger ended at sequence {} during export to {}",
                        self.next_sequence, self.end_sequence
                    ),
                });
            }
            self.next_sequence += batch.len() as u64;
            match &self.identity {
                Some(identity) => self
                    .buffer
                    .extend(batch.into_iter().filter(|r| &r.identity == identity)),
                None => self.buffer.extend(batch),
            }
        }
        Ok(())
    }
}

impl Iterator for ExportIter {
    type Item = LedgerResult<LedgerRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        if self.buffer.is_empty() {
            if let Err(e) = self.refill() {
                self.failed = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}
