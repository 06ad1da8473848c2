//! # scorechain-contracts
//!
//! Shared types, boundary shapes, and the error taxonomy for the
//! scorechain ledger.
//!
//! All crates in the workspace import from here.  No business logic
//! lives in this crate — only data definitions and error types.

pub mod band;
pub mod error;
pub mod event;
pub mod record;
pub mod stats;
pub mod verify;

pub use band::ScoreBand;
pub use error::{LedgerError, LedgerResult};
pub use event::{IngestRequest, ScoreEvent};
pub use record::{
    LedgerRecord, RangeQuery, RecordListing, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MAX_SCORE,
};
pub use stats::{AggregateView, IdentityReputation};
pub use verify::{Checkpoint, VerificationResult};
