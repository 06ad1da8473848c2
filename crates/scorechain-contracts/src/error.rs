//! Error taxonomy for the scorechain ledger.
//!
//! All fallible operations across the workspace return `LedgerResult<T>`.
//! Note what is deliberately *absent*: a broken hash chain is never an
//! error.  Tampering is a detected fact about historical data, reported
//! through `VerificationResult`, not an operational fault raised here.

use thiserror::Error;

/// The unified error type for the scorechain ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A malformed event was rejected before touching the chain
    /// (missing identity, score out of range, duplicate event id).
    /// Rejection has no side effects on the ledger.
    #[error("validation failed: {reason}")]
    Validation { reason: String },

    /// Another writer advanced the identity's score between the caller's
    /// read and this append.  Internal: the ingest service retries this
    /// transparently and surfaces `AppendFailed` only after the retry
    /// budget is exhausted.
    #[error("concurrent score update for identity '{identity}'")]
    ConcurrencyConflict { identity: String },

    /// The append could not be completed after bounded retries.
    #[error("append failed: {reason}")]
    AppendFailed { reason: String },

    /// The durable log could not be written or replayed.  Appends are
    /// atomic: on this error the record was not committed and the caller
    /// may resubmit the whole event.
    #[error("storage failure: {reason}")]
    Storage { reason: String },

    /// A configuration file (scoring policy, checkpoint) is missing or
    /// malformed.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// An inbound classification event failed JSON Schema validation at
    /// the ingress boundary.
    #[error("event schema validation failed: {reason}")]
    SchemaValidation { reason: String },
}

/// Convenience alias used throughout the scorechain crates.
pub type LedgerResult<T> = Result<T, LedgerError>;
