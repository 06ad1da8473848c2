//! # scorechain-ledger
//!
//! Append-only, SHA-256 hash-chained storage for reputation score
//! records.
//!
//! ## Overview
//!
//! Every score change is wrapped in a `LedgerRecord` that links to the
//! previous record via its SHA-256 hash.  Tampering with any record —
//! even a single byte — breaks the chain and is detected by the
//! verifier.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scorechain_ledger::{FileLedger, InMemoryLedger};
//! use scorechain_core::traits::LedgerStore;
//!
//! let ledger = FileLedger::open("scores.jsonl")?;
//! let record = ledger.append(&event)?;
//! assert_eq!(ledger.tail_hash()?, record.hash);
//! ```

pub mod chain;
pub mod codec;
pub mod file;
pub mod memory;

pub use chain::{first_break, link_hash, record_matches};
pub use codec::{decode_record, encode_record};
pub use file::FileLedger;
pub use memory::InMemoryLedger;
