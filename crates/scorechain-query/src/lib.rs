//! # scorechain-query
//!
//! Read-only views over the scorechain ledger: paginated listings,
//! aggregate analytics, per-identity reputation summaries, and lazy
//! bulk export.  Nothing in this crate mutates the chain.

pub mod export;
pub mod service;

pub use export::ExportIter;
pub use service::QueryService;
