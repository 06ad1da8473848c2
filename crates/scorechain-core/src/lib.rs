//! # scorechain-core
//!
//! Trait seams and the ingest pipeline for the scorechain ledger.
//!
//! This crate provides:
//! - The three boundary traits (`IngressValidator`, `ScorePolicy`,
//!   `LedgerStore`)
//! - The `IngestService` that wires them together in trust order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scorechain_core::{IngestService, traits::{IngressValidator, LedgerStore, ScorePolicy}};
//! ```

pub mod service;
pub mod traits;

pub use service::{IngestService, MAX_APPEND_ATTEMPTS};
