//! # scorechain-verify
//!
//! The checking layer of the scorechain ledger:
//!
//! - `ChainVerifier` — resumable, checkpointed hash-chain integrity
//!   verification (tamper detection over the append-only log)
//! - `checkpoint` — persistence for the last verified `(sequence, hash)`
//! - `SchemaIngressValidator` — JSON Schema gate for inbound
//!   classification events

pub mod checkpoint;
pub mod ingress;
pub mod verifier;

pub use ingress::SchemaIngressValidator;
pub use verifier::ChainVerifier;
