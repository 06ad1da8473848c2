//! # scorechain-policy
//!
//! TOML-driven reputation scoring policy.
//!
//! The policy decides how an identity's 0–100 score moves in response
//! to classification outcomes: per-attack-type penalties, a slow
//! recovery reward for benign traffic, and hard clamping at the
//! configured range.  The ledger itself never interprets scores — all
//! score arithmetic lives here.

pub mod config;
pub mod engine;

pub use config::ScoringConfig;
pub use engine::TomlScorePolicy;
