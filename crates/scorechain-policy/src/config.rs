//! Scoring policy configuration schema.
//!
//! A `ScoringConfig` is deserialized from TOML.  Every field has a
//! default matching the production deception engine, so an empty file
//! (or no file at all) yields the stock policy.
//!
//! Example:
//! ```toml
//! default_score = 100
//! benign_reward = 1
//! default_penalty = 10
//!
//! [penalties]
//! SQLI = 15
//! XSS = 12
//! SSI = 10
//! BRUTE_FORCE = 8
//! BENIGN = 0
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use scorechain_contracts::record::MAX_SCORE;

/// The scoring policy loaded from TOML.
///
/// Scores are clamped to `[min_score, max_score]`.  A benign event adds
/// `benign_reward` (saturating at the ceiling); a malicious event
/// subtracts the penalty for its attack-type label, falling back to
/// `default_penalty` for labels not in the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Score assigned to an identity on first sighting.
    pub default_score: u8,

    /// Floor every score is clamped to.
    pub min_score: u8,

    /// Ceiling every score is clamped to.
    pub max_score: u8,

    /// Points recovered per benign interaction.
    pub benign_reward: u8,

    /// Penalty applied for attack types absent from `penalties`.
    pub default_penalty: u8,

    /// Penalty per attack-type label.
    pub penalties: BTreeMap<String, u8>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let mut penalties = BTreeMap::new();
        penalties.insert("SQLI".to_string(), 15);
        penalties.insert("XSS".to_string(), 12);
        penalties.insert("SSI".to_string(), 10);
        penalties.insert("BRUTE_FORCE".to_string(), 8);
        penalties.insert("BENIGN".to_string(), 0);

        Self {
            default_score: 100,
            min_score: 0,
            max_score: 100,
            benign_reward: 1,
            default_penalty: 10,
            penalties,
        }
    }
}

impl ScoringConfig {
    /// Check internal consistency of the configured range.
    ///
    /// Returns a reason string rather than an error type so the engine
    /// can wrap it in its own `Config` error with file context.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_score > MAX_SCORE {
            return Err(format!(
                "max_score {} exceeds the ledger score bound {}",
                self.max_score, MAX_SCORE
            ));
        }
        if self.min_score > self.max_score {
            return Err(format!(
                "min_score {} exceeds max_score {}",
                self.min_score, self.max_score
            ));
        }
        if self.default_score < self.min_score || self.default_score > self.max_score {
            return Err(format!(
                "default_score {} outside configured range {}..={}",
                self.default_score, self.min_score, self.max_score
            ));
        }
        Ok(())
    }
}
