//! TOML-driven scoring policy implementation.
//!
//! `TomlScorePolicy` loads a `ScoringConfig` from a TOML string or file
//! and implements the `ScorePolicy` trait from scorechain-core.
//!
//! Scoring algorithm:
//!
//! 1. Benign event → `score + benign_reward`, saturating at `max_score`.
//! 2. Malicious event → `score - penalty(attack_type)`, saturating at
//!    `min_score`; unknown labels use `default_penalty`.
//! 3. The result is always inside `[min_score, max_score]`.

use std::path::Path;

use tracing::debug;

use scorechain_contracts::error::{LedgerError, LedgerResult};
use scorechain_core::traits::ScorePolicy;

use crate::config::ScoringConfig;

/// A `ScorePolicy` implementation configured from a TOML document.
///
/// Construct via `from_toml_str`, `from_file`, or `Default` (the stock
/// penalty table), then pass to the ingest service.
///
/// ```rust,ignore
/// use scorechain_policy::TomlScorePolicy;
///
/// let policy = TomlScorePolicy::from_file(Path::new("scoring.toml"))?;
/// ```
#[derive(Debug, Default)]
pub struct TomlScorePolicy {
    config: ScoringConfig,
}

impl TomlScorePolicy {
    /// Wrap an already-built config, checking its range invariants.
    pub fn new(config: ScoringConfig) -> LedgerResult<Self> {
        config
            .validate()
            .map_err(|reason| LedgerError::Config { reason })?;
        Ok(Self { config })
    }

    /// Parse `s` as TOML and build a `TomlScorePolicy`.
    ///
    /// Returns `LedgerError::Config` if the TOML is malformed, does not
    /// match the `ScoringConfig` schema, or configures an inconsistent
    /// score range.
    pub fn from_toml_str(s: &str) -> LedgerResult<Self> {
        let config: ScoringConfig = toml::from_str(s).map_err(|e| LedgerError::Config {
            reason: format!("failed to parse scoring TOML: {}", e),
        })?;
        Self::new(config)
    }

    /// Read the file at `path` and parse it as TOML scoring configuration.
    pub fn from_file(path: &Path) -> LedgerResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| LedgerError::Config {
            reason: format!("failed to read scoring file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// The penalty for `attack_type`, falling back to the default.
    fn penalty(&self, attack_type: &str) -> u8 {
        self.config
            .penalties
            .get(attack_type)
            .copied()
            .unwrap_or(self.config.default_penalty)
    }
}

impl ScorePolicy for TomlScorePolicy {
    fn default_score(&self) -> u8 {
        self.config.default_score
    }

    /// Apply one classification outcome to `current`.
    ///
    /// Benign interactions slowly rebuild trust; malicious ones drop it
    /// by the configured penalty.  Output is clamped to the configured
    /// range in both directions.
    fn apply(&self, current: u8, attack_type: &str, malicious: bool) -> u8 {
        let next = if malicious {
            let penalty = self.penalty(attack_type);
            debug!(attack_type, penalty, current, "applying attack penalty");
            current.saturating_sub(penalty).max(self.config.min_score)
        } else {
            current
                .saturating_add(self.config.benign_reward)
                .min(self.config.max_score)
        };
        next.clamp(self.config.min_score, self.config.max_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_penalties_match_the_documented_table() {
        let policy = TomlScorePolicy::default();
        assert_eq!(policy.apply(100, "SQLI", true), 85);
        assert_eq!(policy.apply(100, "XSS", true), 88);
        assert_eq!(policy.apply(100, "SSI", true), 90);
        assert_eq!(policy.apply(100, "BRUTE_FORCE", true), 92);
    }

    #[test]
    fn unknown_attack_type_uses_default_penalty() {
        let policy = TomlScorePolicy::default();
        assert_eq!(policy.apply(100, "LFI", true), 90);
    }

    #[test]
    fn benign_events_recover_one_point_up_to_the_ceiling() {
        let policy = TomlScorePolicy::default();
        assert_eq!(policy.apply(70, "BENIGN", false), 71);
        assert_eq!(policy.apply(100, "BENIGN", false), 100);
    }

    #[test]
    fn penalties_clamp_at_the_floor() {
        let policy = TomlScorePolicy::default();
        assert_eq!(policy.apply(5, "SQLI", true), 0);
        assert_eq!(policy.apply(0, "SQLI", true), 0);
    }

    #[test]
    fn toml_overrides_are_honored() {
        let policy = TomlScorePolicy::from_toml_str(
            r#"
            benign_reward = 2
            default_penalty = 25

            [penalties]
            SQLI = 50
            "#,
        )
        .unwrap();

        assert_eq!(policy.apply(100, "SQLI", true), 50);
        assert_eq!(policy.apply(100, "XSS", true), 75);
        assert_eq!(policy.apply(96, "BENIGN", false), 98);
    }

    #[test]
    fn empty_toml_yields_the_stock_policy() {
        let policy = TomlScorePolicy::from_toml_str("").unwrap();
        assert_eq!(policy.default_score(), 100);
        assert_eq!(policy.apply(100, "SQLI", true), 85);
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = TomlScorePolicy::from_toml_str("penalties = 3").unwrap_err();
        assert!(matches!(
            err,
            scorechain_contracts::error::LedgerError::Config { .. }
        ));
    }

    #[test]
    fn inconsistent_range_is_rejected() {
        let err = TomlScorePolicy::from_toml_str(
            r#"
            min_score = 50
            max_score = 40
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            scorechain_contracts::error::LedgerError::Config { .. }
        ));
    }
}
