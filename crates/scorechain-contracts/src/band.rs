//! Score bands: the shared threshold contract.
//!
//! The dashboard renders these exact names and colors, so the
//! thresholds live here rather than in the query layer — a band is part
//! of the boundary contract, not a presentation detail.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named reputation bucket derived from a 0–100 score.
///
/// Thresholds: ≥90 Trusted, ≥70 Neutral, ≥40 Suspicious, ≥20 Malicious,
/// below 20 Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreBand {
    Trusted,
    Neutral,
    Suspicious,
    Malicious,
    Critical,
}

impl ScoreBand {
    /// All bands, worst first.  Stats iterate this so distributions
    /// always carry every band, including zero counts.
    pub const ALL: [ScoreBand; 5] = [
        ScoreBand::Critical,
        ScoreBand::Malicious,
        ScoreBand::Suspicious,
        ScoreBand::Neutral,
        ScoreBand::Trusted,
    ];

    /// Map a score to its band via the fixed thresholds.
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => ScoreBand::Trusted,
            70..=89 => ScoreBand::Neutral,
            40..=69 => ScoreBand::Suspicious,
            20..=39 => ScoreBand::Malicious,
            _ => ScoreBand::Critical,
        }
    }

    /// The dashboard color hex for this band.
    pub fn color(&self) -> &'static str {
        match self {
            ScoreBand::Trusted => "#4CAF50",
            ScoreBand::Neutral => "#FFC107",
            ScoreBand::Suspicious => "#FF9800",
            ScoreBand::Malicious => "#F44336",
            ScoreBand::Critical => "#B71C1C",
        }
    }

    /// The SCREAMING_SNAKE_CASE label used on the wire and in stats keys.
    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Trusted => "TRUSTED",
            ScoreBand::Neutral => "NEUTRAL",
            ScoreBand::Suspicious => "SUSPICIOUS",
            ScoreBand::Malicious => "MALICIOUS",
            ScoreBand::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
