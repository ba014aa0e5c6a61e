//! Trust score and coarse risk classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A trust score in the closed range `0..=100`.
///
/// Scores are produced by summing penalty deductions against a perfect
/// baseline and clamping, so a value outside the range cannot be
/// constructed. Deserialization clamps as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub struct TrustScore(u8);

impl TrustScore {
    /// The perfect baseline every evaluation starts from.
    pub const BASELINE: Self = Self(100);

    /// The floor a score can be driven to.
    pub const FLOOR: Self = Self(0);

    /// Clamps a raw signed sum into the valid range.
    ///
    /// Penalty arithmetic is done in `i32` so an over-penalized request
    /// (raw sum below zero) clamps to the floor rather than wrapping.
    #[must_use]
    pub fn clamped(raw: i32) -> Self {
        Self(raw.clamp(0, 100) as u8)
    }

    /// The numeric value, guaranteed to be in `0..=100`.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Coarse risk band used by profile views.
    ///
    /// | Score     | Risk     |
    /// |-----------|----------|
    /// | `>= 80`   | low      |
    /// | `60..=79` | medium   |
    /// | `< 60`    | high     |
    #[must_use]
    pub const fn risk_level(self) -> RiskLevel {
        if self.0 >= 80 {
            RiskLevel::Low
        } else if self.0 >= 60 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl From<u8> for TrustScore {
    fn from(value: u8) -> Self {
        Self(value.min(100))
    }
}

impl From<TrustScore> for u8 {
    fn from(score: TrustScore) -> Self {
        score.0
    }
}

impl fmt::Display for TrustScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Coarse risk band derived from a [`TrustScore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        };
        write!(f, "{label}")
    }
}
