//! Tiered policy decisions.
//!
//! A [`PolicyDecision`] is the complete answer for one access attempt:
//! what to do, which restrictions apply, how closely to watch the
//! session afterwards, and a stable reason code for downstream
//! consumers. Decisions are derived from a [`TrustScore`] alone via
//! [`decide`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::score::TrustScore;

/// What the gateway does with the access attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    /// Full access, no conditions.
    Allow,
    /// Access granted under the decision's restrictions.
    AllowRestricted,
    /// Access withheld until a stronger authentication factor succeeds.
    RequireStepUp,
    /// Access refused outright.
    Deny,
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Allow => "allow",
            Self::AllowRestricted => "allow_restricted",
            Self::RequireStepUp => "require_step_up",
            Self::Deny => "deny",
        };
        write!(f, "{label}")
    }
}

/// A constraint attached to a non-full grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Restriction {
    /// Mutating operations are refused for the session.
    ReadOnly,
    /// Only the minimal resource set stays reachable.
    MinimalAccess,
    /// Nothing is reachable.
    Blocked,
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ReadOnly => "read-only",
            Self::MinimalAccess => "minimal-access",
            Self::Blocked => "blocked",
        };
        write!(f, "{label}")
    }
}

/// How closely the session is watched after the decision.
///
/// Ordered from least to most scrutiny, so levels compare with `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitoringLevel {
    Normal,
    Enhanced,
    Strict,
    /// Strict monitoring plus an operator alert.
    Alert,
}

impl fmt::Display for MonitoringLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Normal => "normal",
            Self::Enhanced => "enhanced",
            Self::Strict => "strict",
            Self::Alert => "alert",
        };
        write!(f, "{label}")
    }
}

/// Stable machine-readable reason for a decision.
///
/// The serialized labels are part of the event format consumed by SIEM
/// pipelines and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    LowRisk,
    #[serde(rename = "mid_risk_readonly")]
    MidRiskReadOnly,
    #[serde(rename = "high_risk_stepup")]
    HighRiskStepUp,
    VeryHighRisk,
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::LowRisk => "low_risk",
            Self::MidRiskReadOnly => "mid_risk_readonly",
            Self::HighRiskStepUp => "high_risk_stepup",
            Self::VeryHighRisk => "very_high_risk",
        };
        write!(f, "{label}")
    }
}

/// The complete outcome of evaluating one access attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub action: AccessAction,
    /// Empty for a full grant; omitted from serialized output in that case.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,
    pub monitoring: MonitoringLevel,
    pub reason: ReasonCode,
}

impl PolicyDecision {
    /// Whether the principal gets any access at all, restricted or not.
    #[must_use]
    pub fn permits_access(&self) -> bool {
        matches!(
            self.action,
            AccessAction::Allow | AccessAction::AllowRestricted
        )
    }

    /// Whether access is withheld pending a step-up challenge.
    #[must_use]
    pub fn requires_step_up(&self) -> bool {
        self.action == AccessAction::RequireStepUp
    }

    /// Whether access is refused outright.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        self.action == AccessAction::Deny
    }
}

impl fmt::Display for PolicyDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.action, self.reason)
    }
}

/// Maps a trust score onto the tier table.
///
/// Tiers are matched top-down with inclusive lower bounds; every score
/// in `0..=100` lands in exactly one tier:
///
/// | Score     | Action            | Restrictions       | Monitoring |
/// |-----------|-------------------|--------------------|------------|
/// | `>= 80`   | `Allow`           | none               | `Normal`   |
/// | `60..=79` | `AllowRestricted` | `[read-only]`      | `Enhanced` |
/// | `40..=59` | `RequireStepUp`   | `[minimal-access]` | `Strict`   |
/// | `0..=39`  | `Deny`            | `[blocked]`        | `Alert`    |
///
/// `resource` participates in tracing only; the tier table applies
/// uniformly to every resource. Resource sensitivity is already folded
/// into the score, so it is not penalized a second time here.
#[must_use]
pub fn decide(score: TrustScore, resource: &str) -> PolicyDecision {
    let decision = match score.value() {
        80..=100 => PolicyDecision {
            action: AccessAction::Allow,
            restrictions: Vec::new(),
            monitoring: MonitoringLevel::Normal,
            reason: ReasonCode::LowRisk,
        },
        60..=79 => PolicyDecision {
            action: AccessAction::AllowRestricted,
            restrictions: vec![Restriction::ReadOnly],
            monitoring: MonitoringLevel::Enhanced,
            reason: ReasonCode::MidRiskReadOnly,
        },
        40..=59 => PolicyDecision {
            action: AccessAction::RequireStepUp,
            restrictions: vec![Restriction::MinimalAccess],
            monitoring: MonitoringLevel::Strict,
            reason: ReasonCode::HighRiskStepUp,
        },
        _ => PolicyDecision {
            action: AccessAction::Deny,
            restrictions: vec![Restriction::Blocked],
            monitoring: MonitoringLevel::Alert,
            reason: ReasonCode::VeryHighRisk,
        },
    };

    debug!(score = score.value(), resource, action = %decision.action, "rendered policy decision");
    decision
}
