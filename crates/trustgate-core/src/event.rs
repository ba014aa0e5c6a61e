//! Decision events and the sinks that receive them.
//!
//! Every evaluation produces exactly one [`DecisionEvent`]. Attached
//! sinks receive a copy for audit delivery; a failing sink is logged
//! and skipped, never allowed to block or change the decision.

use std::net::IpAddr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use trustgate_policy::{
    AccessAction, MonitoringLevel, PolicyDecision, ReasonCode, Restriction, TrustScore,
};
use trustgate_scoring::Deduction;
use trustgate_store::DecisionLog;

use crate::Result;

/// The audit record for one access decision.
///
/// The event is the unit of audit: it captures who asked for what,
/// the score the behavior history produced, and the policy response,
/// in a single flat record suitable for log pipelines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionEvent {
    /// Unique event identifier.
    pub id: Uuid,

    /// Capture time, UTC.
    pub timestamp: DateTime<Utc>,

    /// Subject identifier of the caller.
    pub principal: String,

    /// Role claims the caller presented.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,

    /// Resource path that was requested.
    pub resource: String,

    /// Source address of the request.
    pub source_ip: IpAddr,

    /// Computed trust score.
    pub score: TrustScore,

    /// Granted action.
    pub action: AccessAction,

    /// Restrictions attached to the grant, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restrictions: Vec<Restriction>,

    /// Monitoring level assigned to the session.
    pub monitoring: MonitoringLevel,

    /// Machine-readable reason code.
    pub reason: ReasonCode,

    /// Deductions that fired, in evaluation order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deductions: Vec<Deduction>,

    /// True if the evaluation ran on fallback values because the
    /// behavior store failed or timed out.
    pub degraded: bool,
}

impl DecisionEvent {
    /// The policy decision embedded in this event.
    #[must_use]
    pub fn decision(&self) -> PolicyDecision {
        PolicyDecision {
            action: self.action,
            restrictions: self.restrictions.clone(),
            monitoring: self.monitoring,
            reason: self.reason,
        }
    }

    /// Whether the caller was granted any access, restricted or not.
    #[must_use]
    pub fn permits_access(&self) -> bool {
        matches!(self.action, AccessAction::Allow | AccessAction::AllowRestricted)
    }

    /// Whether the caller must re-authenticate before proceeding.
    #[must_use]
    pub fn requires_step_up(&self) -> bool {
        self.action == AccessAction::RequireStepUp
    }

    /// Whether access was refused outright.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        self.action == AccessAction::Deny
    }
}

/// Receives decision events for audit delivery.
///
/// Emission is best-effort by contract: the gateway logs a failing
/// sink and moves on, so implementations must not assume every event
/// reaches them.
#[async_trait]
pub trait DecisionSink: Send + Sync {
    /// Sink name, used in diagnostics when emission fails.
    fn name(&self) -> &'static str;

    /// Records one decision event.
    async fn emit(&self, event: &DecisionEvent) -> Result<()>;
}

/// Collects events in memory.
///
/// Useful in tests and for embedders that drain events themselves.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RwLock<Vec<DecisionEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<DecisionEvent> {
        self.events.read().clone()
    }

    /// Number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Whether nothing has been emitted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Discards all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }
}

#[async_trait]
impl DecisionSink for MemorySink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn emit(&self, event: &DecisionEvent) -> Result<()> {
        self.events.write().push(event.clone());
        Ok(())
    }
}

/// Appends events to the capped on-store decision log.
#[derive(Debug, Clone)]
pub struct LogSink {
    log: DecisionLog,
}

impl LogSink {
    /// Wraps a decision log as a sink.
    #[must_use]
    pub fn new(log: DecisionLog) -> Self {
        LogSink { log }
    }
}

#[async_trait]
impl DecisionSink for LogSink {
    fn name(&self) -> &'static str {
        "decision-log"
    }

    async fn emit(&self, event: &DecisionEvent) -> Result<()> {
        self.log.append(event)?;
        Ok(())
    }
}
