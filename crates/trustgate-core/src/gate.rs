//! The gateway facade.
//!
//! [`TrustGate`] wires the behavior store, the trust calculator, and
//! the policy table into one entry point. Evaluation is infallible:
//! whatever breaks underneath, the caller always receives a decision
//! event.

use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use trustgate_policy::{decide, RiskLevel, TrustScore};
use trustgate_scoring::{AccessContext, Clock, SystemClock, TrustCalculator};
use trustgate_store::{BehaviorProfile, BehaviorStore, DecisionLog, SledBehaviorStore};

use crate::config::GateConfig;
use crate::error::GateError;
use crate::event::{DecisionEvent, DecisionSink, LogSink};
use crate::principal::Principal;
use crate::Result;

/// Profile view combining stored history with the derived risk band.
///
/// A principal with no recorded evaluation reads at the full-trust
/// baseline: profiles default into existence, they are never absent.
#[derive(Debug, Clone, Serialize)]
pub struct TrustProfile {
    /// Subject identifier.
    pub principal: String,

    /// Address seen on the most recent evaluation.
    pub last_ip: Option<IpAddr>,

    /// Accesses inside the current frequency window.
    pub access_count: u64,

    /// Enrolled device fingerprints, sorted.
    pub known_devices: Vec<String>,

    /// Score from the most recent evaluation, baseline if none.
    pub trust_score: TrustScore,

    /// Risk band for that score.
    pub risk_level: RiskLevel,
}

impl From<BehaviorProfile> for TrustProfile {
    fn from(profile: BehaviorProfile) -> Self {
        let trust_score = profile
            .last_trust_score
            .map_or(TrustScore::BASELINE, TrustScore::from);
        TrustProfile {
            principal: profile.principal,
            last_ip: profile.last_ip,
            access_count: profile.access_count,
            known_devices: profile.known_devices,
            trust_score,
            risk_level: trust_score.risk_level(),
        }
    }
}

/// Unified decision facade.
///
/// One gate owns one behavior store. All evaluations against the gate
/// share the same history, so a principal's score reflects everything
/// the gate has seen from them.
pub struct TrustGate {
    config: GateConfig,
    store: Arc<dyn BehaviorStore>,
    calculator: TrustCalculator,
    clock: Arc<dyn Clock>,
    sinks: Vec<Arc<dyn DecisionSink>>,
    log: Option<DecisionLog>,
}

impl TrustGate {
    /// Opens a gateway on the embedded store named in `config`.
    ///
    /// The capped decision log is attached as a sink, and the same
    /// log backs [`recent_decisions`](Self::recent_decisions).
    pub fn open(config: GateConfig) -> Result<Self> {
        let store = SledBehaviorStore::open(&config.store.db_path)?;
        let log = store.decision_log(config.store.log_capacity)?;

        let store: Arc<dyn BehaviorStore> = Arc::new(store);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let calculator =
            TrustCalculator::with_clock(store.clone(), clock.clone(), config.calculator_config());

        info!(
            db_path = %config.store.db_path.display(),
            log_capacity = config.store.log_capacity,
            window_secs = config.scoring.window_secs,
            "trust gateway initialized"
        );

        Ok(TrustGate {
            config,
            store,
            calculator,
            clock,
            sinks: vec![Arc::new(LogSink::new(log.clone()))],
            log: Some(log),
        })
    }

    /// Builds a gateway on an externally provided store and clock.
    ///
    /// No decision log is attached; add sinks with
    /// [`with_sink`](Self::with_sink).
    pub fn with_store(
        config: GateConfig,
        store: Arc<dyn BehaviorStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let calculator =
            TrustCalculator::with_clock(store.clone(), clock.clone(), config.calculator_config());
        TrustGate {
            config,
            store,
            calculator,
            clock,
            sinks: Vec::new(),
            log: None,
        }
    }

    /// Attaches an additional decision sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// The configuration this gate was built with.
    #[must_use]
    pub const fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Evaluates one access attempt and emits the decision event.
    ///
    /// Always produces a decision. Store trouble degrades the score
    /// inputs, sink trouble is logged and skipped; neither can fail
    /// an evaluation.
    pub async fn evaluate(&self, principal: &Principal, context: &AccessContext) -> DecisionEvent {
        debug!(
            principal = %principal.id,
            resource = %context.resource,
            source_ip = %context.source_ip,
            "evaluating access attempt"
        );

        let outcome = self.calculator.score(&principal.id, context).await;
        let decision = decide(outcome.score, &context.resource);

        let event = DecisionEvent {
            id: Uuid::new_v4(),
            timestamp: self.clock.now_utc(),
            principal: principal.id.clone(),
            roles: principal.roles.clone(),
            resource: context.resource.clone(),
            source_ip: context.source_ip,
            score: outcome.score,
            action: decision.action,
            restrictions: decision.restrictions,
            monitoring: decision.monitoring,
            reason: decision.reason,
            deductions: outcome.deductions,
            degraded: outcome.degraded,
        };

        for sink in &self.sinks {
            if let Err(error) = sink.emit(&event).await {
                warn!(sink = sink.name(), %error, "decision sink failed, decision stands");
            }
        }

        if event.degraded {
            warn!(
                principal = %event.principal,
                score = event.score.value(),
                "decision computed in degraded mode"
            );
        }

        info!(
            principal = %event.principal,
            resource = %event.resource,
            score = event.score.value(),
            action = %event.action,
            reason = %event.reason,
            "access decision"
        );

        event
    }

    /// The stored behavioral profile for a principal.
    ///
    /// Unlike evaluation this is a plain read: store failures surface
    /// as errors instead of fallbacks.
    pub async fn profile(&self, principal_id: &str) -> Result<TrustProfile> {
        let profile = self.store.profile(principal_id).await?;
        Ok(TrustProfile::from(profile))
    }

    /// The most recent decision events, newest first.
    ///
    /// Only available on gates built with [`open`](Self::open).
    pub fn recent_decisions(&self, limit: usize) -> Result<Vec<serde_json::Value>> {
        match &self.log {
            Some(log) => Ok(log.recent(limit)?),
            None => Err(GateError::LogUnavailable),
        }
    }
}

impl fmt::Debug for TrustGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustGate")
            .field("config", &self.config)
            .field("sinks", &self.sinks.len())
            .field("has_log", &self.log.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MemorySink;
    use trustgate_policy::AccessAction;
    use trustgate_scoring::FixedClock;
    use trustgate_store::MemoryBehaviorStore;

    const MIDDAY: u32 = 12;

    fn memory_gate(hour: u32) -> (TrustGate, Arc<MemorySink>, Arc<MemoryBehaviorStore>) {
        let store = Arc::new(MemoryBehaviorStore::new());
        let sink = Arc::new(MemorySink::new());
        let gate = TrustGate::with_store(
            GateConfig::default(),
            store.clone(),
            Arc::new(FixedClock::at_hour(hour)),
        )
        .with_sink(sink.clone());
        (gate, sink, store)
    }

    fn context(ip: &str, resource: &str) -> AccessContext {
        AccessContext::new(ip.parse().unwrap(), resource)
    }

    #[tokio::test]
    async fn test_evaluate_produces_event_and_feeds_sinks() {
        let (gate, sink, _store) = memory_gate(MIDDAY);
        let alice = Principal::new("alice").with_role("admin");

        let event = gate.evaluate(&alice, &context("10.0.0.1", "/api/data")).await;

        assert_eq!(event.principal, "alice");
        assert_eq!(event.roles, vec!["admin"]);
        assert_eq!(event.resource, "/api/data");
        assert_eq!(event.source_ip, "10.0.0.1".parse::<IpAddr>().unwrap());
        assert!(!event.degraded);

        let collected = sink.events();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].id, event.id);
    }

    #[tokio::test]
    async fn test_profile_reflects_evaluations() {
        let (gate, _sink, _store) = memory_gate(MIDDAY);
        let alice = Principal::new("alice");
        let ctx = context("10.0.0.1", "/api/data");

        let event = gate.evaluate(&alice, &ctx).await;
        let profile = gate.profile("alice").await.unwrap();

        assert_eq!(profile.principal, "alice");
        assert_eq!(profile.last_ip, Some(ctx.source_ip));
        assert_eq!(profile.access_count, 1);
        assert_eq!(profile.known_devices.len(), 1);
        assert_eq!(profile.trust_score, event.score);
        assert_eq!(profile.risk_level, event.score.risk_level());
    }

    #[tokio::test]
    async fn test_profile_of_unseen_principal_reads_at_baseline() {
        let (gate, _sink, _store) = memory_gate(MIDDAY);

        let profile = gate.profile("nobody").await.unwrap();
        assert!(profile.last_ip.is_none());
        assert_eq!(profile.access_count, 0);
        assert!(profile.known_devices.is_empty());
        assert_eq!(profile.trust_score, TrustScore::BASELINE);
        assert_eq!(profile.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn test_recent_decisions_requires_a_log() {
        let (gate, _sink, _store) = memory_gate(MIDDAY);

        let result = gate.recent_decisions(10);
        assert!(matches!(result, Err(GateError::LogUnavailable)));
    }

    #[tokio::test]
    async fn test_second_visit_from_same_device_scores_clean() {
        let (gate, _sink, _store) = memory_gate(MIDDAY);
        let alice = Principal::new("alice");
        let ctx = context("10.0.0.1", "/api/data");

        gate.evaluate(&alice, &ctx).await;
        let second = gate.evaluate(&alice, &ctx).await;

        assert_eq!(second.score.value(), 100);
        assert_eq!(second.action, AccessAction::Allow);
        assert!(second.deductions.is_empty());
    }
}
