//! # TrustGate Integration Tests
//!
//! End-to-end tests driving the facade against real embedded stores.
//!
//! ## Operation Coverage
//!
//! | Operation | Path | Test |
//! |-----------|------|------|
//! | Evaluate | sled store | `test_evaluation_feeds_decision_log` |
//! | Decision log | capped retention | `test_decision_log_caps_retention` |
//! | Persistence | close and reopen | `test_state_survives_reopen` |
//! | Open | default wiring | `test_open_initializes_gateway` |
//! | Profile | sled store | `test_profile_round_trip` |
//! | Degraded mode | store outage | `test_degraded_store_still_decides` |
//! | Sinks | failing sink | `test_sink_failure_does_not_block_decisions` |

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use trustgate_core::{
    AccessAction, AccessContext, BehaviorStore, DecisionEvent, DecisionLog, DecisionSink,
    DeviceSignals, FixedClock, GateConfig, GateError, LogSink, MemorySink, Principal, RiskLevel,
    SledBehaviorStore, StoreError, TrustGate,
};

const MIDDAY: u32 = 12;

/// Creates a gate configuration pointing at a temporary database.
fn test_config(temp_dir: &TempDir) -> GateConfig {
    let mut config = GateConfig::default();
    config.store.db_path = temp_dir.path().join("gate.db");
    config.store.log_capacity = 5;
    config
}

/// Opens a sled-backed gate on a fixed clock, returning the log so
/// tests can read back what the sink recorded.
fn sled_gate(temp_dir: &TempDir, hour: u32) -> (TrustGate, DecisionLog, Arc<SledBehaviorStore>) {
    let config = test_config(temp_dir);
    let store = Arc::new(SledBehaviorStore::open(&config.store.db_path).unwrap());
    let log = store.decision_log(config.store.log_capacity).unwrap();

    let gate = TrustGate::with_store(config, store.clone(), Arc::new(FixedClock::at_hour(hour)))
        .with_sink(Arc::new(LogSink::new(log.clone())));
    (gate, log, store)
}

fn laptop() -> DeviceSignals {
    DeviceSignals {
        user_agent: "Mozilla/5.0".to_string(),
        accept_language: "en-US".to_string(),
        platform: "MacIntel".to_string(),
        timezone: "America/New_York".to_string(),
    }
}

fn request(ip: &str, resource: &str) -> AccessContext {
    AccessContext::new(ip.parse().unwrap(), resource).with_device(laptop())
}

// =============================================================================
// EVALUATION PIPELINE
// =============================================================================

#[tokio::test]
async fn test_evaluation_feeds_decision_log() {
    let temp_dir = TempDir::new().unwrap();
    let (gate, log, _store) = sled_gate(&temp_dir, MIDDAY);
    let alice = Principal::new("alice");

    gate.evaluate(&alice, &request("10.0.0.1", "/api/one")).await;
    gate.evaluate(&alice, &request("10.0.0.1", "/api/two")).await;
    gate.evaluate(&alice, &request("10.0.0.1", "/api/three")).await;

    let entries = log.recent(10).unwrap();
    assert_eq!(entries.len(), 3);

    // Newest first
    assert_eq!(entries[0]["resource"], "/api/three");
    assert_eq!(entries[2]["resource"], "/api/one");

    // Events land as full audit records
    assert_eq!(entries[0]["principal"], "alice");
    assert_eq!(entries[0]["action"], "allow");
    assert_eq!(entries[0]["reason"], "low_risk");
    assert_eq!(entries[0]["degraded"], false);
    assert!(entries[0]["score"].is_u64());
}

#[tokio::test]
async fn test_decision_log_caps_retention() {
    let temp_dir = TempDir::new().unwrap();
    let (gate, log, _store) = sled_gate(&temp_dir, MIDDAY);
    let alice = Principal::new("alice");

    for i in 0..8 {
        let resource = format!("/api/r{i}");
        gate.evaluate(&alice, &request("10.0.0.1", &resource)).await;
    }

    // Capacity is 5; the three oldest events are gone.
    let entries = log.recent(20).unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["resource"], "/api/r7");
    assert_eq!(entries[4]["resource"], "/api/r3");
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let (gate, _log, _store) = sled_gate(&temp_dir, MIDDAY);
        let first = gate
            .evaluate(&Principal::new("alice"), &request("10.0.0.1", "/api/data"))
            .await;
        // Fresh device on first contact
        assert_eq!(first.score.value(), 75);
    }

    // Same principal, same device, same address after a restart.
    let (gate, _log, _store) = sled_gate(&temp_dir, MIDDAY);
    let second = gate
        .evaluate(&Principal::new("alice"), &request("10.0.0.1", "/api/data"))
        .await;

    assert_eq!(second.score.value(), 100, "device enrollment must persist");
    assert!(second.deductions.is_empty());

    let profile = gate.profile("alice").await.unwrap();
    assert_eq!(profile.known_devices.len(), 1);
    assert_eq!(profile.trust_score.value(), 100);
}

#[tokio::test]
async fn test_open_initializes_gateway() {
    let temp_dir = TempDir::new().unwrap();
    let gate = TrustGate::open(test_config(&temp_dir)).unwrap();

    let event = gate
        .evaluate(&Principal::new("alice"), &request("10.0.0.1", "/api/data"))
        .await;
    assert!(!event.degraded);

    // The built-in log sink captured the event.
    let entries = gate.recent_decisions(10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["principal"], "alice");

    let profile = gate.profile("alice").await.unwrap();
    assert_eq!(profile.access_count, 1);
}

#[tokio::test]
async fn test_profile_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let (gate, _log, _store) = sled_gate(&temp_dir, MIDDAY);
    let alice = Principal::new("alice");

    gate.evaluate(&alice, &request("10.0.0.1", "/api/data")).await;
    gate.evaluate(&alice, &request("10.0.0.1", "/api/data")).await;

    let profile = gate.profile("alice").await.unwrap();
    assert_eq!(profile.principal, "alice");
    assert_eq!(profile.last_ip, Some("10.0.0.1".parse().unwrap()));
    assert_eq!(profile.access_count, 2);
    assert_eq!(profile.known_devices.len(), 1);
    assert_eq!(profile.trust_score.value(), 100);
    assert_eq!(profile.risk_level, RiskLevel::Low);
}

// =============================================================================
// FAILURE ISOLATION
// =============================================================================

/// A store where every operation fails.
struct DeadStore;

#[async_trait]
impl BehaviorStore for DeadStore {
    async fn last_ip(&self, _principal: &str) -> trustgate_store::Result<Option<std::net::IpAddr>> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn set_last_ip(
        &self,
        _principal: &str,
        _ip: std::net::IpAddr,
    ) -> trustgate_store::Result<()> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn increment_access_count(
        &self,
        _principal: &str,
        _window: std::time::Duration,
    ) -> trustgate_store::Result<u64> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn access_count(&self, _principal: &str) -> trustgate_store::Result<u64> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn is_known_device(
        &self,
        _principal: &str,
        _fingerprint: &str,
    ) -> trustgate_store::Result<bool> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn register_device(
        &self,
        _principal: &str,
        _fingerprint: &str,
    ) -> trustgate_store::Result<()> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn known_devices(&self, _principal: &str) -> trustgate_store::Result<Vec<String>> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn last_trust_score(&self, _principal: &str) -> trustgate_store::Result<Option<u8>> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    async fn set_last_trust_score(
        &self,
        _principal: &str,
        _score: u8,
    ) -> trustgate_store::Result<()> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

#[tokio::test]
async fn test_degraded_store_still_decides() {
    let sink = Arc::new(MemorySink::new());
    let gate = TrustGate::with_store(
        GateConfig::default(),
        Arc::new(DeadStore),
        Arc::new(FixedClock::at_hour(MIDDAY)),
    )
    .with_sink(sink.clone());

    let event = gate
        .evaluate(&Principal::new("alice"), &request("10.0.0.1", "/api/data"))
        .await;

    // Fallback inputs: no prior address, count of one, unknown device.
    assert!(event.degraded);
    assert_eq!(event.score.value(), 75);
    assert_eq!(event.action, AccessAction::AllowRestricted);

    // The event still reached the sink.
    assert_eq!(sink.len(), 1);
    assert!(sink.events()[0].degraded);
}

/// A sink that rejects every event.
struct RefusingSink;

#[async_trait]
impl DecisionSink for RefusingSink {
    fn name(&self) -> &'static str {
        "refusing"
    }

    async fn emit(&self, _event: &DecisionEvent) -> trustgate_core::Result<()> {
        Err(GateError::Sink {
            sink: "refusing",
            message: "pipe closed".to_string(),
        })
    }
}

#[tokio::test]
async fn test_sink_failure_does_not_block_decisions() {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir);
    let store = Arc::new(SledBehaviorStore::open(&config.store.db_path).unwrap());
    let memory = Arc::new(MemorySink::new());

    let gate = TrustGate::with_store(config, store, Arc::new(FixedClock::at_hour(MIDDAY)))
        .with_sink(Arc::new(RefusingSink))
        .with_sink(memory.clone());

    let event = gate
        .evaluate(&Principal::new("alice"), &request("10.0.0.1", "/api/data"))
        .await;

    // Decision produced, later sinks still reached.
    assert!(!event.is_denied());
    assert_eq!(memory.len(), 1);
}
