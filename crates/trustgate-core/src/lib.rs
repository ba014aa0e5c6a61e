//! # TrustGate Core
//!
//! Unified decision facade for the TrustGate zero-trust gateway.
//! Orchestrates the behavior store, trust scoring, and the policy
//! table behind a single evaluation entry point.
//!
//! ## Decision Model
//!
//! Every request starts from full trust and loses points for each
//! behavioral anomaly observed. The final score selects the response:
//!
//! | Score | Action | Restrictions | Monitoring |
//! |-------|--------|--------------|------------|
//! | 80-100 | Allow | none | Normal |
//! | 60-79 | AllowRestricted | read-only | Enhanced |
//! | 40-59 | RequireStepUp | minimal-access | Strict |
//! | 0-39 | Deny | blocked | Alert |
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      TRUSTGATE CORE                        │
//! ├────────────────────────────────────────────────────────────┤
//! │                                                            │
//! │                  ┌─────────────────┐                       │
//! │                  │    TrustGate    │  ← Unified Facade     │
//! │                  └────────┬────────┘                       │
//! │                           │                                │
//! │        ┌──────────────────┼──────────────────┐             │
//! │        ▼                  ▼                  ▼             │
//! │ ┌─────────────┐   ┌─────────────┐    ┌─────────────┐      │
//! │ │   Behavior  │   │    Trust    │    │   Policy    │      │
//! │ │    Store    │   │ Calculator  │    │    Table    │      │
//! │ └─────────────┘   └─────────────┘    └─────────────┘      │
//! │        │                                    │              │
//! │        ▼                                    ▼              │
//! │   sled trees                         decision sinks        │
//! │                                                            │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use trustgate_core::{AccessContext, GateConfig, Principal, TrustGate};
//!
//! // Open a gateway on the embedded store
//! let gate = TrustGate::open(GateConfig::default())?;
//!
//! // Evaluate an access attempt
//! let principal = Principal::new("alice");
//! let context = AccessContext::new("10.0.0.1".parse()?, "/api/files");
//! let event = gate.evaluate(&principal, &context).await;
//!
//! if event.permits_access() {
//!     serve(&event.restrictions);
//! } else if event.requires_step_up() {
//!     challenge();
//! } else {
//!     reject(event.reason);
//! }
//! ```
//!
//! ## Availability Notes
//!
//! - Evaluation never fails: store outages degrade the inputs and
//!   mark the event `degraded` instead of returning an error
//! - Sinks are best-effort, a failing sink cannot veto a decision
//! - Deductions apply in a fixed order so audit trails are stable
//! - Scores are clamped to 0-100 before policy lookup and persistence

mod config;
mod error;
mod event;
mod gate;
mod principal;

pub use config::{GateConfig, ScoringConfig, StoreConfig};
pub use error::GateError;
pub use event::{DecisionEvent, DecisionSink, LogSink, MemorySink};
pub use gate::{TrustGate, TrustProfile};
pub use principal::{Principal, ADMIN_ROLE};

// Re-export component types for convenience
pub use trustgate_policy::{
    AccessAction, MonitoringLevel, PolicyDecision, ReasonCode, Restriction, RiskLevel, TrustScore,
};
pub use trustgate_scoring::{
    fingerprint, is_sensitive_resource, AccessContext, Clock, Deduction, DeviceSignals, FixedClock,
    SystemClock,
};
pub use trustgate_store::{
    BehaviorProfile, BehaviorStore, DecisionLog, MemoryBehaviorStore, SledBehaviorStore, StoreError,
};

/// Core result type for gateway operations.
pub type Result<T> = std::result::Result<T, GateError>;
