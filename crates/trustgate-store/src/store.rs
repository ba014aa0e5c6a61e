//! The behavioral state interface.
//!
//! Everything the trust calculator knows about a principal's history
//! goes through [`BehaviorStore`]. The trait keeps the storage backend
//! swappable: production runs on the embedded sled store, tests and
//! ephemeral gateways run on the in-memory store.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Per-principal behavioral state.
///
/// All operations are keyed by an opaque principal identifier. Methods
/// that read absent state return the neutral value (`None`, `0`,
/// `false`) rather than an error; errors mean the backend itself
/// failed.
#[async_trait]
pub trait BehaviorStore: Send + Sync {
    /// The source address seen on the principal's previous attempt.
    async fn last_ip(&self, principal: &str) -> Result<Option<IpAddr>>;

    /// Records the source address of the current attempt.
    async fn set_last_ip(&self, principal: &str, ip: IpAddr) -> Result<()>;

    /// Atomically increments the windowed access counter and returns
    /// the post-increment value.
    ///
    /// The window slides: every increment pushes the expiry out to
    /// `now + window`, so the counter only resets after a full window
    /// with no activity. The first increment of a fresh window returns 1.
    async fn increment_access_count(&self, principal: &str, window: Duration) -> Result<u64>;

    /// The current counter value without incrementing.
    ///
    /// Returns 0 once the window has lapsed, even if the stale record
    /// has not been overwritten yet.
    async fn access_count(&self, principal: &str) -> Result<u64>;

    /// Whether the device fingerprint has been seen for this principal.
    async fn is_known_device(&self, principal: &str, fingerprint: &str) -> Result<bool>;

    /// Adds the fingerprint to the principal's device set. Idempotent.
    async fn register_device(&self, principal: &str, fingerprint: &str) -> Result<()>;

    /// Every device fingerprint registered for the principal, in
    /// lexicographic order.
    async fn known_devices(&self, principal: &str) -> Result<Vec<String>>;

    /// The score persisted by the most recent evaluation, if any.
    async fn last_trust_score(&self, principal: &str) -> Result<Option<u8>>;

    /// Persists the score computed by the current evaluation.
    async fn set_last_trust_score(&self, principal: &str, score: u8) -> Result<()>;

    /// Assembles the full behavioral profile for a principal.
    async fn profile(&self, principal: &str) -> Result<BehaviorProfile> {
        Ok(BehaviorProfile {
            principal: principal.to_string(),
            last_ip: self.last_ip(principal).await?,
            access_count: self.access_count(principal).await?,
            known_devices: self.known_devices(principal).await?,
            last_trust_score: self.last_trust_score(principal).await?,
        })
    }
}

/// A point-in-time view of everything stored about a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorProfile {
    pub principal: String,
    pub last_ip: Option<IpAddr>,
    /// Accesses inside the current window; 0 if the window has lapsed.
    pub access_count: u64,
    pub known_devices: Vec<String>,
    pub last_trust_score: Option<u8>,
}

impl BehaviorProfile {
    /// Whether the store has any history for this principal at all.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.last_ip.is_none()
            && self.access_count == 0
            && self.known_devices.is_empty()
            && self.last_trust_score.is_none()
    }
}
