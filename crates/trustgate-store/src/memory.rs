//! In-memory [`BehaviorStore`] for tests and ephemeral gateways.

use std::collections::{BTreeSet, HashMap};
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::Result;
use crate::store::BehaviorStore;

#[derive(Debug, Default)]
struct PrincipalRecord {
    last_ip: Option<IpAddr>,
    count: u64,
    window_deadline: Option<Instant>,
    devices: BTreeSet<String>,
    last_score: Option<u8>,
}

impl PrincipalRecord {
    fn counter_live(&self, now: Instant) -> bool {
        self.window_deadline.is_some_and(|deadline| deadline > now)
    }
}

/// A [`BehaviorStore`] that keeps all state in process memory.
///
/// Window expiry uses the tokio clock, so tests can drive it with a
/// paused runtime and `tokio::time::advance`.
#[derive(Debug, Default)]
pub struct MemoryBehaviorStore {
    records: Mutex<HashMap<String, PrincipalRecord>>,
}

impl MemoryBehaviorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of principals with any recorded state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl BehaviorStore for MemoryBehaviorStore {
    async fn last_ip(&self, principal: &str) -> Result<Option<IpAddr>> {
        Ok(self
            .records
            .lock()
            .get(principal)
            .and_then(|record| record.last_ip))
    }

    async fn set_last_ip(&self, principal: &str, ip: IpAddr) -> Result<()> {
        self.records
            .lock()
            .entry(principal.to_string())
            .or_default()
            .last_ip = Some(ip);
        Ok(())
    }

    async fn increment_access_count(&self, principal: &str, window: Duration) -> Result<u64> {
        let now = Instant::now();
        let mut records = self.records.lock();
        let record = records.entry(principal.to_string()).or_default();

        record.count = if record.counter_live(now) {
            record.count.saturating_add(1)
        } else {
            1
        };
        record.window_deadline = Some(now + window);

        Ok(record.count)
    }

    async fn access_count(&self, principal: &str) -> Result<u64> {
        let now = Instant::now();
        Ok(self
            .records
            .lock()
            .get(principal)
            .filter(|record| record.counter_live(now))
            .map_or(0, |record| record.count))
    }

    async fn is_known_device(&self, principal: &str, fingerprint: &str) -> Result<bool> {
        Ok(self
            .records
            .lock()
            .get(principal)
            .is_some_and(|record| record.devices.contains(fingerprint)))
    }

    async fn register_device(&self, principal: &str, fingerprint: &str) -> Result<()> {
        self.records
            .lock()
            .entry(principal.to_string())
            .or_default()
            .devices
            .insert(fingerprint.to_string());
        Ok(())
    }

    async fn known_devices(&self, principal: &str) -> Result<Vec<String>> {
        Ok(self
            .records
            .lock()
            .get(principal)
            .map_or_else(Vec::new, |record| {
                record.devices.iter().cloned().collect()
            }))
    }

    async fn last_trust_score(&self, principal: &str) -> Result<Option<u8>> {
        Ok(self
            .records
            .lock()
            .get(principal)
            .and_then(|record| record.last_score))
    }

    async fn set_last_trust_score(&self, principal: &str, score: u8) -> Result<()> {
        self.records
            .lock()
            .entry(principal.to_string())
            .or_default()
            .last_score = Some(score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn unknown_principal_reads_neutral_state() {
        let store = MemoryBehaviorStore::new();

        assert!(store.last_ip("ghost").await.unwrap().is_none());
        assert_eq!(store.access_count("ghost").await.unwrap(), 0);
        assert!(!store.is_known_device("ghost", "fp").await.unwrap());
        assert!(store.known_devices("ghost").await.unwrap().is_empty());
        assert!(store.last_trust_score("ghost").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn state_roundtrips_per_principal() {
        let store = MemoryBehaviorStore::new();
        let ip: IpAddr = "203.0.113.7".parse().unwrap();

        store.set_last_ip("alice", ip).await.unwrap();
        store.register_device("alice", "beta").await.unwrap();
        store.register_device("alice", "alpha").await.unwrap();
        store.set_last_trust_score("alice", 65).await.unwrap();

        assert_eq!(store.last_ip("alice").await.unwrap(), Some(ip));
        assert_eq!(store.known_devices("alice").await.unwrap(), vec!["alpha", "beta"]);
        assert_eq!(store.last_trust_score("alice").await.unwrap(), Some(65));
        assert!(store.last_ip("bob").await.unwrap().is_none());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn counter_resets_after_idle_window() {
        let store = MemoryBehaviorStore::new();

        assert_eq!(store.increment_access_count("alice", WINDOW).await.unwrap(), 1);
        assert_eq!(store.increment_access_count("alice", WINDOW).await.unwrap(), 2);
        assert_eq!(store.access_count("alice").await.unwrap(), 2);

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(store.access_count("alice").await.unwrap(), 0);
        assert_eq!(store.increment_access_count("alice", WINDOW).await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn window_slides_on_every_increment() {
        let store = MemoryBehaviorStore::new();

        store.increment_access_count("alice", WINDOW).await.unwrap();
        tokio::time::advance(Duration::from_secs(40)).await;

        // 40s in: still live, and the deadline moves out to +60s again.
        assert_eq!(store.increment_access_count("alice", WINDOW).await.unwrap(), 2);

        tokio::time::advance(Duration::from_secs(40)).await;
        assert_eq!(store.access_count("alice").await.unwrap(), 2);

        tokio::time::advance(Duration::from_secs(40)).await;
        assert_eq!(store.access_count("alice").await.unwrap(), 0);
    }
}
