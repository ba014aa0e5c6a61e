//! # Embedded Behavioral Store
//!
//! Sled-backed implementation of [`BehaviorStore`]. Behavioral state
//! survives gateway restarts, so a device registered last week is still
//! recognized after a redeploy.
//!
//! ## Storage Structure
//!
//! The database uses five trees (namespaces), all keyed by principal
//! except the device set and the decision log:
//!
//! | Tree | Key | Value | Purpose |
//! |------|-----|-------|---------|
//! | `last_ips` | principal | textual IP address | network change detection |
//! | `access_counts` | principal | `u64` count ++ `i64` expiry (big-endian) | windowed frequency |
//! | `devices` | principal `0x1f` fingerprint | empty | device recognition |
//! | `trust_scores` | principal | single score byte | last computed score |
//! | `decision_log` | `u64` sequence (big-endian) | JSON event | capped audit trail |
//!
//! ## Concurrency
//!
//! Sled is thread-safe and the counter is updated through a
//! compare-and-swap loop, so concurrent evaluations of the same
//! principal each observe a distinct counter value.

use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Result, StoreError};
use crate::log::DecisionLog;
use crate::store::BehaviorStore;

/// Tree name for last seen source addresses.
const IP_TREE: &str = "last_ips";

/// Tree name for windowed access counters.
const COUNT_TREE: &str = "access_counts";

/// Tree name for the per-principal device sets.
const DEVICE_TREE: &str = "devices";

/// Tree name for last computed trust scores.
const SCORE_TREE: &str = "trust_scores";

/// Tree name for the capped decision log.
const LOG_TREE: &str = "decision_log";

/// Separator between principal and fingerprint in device keys.
///
/// Keeps the prefix scan for `alice` from matching keys written for
/// `alice2`. Fingerprints are lowercase hex so the byte never appears
/// in either half.
const DEVICE_KEY_SEP: u8 = 0x1f;

/// A counter record is the count followed by its expiry, both 8 bytes.
const COUNT_RECORD_LEN: usize = 16;

fn encode_count(count: u64, expires_at_ms: i64) -> [u8; COUNT_RECORD_LEN] {
    let mut buf = [0u8; COUNT_RECORD_LEN];
    buf[..8].copy_from_slice(&count.to_be_bytes());
    buf[8..].copy_from_slice(&expires_at_ms.to_be_bytes());
    buf
}

/// Decodes a counter record. Malformed records decode to `None` and
/// count as expired, so a damaged record heals on the next increment.
fn decode_count(bytes: &[u8]) -> Option<(u64, i64)> {
    if bytes.len() != COUNT_RECORD_LEN {
        return None;
    }
    let count = u64::from_be_bytes(bytes[..8].try_into().ok()?);
    let expires_at_ms = i64::from_be_bytes(bytes[8..].try_into().ok()?);
    Some((count, expires_at_ms))
}

fn device_key(principal: &str, fingerprint: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(principal.len() + 1 + fingerprint.len());
    key.extend_from_slice(principal.as_bytes());
    key.push(DEVICE_KEY_SEP);
    key.extend_from_slice(fingerprint.as_bytes());
    key
}

fn device_prefix(principal: &str) -> Vec<u8> {
    let mut prefix = Vec::with_capacity(principal.len() + 1);
    prefix.extend_from_slice(principal.as_bytes());
    prefix.push(DEVICE_KEY_SEP);
    prefix
}

/// Sled-backed [`BehaviorStore`].
///
/// Cloning is cheap; clones share the same underlying database.
///
/// # Example
///
/// ```rust,no_run
/// # async fn demo() -> trustgate_store::Result<()> {
/// use trustgate_store::{BehaviorStore, SledBehaviorStore};
///
/// let store = SledBehaviorStore::open("./trustgate.db")?;
/// store.set_last_ip("alice", "203.0.113.7".parse().unwrap()).await?;
/// assert!(!store.is_known_device("alice", "fingerprint").await?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SledBehaviorStore {
    db: sled::Db,
    last_ips: sled::Tree,
    access_counts: sled::Tree,
    devices: sled::Tree,
    trust_scores: sled::Tree,
}

impl SledBehaviorStore {
    /// Opens or creates a behavioral database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the path is invalid,
    /// permissions are insufficient, or the database is corrupted.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path)?;
        Self::with_db(db)
    }

    /// Creates a temporary store for testing. All state is lost when
    /// the store is dropped.
    pub fn temporary() -> Result<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::with_db(db)
    }

    fn with_db(db: sled::Db) -> Result<Self> {
        let last_ips = db.open_tree(IP_TREE)?;
        let access_counts = db.open_tree(COUNT_TREE)?;
        let devices = db.open_tree(DEVICE_TREE)?;
        let trust_scores = db.open_tree(SCORE_TREE)?;

        Ok(SledBehaviorStore {
            db,
            last_ips,
            access_counts,
            devices,
            trust_scores,
        })
    }

    /// Opens the capped decision log backed by the same database.
    pub fn decision_log(&self, capacity: usize) -> Result<DecisionLog> {
        let entries = self.db.open_tree(LOG_TREE)?;
        Ok(DecisionLog::from_parts(self.db.clone(), entries, capacity))
    }

    /// Flushes all pending writes to disk and returns the number of
    /// bytes flushed. Sled persists asynchronously by default.
    pub fn flush(&self) -> Result<usize> {
        Ok(self.db.flush()?)
    }
}

#[async_trait]
impl BehaviorStore for SledBehaviorStore {
    async fn last_ip(&self, principal: &str) -> Result<Option<IpAddr>> {
        match self.last_ips.get(principal.as_bytes())? {
            Some(bytes) => {
                let text = std::str::from_utf8(&bytes)
                    .map_err(|_| StoreError::corrupt(IP_TREE, principal))?;
                let ip = text
                    .parse()
                    .map_err(|_| StoreError::corrupt(IP_TREE, principal))?;
                Ok(Some(ip))
            }
            None => Ok(None),
        }
    }

    async fn set_last_ip(&self, principal: &str, ip: IpAddr) -> Result<()> {
        self.last_ips
            .insert(principal.as_bytes(), ip.to_string().as_bytes())?;
        Ok(())
    }

    async fn increment_access_count(&self, principal: &str, window: Duration) -> Result<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        let expires_at_ms = now_ms.saturating_add(window_ms);

        let updated = self
            .access_counts
            .update_and_fetch(principal.as_bytes(), |old| {
                let next = match old.and_then(decode_count) {
                    Some((count, deadline)) if deadline > now_ms => count.saturating_add(1),
                    _ => 1,
                };
                Some(encode_count(next, expires_at_ms).to_vec())
            })?;

        // The closure always writes a fresh record, so the fetched
        // value is present and well-formed.
        updated
            .as_deref()
            .and_then(decode_count)
            .map(|(count, _)| count)
            .ok_or_else(|| StoreError::corrupt(COUNT_TREE, principal))
    }

    async fn access_count(&self, principal: &str) -> Result<u64> {
        let now_ms = Utc::now().timestamp_millis();
        match self.access_counts.get(principal.as_bytes())? {
            Some(bytes) => Ok(match decode_count(&bytes) {
                Some((count, deadline)) if deadline > now_ms => count,
                _ => 0,
            }),
            None => Ok(0),
        }
    }

    async fn is_known_device(&self, principal: &str, fingerprint: &str) -> Result<bool> {
        Ok(self.devices.contains_key(device_key(principal, fingerprint))?)
    }

    async fn register_device(&self, principal: &str, fingerprint: &str) -> Result<()> {
        self.devices.insert(device_key(principal, fingerprint), &[])?;
        Ok(())
    }

    async fn known_devices(&self, principal: &str) -> Result<Vec<String>> {
        let prefix = device_prefix(principal);
        let mut devices = Vec::new();

        for entry in self.devices.scan_prefix(&prefix) {
            let (key, _) = entry?;
            let fingerprint = std::str::from_utf8(&key[prefix.len()..])
                .map_err(|_| StoreError::corrupt(DEVICE_TREE, principal))?;
            devices.push(fingerprint.to_string());
        }

        Ok(devices)
    }

    async fn last_trust_score(&self, principal: &str) -> Result<Option<u8>> {
        match self.trust_scores.get(principal.as_bytes())? {
            Some(bytes) => {
                if bytes.len() != 1 {
                    return Err(StoreError::corrupt(SCORE_TREE, principal));
                }
                Ok(Some(bytes[0]))
            }
            None => Ok(None),
        }
    }

    async fn set_last_trust_score(&self, principal: &str, score: u8) -> Result<()> {
        self.trust_scores.insert(principal.as_bytes(), &[score])?;
        Ok(())
    }
}

impl std::fmt::Debug for SledBehaviorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SledBehaviorStore")
            .field("tracked_principals", &self.trust_scores.len())
            .finish()
    }
}
