//! Capped decision log.
//!
//! Every policy decision is appended as a JSON document to a bounded
//! log, newest retained, oldest evicted. The log is the on-box audit
//! trail; SIEM forwarding reads from the same entries.

use serde::Serialize;

use crate::error::Result;

/// A bounded, append-only log of decision events.
///
/// Entries are ordered by a database-wide monotonic sequence number.
/// Once the log exceeds its capacity the oldest entries are evicted,
/// so the log holds the most recent `capacity` decisions. Cloning is
/// cheap; clones share the same underlying tree.
#[derive(Clone)]
pub struct DecisionLog {
    db: sled::Db,
    entries: sled::Tree,
    capacity: usize,
}

impl DecisionLog {
    pub(crate) fn from_parts(db: sled::Db, entries: sled::Tree, capacity: usize) -> Self {
        DecisionLog {
            db,
            entries,
            capacity,
        }
    }

    /// Appends a serializable event and returns its sequence number.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StoreError::Serialization`] if the event cannot
    /// be encoded, or [`crate::StoreError::Backend`] on database failure.
    pub fn append<T: Serialize>(&self, event: &T) -> Result<u64> {
        let sequence = self.db.generate_id()?;
        let bytes = serde_json::to_vec(event)?;
        self.entries.insert(sequence.to_be_bytes(), bytes)?;

        while self.entries.len() > self.capacity {
            if self.entries.pop_min()?.is_none() {
                break;
            }
        }

        Ok(sequence)
    }

    /// The most recent entries, newest first, at most `limit`.
    pub fn recent(&self, limit: usize) -> Result<Vec<serde_json::Value>> {
        let mut events = Vec::with_capacity(limit.min(self.entries.len()));

        for entry in self.entries.iter().rev().take(limit) {
            let (_, value) = entry?;
            events.push(serde_json::from_slice(&value)?);
        }

        Ok(events)
    }

    /// Number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries retained.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }
}

impl std::fmt::Debug for DecisionLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionLog")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::storage::SledBehaviorStore;

    #[test]
    fn append_and_read_newest_first() {
        let store = SledBehaviorStore::temporary().unwrap();
        let log = store.decision_log(10).unwrap();
        assert!(log.is_empty());

        log.append(&json!({"seq": 1})).unwrap();
        log.append(&json!({"seq": 2})).unwrap();
        log.append(&json!({"seq": 3})).unwrap();

        let recent = log.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0]["seq"], 3);
        assert_eq!(recent[1]["seq"], 2);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let store = SledBehaviorStore::temporary().unwrap();
        let log = store.decision_log(3).unwrap();

        for seq in 1..=5 {
            log.append(&json!({"seq": seq})).unwrap();
        }

        assert_eq!(log.len(), 3);
        let recent = log.recent(10).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0]["seq"], 5);
        assert_eq!(recent[2]["seq"], 3);
    }

    #[test]
    fn structured_events_round_trip() {
        #[derive(serde::Serialize)]
        struct Event<'a> {
            principal: &'a str,
            score: u8,
        }

        let store = SledBehaviorStore::temporary().unwrap();
        let log = store.decision_log(10).unwrap();
        log.append(&Event {
            principal: "alice",
            score: 85,
        })
        .unwrap();

        let recent = log.recent(1).unwrap();
        assert_eq!(recent[0]["principal"], "alice");
        assert_eq!(recent[0]["score"], 85);
    }
}
