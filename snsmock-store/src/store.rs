//! Bounded, multi-indexed in-memory capture store.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use snsmock_core::{CaptureError, CapturedMessage};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Default capacity when none is configured.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Thread-safe bounded repository of captured messages.
///
/// One readers-writer lock covers all three indices and the insertion
/// order; every mutation touches them together and the cross-index
/// invariants require atomicity. Readers clone `Arc` handles out under the
/// read lock, so returned sequences are snapshots: later mutations do not
/// affect them.
///
/// Eviction is strict FIFO by insertion order. Records are immutable once
/// inserted; re-inserting an existing id replaces the prior record and
/// moves it to the newest position.
pub struct CaptureStore {
    capacity: usize,
    inner: RwLock<Indexes>,
}

#[derive(Default)]
struct Indexes {
    /// Insertion order, oldest at the front.
    order: VecDeque<Arc<CapturedMessage>>,
    /// Primary index, exactly one entry per live record.
    by_id: HashMap<String, Arc<CapturedMessage>>,
    /// Per-topic sequences, insertion order within each topic.
    by_topic: HashMap<String, Vec<Arc<CapturedMessage>>>,
}

impl Indexes {
    /// Removes the record with `id` from all three indices.
    fn unlink(&mut self, id: &str) {
        let Some(removed) = self.by_id.remove(id) else {
            return;
        };
        if let Some(pos) = self.order.iter().position(|m| m.id == removed.id) {
            self.order.remove(pos);
        }
        if let Some(seq) = self.by_topic.get_mut(&removed.topic) {
            seq.retain(|m| m.id != removed.id);
            if seq.is_empty() {
                self.by_topic.remove(&removed.topic);
            }
        }
    }
}

impl CaptureStore {
    /// Creates a store with the default capacity.
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            inner: RwLock::new(Indexes::default()),
        }
    }

    /// Creates a store bounded at `capacity` records.
    ///
    /// A zero capacity is rejected synchronously.
    pub fn with_capacity(capacity: usize) -> Result<Self, CaptureError> {
        if capacity == 0 {
            return Err(CaptureError::invalid_parameter("capacity"));
        }
        Ok(Self {
            capacity,
            inner: RwLock::new(Indexes::default()),
        })
    }

    /// Inserts a record at the newest position.
    ///
    /// If the record's id is already live, the prior record is removed
    /// first, so the id moves to the newest position with refreshed
    /// content. If the store is full, the oldest record is evicted
    /// silently. Never fails due to capacity; a failed insert leaves the
    /// store unchanged.
    pub fn add(&self, message: CapturedMessage) -> Result<(), CaptureError> {
        if message.id.is_empty() || message.topic.is_empty() {
            return Err(CaptureError::NullMessage);
        }

        let message = Arc::new(message);
        let mut inner = self.inner.write();

        if inner.by_id.contains_key(&message.id) {
            inner.unlink(&message.id);
        } else if inner.order.len() == self.capacity {
            if let Some(oldest) = inner.order.front().map(|m| m.id.clone()) {
                inner.unlink(&oldest);
            }
        }

        inner.by_id.insert(message.id.clone(), message.clone());
        inner
            .by_topic
            .entry(message.topic.clone())
            .or_default()
            .push(message.clone());
        inner.order.push_back(message);

        Ok(())
    }

    /// Returns all live records, oldest first.
    pub fn get_all(&self) -> Vec<Arc<CapturedMessage>> {
        self.inner.read().order.iter().cloned().collect()
    }

    /// Returns the records published to `topic`, in insertion order.
    ///
    /// An unknown topic yields an empty sequence, not an error.
    pub fn get_by_topic(&self, topic: &str) -> Result<Vec<Arc<CapturedMessage>>, CaptureError> {
        if topic.is_empty() {
            return Err(CaptureError::NullTopic);
        }
        Ok(self
            .inner
            .read()
            .by_topic
            .get(topic)
            .cloned()
            .unwrap_or_default())
    }

    /// Returns the records with `start <= timestamp <= end`, oldest first.
    ///
    /// A degenerate range (`start > end`) yields an empty sequence. The
    /// store keeps no time index; this is a linear scan over the order.
    pub fn get_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<Arc<CapturedMessage>> {
        if start > end {
            return Vec::new();
        }
        self.inner
            .read()
            .order
            .iter()
            .filter(|m| m.timestamp >= start && m.timestamp <= end)
            .cloned()
            .collect()
    }

    /// Returns the record with `id`.
    pub fn get_by_id(&self, id: &str) -> Result<Arc<CapturedMessage>, CaptureError> {
        if id.is_empty() {
            return Err(CaptureError::NullMessageId);
        }
        self.inner
            .read()
            .by_id
            .get(id)
            .cloned()
            .ok_or_else(|| CaptureError::NotFound { id: id.to_string() })
    }

    /// Returns the earliest live record matching `(topic, dedup_id)`.
    ///
    /// This is the probe the publish path uses to collapse repeated
    /// publishes carrying the same deduplication id within a topic.
    pub fn find_duplicate(&self, topic: &str, dedup_id: &str) -> Option<Arc<CapturedMessage>> {
        self.inner
            .read()
            .by_topic
            .get(topic)?
            .iter()
            .find(|m| m.dedup_id.as_deref() == Some(dedup_id))
            .cloned()
    }

    /// Drops all records. Capacity is unchanged.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.order.clear();
        inner.by_id.clear();
        inner.by_topic.clear();
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// Returns true if no records are live.
    pub fn is_empty(&self) -> bool {
        self.inner.read().order.is_empty()
    }

    /// Maximum number of live records.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Checks the cross-index invariants. Test-only.
    #[cfg(test)]
    fn assert_invariants(&self) {
        let inner = self.inner.read();

        assert_eq!(inner.order.len(), inner.by_id.len());
        assert!(inner.order.len() <= self.capacity);

        let order_ids: Vec<&str> = inner.order.iter().map(|m| m.id.as_str()).collect();
        let unique: std::collections::HashSet<&str> = order_ids.iter().copied().collect();
        assert_eq!(unique.len(), order_ids.len(), "duplicate id in order");

        for handle in &inner.order {
            let by_id = inner.by_id.get(&handle.id).expect("order entry not in by_id");
            assert!(Arc::ptr_eq(by_id, handle));
            let seq = inner
                .by_topic
                .get(&handle.topic)
                .expect("order entry not in by_topic");
            assert!(seq.iter().any(|m| Arc::ptr_eq(m, handle)));
        }

        for (topic, seq) in &inner.by_topic {
            assert!(!seq.is_empty(), "empty topic sequence for {topic}");
            for handle in seq {
                assert_eq!(&handle.topic, topic);
                assert!(inner.order.iter().any(|m| Arc::ptr_eq(m, handle)));
            }
            // Per-topic order must agree with the global order.
            let positions: Vec<usize> = seq
                .iter()
                .map(|m| inner.order.iter().position(|o| Arc::ptr_eq(o, m)).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

impl Default for CaptureStore {
    fn default() -> Self {
        Self::new()
    }
}
