//! Fixed-capacity outcome history.

use std::sync::{Mutex, PoisonError};

use super::status::Outcome;

/// Number of outcomes kept per check unless configured otherwise.
pub const DEFAULT_HISTORY_CAPACITY: usize = 5;

/// Circular buffer of the most recent outcomes of one check.
///
/// Slots are written in order; once every slot holds an outcome the oldest one
/// is overwritten. The buffer is internally synchronized, so `put` and
/// `snapshot` may be called concurrently from different tasks.
#[derive(Debug)]
pub struct HistoryRing {
    inner: Mutex<RingSlots>,
}

#[derive(Debug)]
struct RingSlots {
    slots: Vec<Option<Outcome>>,
    /// Index of the slot the next `put` writes to.
    head: usize,
    len: usize,
}

impl HistoryRing {
    /// Create a ring with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a ring holding at most `capacity` outcomes (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(RingSlots {
                slots: vec![None; capacity],
                head: 0,
                len: 0,
            }),
        }
    }

    /// Maximum number of stored outcomes.
    pub fn capacity(&self) -> usize {
        self.lock().slots.len()
    }

    /// Number of stored outcomes.
    pub fn len(&self) -> usize {
        self.lock().len
    }

    /// Returns true before the first `put`.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store an outcome, evicting the oldest one when full.
    pub fn put(&self, outcome: Outcome) {
        let mut ring = self.lock();
        let capacity = ring.slots.len();
        let head = ring.head;

        ring.slots[head] = Some(outcome);
        ring.head = (head + 1) % capacity;
        ring.len = (ring.len + 1).min(capacity);
    }

    /// Most recently stored outcome, or `None` before the first `put`.
    pub fn last(&self) -> Option<Outcome> {
        let ring = self.lock();
        if ring.len == 0 {
            return None;
        }

        let capacity = ring.slots.len();
        let idx = (ring.head + capacity - 1) % capacity;
        ring.slots[idx].clone()
    }

    /// All stored outcomes, most recent first. Empty before the first `put`.
    pub fn snapshot(&self) -> Vec<Outcome> {
        let ring = self.lock();
        let capacity = ring.slots.len();

        (1..=ring.len)
            .filter_map(|back| {
                let idx = (ring.head + capacity - back) % capacity;
                ring.slots[idx].clone()
            })
            .collect()
    }

    /// Stored outcomes excluding the most recent one, most recent first.
    pub fn previous(&self) -> Vec<Outcome> {
        let mut outcomes = self.snapshot();
        if !outcomes.is_empty() {
            outcomes.remove(0);
        }
        outcomes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RingSlots> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new()
    }
}
