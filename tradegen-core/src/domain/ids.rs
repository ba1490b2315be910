use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Trade identifier. Positive, assigned in ascending order, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(pub u64);

impl TradeId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for TradeId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic trade id counter.
///
/// Owned by the generator rather than living in a global. The counter is
/// atomic so a sequence can be shared by reference between threads; every
/// call to [`IdSequence::next_id`] hands out a distinct id.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicU64,
}

impl IdSequence {
    /// A sequence whose first id is 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// A sequence whose first id is `first`. Ids are positive, so 0 is rejected.
    pub fn starting_at(first: u64) -> Self {
        assert!(first > 0, "trade ids start at 1 or above");
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// Take the next id and advance the counter.
    pub fn next_id(&self) -> TradeId {
        TradeId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// The id the next call to `next_id` will return.
    pub fn peek(&self) -> TradeId {
        TradeId(self.next.load(Ordering::Relaxed))
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
