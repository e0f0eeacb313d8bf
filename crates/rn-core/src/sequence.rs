//! Monotonic request counters used to discard stale responses
//!
//! Each logical request stream (search, route, reverse geocode) owns one
//! [`SequenceCounter`]. A response is applied only when its [`Seq`] is still
//! the latest one issued on its stream; anything older is inert.

use std::fmt;
use serde::{Serialize, Deserialize};

/// Sequence number attached to an issued request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Seq(pub u64);

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues increasing sequence numbers for one request stream
#[derive(Debug, Clone, Default)]
pub struct SequenceCounter {
    latest: u64,
}

impl SequenceCounter {
    /// Create a counter that has issued nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next sequence number
    pub fn issue(&mut self) -> Seq {
        self.latest += 1;
        Seq(self.latest)
    }

    /// Make every sequence number issued so far stale without issuing a new request
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    /// Whether `seq` is the most recently issued number
    pub fn is_current(&self, seq: Seq) -> bool {
        seq.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_is_current() {
        let mut counter = SequenceCounter::new();
        let first = counter.issue();
        let second = counter.issue();

        assert!(first < second);
        assert!(!counter.is_current(first));
        assert!(counter.is_current(second));
    }

    #[test]
    fn test_invalidate_stales_everything() {
        let mut counter = SequenceCounter::new();
        let seq = counter.issue();
        counter.invalidate();

        assert!(!counter.is_current(seq));
        let next = counter.issue();
        assert!(counter.is_current(next));
    }
}
