//! Small mutex-guarded counter registry shared by the store writer and the
//! admission controller, exposed via periodic interval diffs.

use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, Default)]
struct Counter {
    cumulative: u64,
    last_reported: u64,
}

/// A named set of monotonically increasing counters. Every counter supports
/// both a cumulative read and a since-last-`diff` read, matching the
/// original collector's "single mutex guarding a small counter struct,
/// diffed on a periodic timer" pattern.
#[derive(Debug, Default)]
pub struct IntrospectCounters {
    counters: Mutex<HashMap<String, Counter>>,
}

impl IntrospectCounters {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// Adds `delta` to the named counter, creating it at zero first if
    /// necessary.
    pub fn incr(&self, name: &str, delta: u64) {
        let mut counters = self.counters.lock().expect("counters mutex poisoned");
        let entry = counters.entry(name.to_string()).or_default();
        entry.cumulative += delta;
    }

    /// Returns `(cumulative, diff_since_last_call)` for the named counter,
    /// resetting the diff baseline. A counter that has never been
    /// incremented reads as `(0, 0)`.
    pub fn diff(&self, name: &str) -> (u64, u64) {
        let mut counters = self.counters.lock().expect("counters mutex poisoned");
        let entry = counters.entry(name.to_string()).or_default();
        let diff = entry.cumulative - entry.last_reported;
        entry.last_reported = entry.cumulative;
        (entry.cumulative, diff)
    }

    /// Returns the cumulative value of the named counter without touching
    /// the diff baseline.
    pub fn cumulative(&self, name: &str) -> u64 {
        let counters = self.counters.lock().expect("counters mutex poisoned");
        counters.get(name).map(|c| c.cumulative).unwrap_or(0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn diff_resets_baseline() {
        let counters = IntrospectCounters::new();
        counters.incr("dropped", 3);
        counters.incr("dropped", 2);
        assert_eq!(counters.diff("dropped"), (5, 5));
        counters.incr("dropped", 1);
        assert_eq!(counters.diff("dropped"), (6, 1));
    }

    #[test]
    fn unknown_counter_reads_zero() {
        let counters = IntrospectCounters::new();
        assert_eq!(counters.diff("nope"), (0, 0));
        assert_eq!(counters.cumulative("nope"), 0);
    }
}
