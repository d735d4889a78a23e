//! The field-names secondary index and its epoch-scoped de-duplication
//! cache (spec invariant P7): within one `T2 >> K` epoch, at most one write
//! is issued per `(table, field, value)` triple; entries older than the
//! previous epoch are dropped rather than accumulated forever.

use std::collections::HashSet;

/// Number of additional low bits of `T2` folded into the cache epoch beyond
/// `T2` itself, coarsening the granularity at which a given triple is
/// allowed to repeat (`CacheTimeInAdditionalBits` in the original system).
pub const CACHE_TIME_IN_ADDITIONAL_BITS: i64 = 4;

fn epoch_of(t2: i64) -> i64 {
    t2 >> CACHE_TIME_IN_ADDITIONAL_BITS
}

/// One `(table, field, value)` de-duplication key.
pub fn entry_key(table: &str, field: &str, value: &str) -> String {
    format!("{table}:{field}:{value}")
}

/// Single-mutex-guarded two-epoch cache: a writer is admitted only if the
/// epoch has advanced since the last write for this triple, or the triple
/// has never been seen.
pub struct FieldNamesCache {
    current_epoch: i64,
    current: HashSet<String>,
    previous: HashSet<String>,
}

impl FieldNamesCache {
    /// Creates an empty cache with no epoch established yet.
    pub fn new() -> Self {
        Self {
            current_epoch: i64::MIN,
            current: HashSet::new(),
            previous: HashSet::new(),
        }
    }

    /// Returns `true` (and records the triple) if `(table, field, value)`
    /// has not already been recorded in the current or previous epoch for
    /// `t2`; returns `false` if it was already seen and should be skipped.
    pub fn admit(&mut self, t2: i64, table: &str, field: &str, value: &str) -> bool {
        let epoch = epoch_of(t2);
        if epoch > self.current_epoch {
            self.previous = std::mem::take(&mut self.current);
            self.current_epoch = epoch;
        }
        let key = entry_key(table, field, value);
        if self.current.contains(&key) || self.previous.contains(&key) {
            return false;
        }
        let _ = self.current.insert(key);
        true
    }
}

impl Default for FieldNamesCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn same_triple_in_same_epoch_is_admitted_once() {
        let mut cache = FieldNamesCache::new();
        assert!(cache.admit(100, "message", "Messagetype", "APPTRACK_SESSION_CLOSE"));
        for _ in 0..999 {
            assert!(!cache.admit(100, "message", "Messagetype", "APPTRACK_SESSION_CLOSE"));
        }
    }

    #[test]
    fn advancing_past_previous_epoch_re_admits_the_triple() {
        let mut cache = FieldNamesCache::new();
        let epoch0_t2 = 0;
        let next_epoch_t2 = 1 << CACHE_TIME_IN_ADDITIONAL_BITS;
        let far_future_t2 = next_epoch_t2 * 3;
        assert!(cache.admit(epoch0_t2, "message", "Source", "router1"));
        assert!(!cache.admit(next_epoch_t2, "message", "Source", "router1"), "previous epoch still guards it");
        assert!(cache.admit(far_future_t2, "message", "Source", "router1"), "now two epochs stale, re-admitted");
    }
}
