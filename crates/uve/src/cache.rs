//! The session-counter cache: the last-seen cumulative counters for every
//! open session, used to turn cumulative counter updates into differential
//! metric emissions.

use std::collections::{HashMap, VecDeque};

/// The five cumulative traffic counters carried by every vol-update/close
/// message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Total bytes transferred (both directions).
    pub total_bytes: i64,
    /// Bytes from the client.
    pub bytes_from_client: i64,
    /// Bytes from the server.
    pub bytes_from_server: i64,
    /// Packets from the client.
    pub packets_from_client: i64,
    /// Packets from the server.
    pub packets_from_server: i64,
}

impl Counters {
    /// Returns the element-wise difference `self - other`.
    pub fn diff(&self, other: &Counters) -> Counters {
        Counters {
            total_bytes: self.total_bytes - other.total_bytes,
            bytes_from_client: self.bytes_from_client - other.bytes_from_client,
            bytes_from_server: self.bytes_from_server - other.bytes_from_server,
            packets_from_client: self.packets_from_client - other.packets_from_client,
            packets_from_server: self.packets_from_server - other.packets_from_server,
        }
    }

    /// Whether `self` is not behind `previous` on either of the two
    /// monotonicity-guarded fields (`total_bytes`, `packets_from_client`).
    pub fn is_monotonic_from(&self, previous: &Counters) -> bool {
        self.total_bytes >= previous.total_bytes && self.packets_from_client >= previous.packets_from_client
    }
}

/// Builds the composite cache key `tenant::location::device::session-id-32`.
pub fn session_key(tenant: &str, location: &str, device: &str, session_id_32: i64) -> String {
    format!("{tenant}::{location}::{device}::{session_id_32}")
}

/// A bounded, single-mutex-guarded map from session key to the last-seen
/// cumulative counters, with oldest-entry eviction once the configured
/// maximum is reached.
pub struct SessionCounterCache {
    max_entries: usize,
    entries: HashMap<String, Counters>,
    order: VecDeque<String>,
}

impl SessionCounterCache {
    /// Creates a cache holding at most `max_entries` sessions.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Number of sessions currently cached.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Applies a non-close update for `key`, diffing against the session's
    /// last-seen cumulative (an absent session is treated as a zero
    /// baseline, so its first update's diff equals its raw cumulative).
    ///
    /// Returns `None` only when the update regresses the stored baseline;
    /// such updates are rejected and logged, and the baseline is left
    /// untouched.
    pub fn update(&mut self, key: &str, cumulative: Counters) -> Option<Counters> {
        let previous = self.entries.get(key).copied().unwrap_or_default();
        if !cumulative.is_monotonic_from(&previous) {
            tracing::warn!(session = %key, "rejecting regressing session counter update");
            return None;
        }
        let diff = cumulative.diff(&previous);
        self.insert_new(key, cumulative);
        Some(diff)
    }

    /// Applies the final update on session close, emitting one last diff
    /// against whatever baseline is cached (a zero baseline if this
    /// session was never seen before), then removes the entry.
    pub fn close(&mut self, key: &str, cumulative: Counters) -> Option<Counters> {
        let previous = self.entries.remove(key).unwrap_or_default();
        self.order.retain(|k| k != key);
        if !cumulative.is_monotonic_from(&previous) {
            tracing::warn!(session = %key, "rejecting regressing session close");
            return None;
        }
        Some(cumulative.diff(&previous))
    }

    fn insert_new(&mut self, key: &str, cumulative: Counters) {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            if let Some(oldest) = self.order.pop_front() {
                let _ = self.entries.remove(&oldest);
                tracing::warn!(session = %oldest, "session-counter cache full, evicting oldest entry");
            }
        }
        if self.entries.insert(key.to_string(), cumulative).is_none() {
            self.order.push_back(key.to_string());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn first_update_diffs_against_a_zero_baseline() {
        let mut cache = SessionCounterCache::new(8);
        let emitted = cache
            .update(
                "k",
                Counters {
                    total_bytes: 1000,
                    packets_from_client: 10,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(emitted.total_bytes, 1000);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn scenario_vol_update_then_close_emits_full_then_remaining_diff() {
        let mut cache = SessionCounterCache::new(8);
        let key = session_key("acme", "east", "dev1", 7);

        let first = cache
            .update(
                &key,
                Counters {
                    total_bytes: 1000,
                    bytes_from_client: 600,
                    bytes_from_server: 400,
                    packets_from_client: 10,
                    packets_from_server: 9,
                },
            )
            .unwrap();
        assert_eq!(first, Counters {
            total_bytes: 1000,
            bytes_from_client: 600,
            bytes_from_server: 400,
            packets_from_client: 10,
            packets_from_server: 9,
        });

        let second = cache
            .close(
                &key,
                Counters {
                    total_bytes: 1500,
                    bytes_from_client: 900,
                    bytes_from_server: 600,
                    packets_from_client: 15,
                    packets_from_server: 14,
                },
            )
            .unwrap();
        assert_eq!(second, Counters {
            total_bytes: 500,
            bytes_from_client: 300,
            bytes_from_server: 200,
            packets_from_client: 5,
            packets_from_server: 5,
        });
        assert!(cache.is_empty());
    }

    #[test]
    fn subsequent_update_emits_diff_and_rejects_regression() {
        let mut cache = SessionCounterCache::new(8);
        let _ = cache.update(
            "k",
            Counters {
                total_bytes: 1000,
                bytes_from_client: 600,
                bytes_from_server: 400,
                packets_from_client: 10,
                packets_from_server: 9,
            },
        );
        let diff = cache
            .update(
                "k",
                Counters {
                    total_bytes: 1500,
                    bytes_from_client: 900,
                    bytes_from_server: 600,
                    packets_from_client: 15,
                    packets_from_server: 14,
                },
            )
            .unwrap();
        assert_eq!(diff.total_bytes, 500);
        assert_eq!(diff.bytes_from_client, 300);

        let rejected = cache.update(
            "k",
            Counters {
                total_bytes: 1400,
                packets_from_client: 14,
                ..Default::default()
            },
        );
        assert!(rejected.is_none());
    }

    #[test]
    fn close_emits_final_diff_and_removes_entry() {
        let mut cache = SessionCounterCache::new(8);
        let _ = cache.update(
            "k",
            Counters {
                total_bytes: 1000,
                bytes_from_client: 600,
                bytes_from_server: 400,
                packets_from_client: 10,
                packets_from_server: 9,
            },
        );
        let diff = cache
            .close(
                "k",
                Counters {
                    total_bytes: 1500,
                    bytes_from_client: 900,
                    bytes_from_server: 600,
                    packets_from_client: 15,
                    packets_from_server: 14,
                },
            )
            .unwrap();
        assert_eq!(diff.total_bytes, 500);
        assert!(cache.is_empty());
    }

    #[test]
    fn oldest_entry_is_evicted_on_overflow() {
        let mut cache = SessionCounterCache::new(2);
        let _ = cache.update("a", Counters::default());
        let _ = cache.update("b", Counters::default());
        let _ = cache.update("c", Counters::default());
        assert_eq!(cache.len(), 2);
        assert!(!cache.entries.contains_key("a"));
    }
}
