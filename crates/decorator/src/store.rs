//! The enrichment lookup tables, published as immutable snapshots.
//!
//! Per the "publish immutable snapshots behind a single atomic handle"
//! design note: readers (the decorator, on the hot path) never take a lock;
//! an update swaps in a whole new snapshot behind an [`arc_swap::ArcSwap`].

use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use collector_model::{HostnameRecord, SlaProfileKey, SlaProfileRecord, TenantRecord};

/// A consistent, point-in-time view of every enrichment lookup table.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentSnapshot {
    /// Hostname -> `HostnameRecord`.
    pub hostnames: HashMap<String, HostnameRecord>,
    /// Tenant -> `TenantRecord`.
    pub tenants: HashMap<String, TenantRecord>,
    /// `(tenant, device, sla-profile)` -> `SlaProfileRecord`.
    pub sla_profiles: HashMap<SlaProfileKey, SlaProfileRecord>,
}

/// Holds the current [`EnrichmentSnapshot`] behind an atomic handle.
///
/// Updates are whole-snapshot replacements rather than per-key mutations:
/// the config subsystem builds a new snapshot off to the side and swaps it
/// in, so a decorator mid-lookup always sees a fully consistent table.
#[derive(Default)]
pub struct EnrichmentStore {
    current: ArcSwap<EnrichmentSnapshot>,
}

impl EnrichmentStore {
    /// Creates a store with an empty snapshot; every lookup misses until
    /// `publish` is called.
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(EnrichmentSnapshot::default()),
        }
    }

    /// Returns the currently published snapshot.
    pub fn snapshot(&self) -> Arc<EnrichmentSnapshot> {
        self.current.load_full()
    }

    /// Replaces the published snapshot wholesale.
    pub fn publish(&self, snapshot: EnrichmentSnapshot) {
        self.current.store(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn publish_replaces_the_whole_snapshot() {
        let store = EnrichmentStore::new();
        assert!(store.snapshot().hostnames.is_empty());

        let mut snapshot = EnrichmentSnapshot::default();
        let _ = snapshot.hostnames.insert("router-1".to_string(), HostnameRecord::default());
        store.publish(snapshot);

        assert!(store.snapshot().hostnames.contains_key("router-1"));
    }
}
