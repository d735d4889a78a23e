//! The message-type table and the subscription interface that keeps it
//! current.
//!
//! Unlike [`crate::startup::StartupConfig`], this table is not fixed at
//! process launch: it is pushed by an external configuration delivery
//! system over a subscription keyed by topic name `"udc"`
//! (user-defined-counter configuration). The store/lock/RPC layers that
//! actually carry that subscription are opaque collaborators; this crate
//! only defines the shape of what arrives and where it lands.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use collector_model::MessageTypeConfig;

/// Topic name the message-type table is delivered under.
pub const MESSAGE_TYPE_TOPIC: &str = "udc";

/// Receives `MessageTypeConfig` updates from the opaque configuration
/// delivery system and applies them to a [`MessageTypeTable`].
///
/// Implemented by whatever wires this collector to its configuration
/// source; the collector's own code only calls `apply` - it never
/// originates entries.
pub trait ConfigSubscriber: Send + Sync {
    /// Applies one `(tag, config)` update delivered on the `"udc"` topic.
    fn apply(&self, tag: String, config: MessageTypeConfig);
}

/// A concurrently-readable table of [`MessageTypeConfig`] keyed by tag,
/// with unknown tags falling back to [`MessageTypeConfig::disabled`].
///
/// Reads are lock-free in the common case in spirit with the
/// enrichment-snapshot design used elsewhere in this pipeline, though here
/// a `RwLock` is used directly rather than an atomic swap: the table is
/// updated per-tag rather than wholesale, so there is no single snapshot
/// to swap.
#[derive(Clone, Default)]
pub struct MessageTypeTable {
    inner: Arc<RwLock<HashMap<String, MessageTypeConfig>>>,
}

impl MessageTypeTable {
    /// Creates an empty table; every lookup falls back to `disabled()`
    /// until entries are applied.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the config for `tag`, or a disabled default if unknown.
    pub fn get(&self, tag: &str) -> MessageTypeConfig {
        self.inner
            .read()
            .expect("message-type table lock poisoned")
            .get(tag)
            .cloned()
            .unwrap_or_else(|| MessageTypeConfig::disabled(tag))
    }

    /// Inserts or replaces the config for `tag`.
    pub fn set(&self, tag: String, config: MessageTypeConfig) {
        let _ = self.inner.write().expect("message-type table lock poisoned").insert(tag, config);
    }
}

impl ConfigSubscriber for MessageTypeTable {
    fn apply(&self, tag: String, config: MessageTypeConfig) {
        self.set(tag, config);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_tag_falls_back_to_disabled() {
        let table = MessageTypeTable::new();
        let config = table.get("UNKNOWN_TAG");
        assert_eq!(config.name, "UNKNOWN_TAG");
        assert!(!config.process_and_store);
    }

    #[test]
    fn applied_update_is_visible_to_subsequent_get() {
        let table = MessageTypeTable::new();
        let mut config = MessageTypeConfig::disabled("APPTRACK_SESSION_CLOSE");
        config.process_and_store = true;
        table.apply("APPTRACK_SESSION_CLOSE".to_string(), config);
        assert!(table.get("APPTRACK_SESSION_CLOSE").process_and_store);
    }
}
