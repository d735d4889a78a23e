//! Per-tag message type configuration.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Processing flags and field classification for a given syslog `tag`.
///
/// Delivered in the real system by a configuration subscription on topic
/// `"udc"`; here it is either loaded from the static default table
/// (`collector_settings::default_message_types`) or from the startup
/// configuration file, using the same shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTypeConfig {
    /// Display name of the message type.
    pub name: String,
    /// Whether the message is persisted in the message/object tables.
    pub process_and_store: bool,
    /// Whether the message is mirrored to downstream forwarders.
    pub forward: bool,
    /// Whether the message feeds the UVE aggregator (session tenant/device
    /// summarization).
    pub process_and_summarize: bool,
    /// Whether the message also feeds the per-tenant user-facing
    /// summarization group.
    pub process_and_summarize_user: bool,
    /// Whether decoration must run before the record is handed to the
    /// forwarder (as opposed to forwarding the raw frame).
    pub process_before_forward: bool,
    /// Field names that must be coerced to `FieldValue::Int` at parse time.
    #[serde(default)]
    pub int_fields: HashSet<String>,
    /// Field names that become stat-table tags (dimensions) rather than
    /// plain attributes.
    #[serde(default)]
    pub tagged_fields: HashSet<String>,
}

impl MessageTypeConfig {
    /// Creates a configuration with every flag disabled and empty field
    /// sets; callers enable what applies.
    pub fn disabled(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            process_and_store: false,
            forward: false,
            process_and_summarize: false,
            process_and_summarize_user: false,
            process_before_forward: false,
            int_fields: HashSet::new(),
            tagged_fields: HashSet::new(),
        }
    }
}
