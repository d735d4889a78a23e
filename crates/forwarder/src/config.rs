//! Per-exporter-instance configuration, taken from the pipeline YAML.

use serde::Deserialize;

/// One stream destination to mirror decorated frames to.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamDestination {
    /// `host:port` of the destination.
    pub address: String,
}

fn default_reconnect_interval_secs() -> u64 {
    10
}

/// Forwarder exporter configuration: the set of stream destinations, the
/// reconnect-timer period, and whether decorated records are also
/// published to the injected [`crate::bus::MessageBusSink`].
#[derive(Debug, Clone, Deserialize)]
pub struct ForwarderConfig {
    /// Stream destinations mirrored to. Empty when only the message bus
    /// is used.
    #[serde(default)]
    pub stream_destinations: Vec<StreamDestination>,

    /// How often a disconnected stream destination retries its connect,
    /// independent of message traffic (spec §5: "Forwarder connections
    /// implement their own poll-and-reconnect timer independent of
    /// request traffic").
    #[serde(default = "default_reconnect_interval_secs")]
    pub reconnect_interval_secs: u64,

    /// Whether decorated records are published to the injected message
    /// bus sink, in addition to (or instead of) stream mirroring.
    #[serde(default)]
    pub publish_to_message_bus: bool,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            stream_destinations: Vec::new(),
            reconnect_interval_secs: default_reconnect_interval_secs(),
            publish_to_message_bus: false,
        }
    }
}
