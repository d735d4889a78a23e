//! Startup configuration: the flags the collector is given once, at
//! process launch, as opposed to the message-type table which keeps
//! arriving over the `"udc"` subscription (see [`crate::subscriber`]).

use std::collections::HashMap;

use collector_model::{TtlClass, WaterMarkTuple};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default keyspace name, optionally suffixed with `_<cluster_id>`.
pub const DEFAULT_KEYSPACE: &str = "COLLECTOR_KEYSPACE_CQL";

/// How a column family is compacted. Named after the strategies the
/// wide-column store this collector targets actually exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompactionStrategy {
    /// Good default for write-heavy, rarely-updated column families.
    SizeTiered,
    /// Better for column families with frequent overwrites.
    Leveled,
    /// Time-windowed compaction, used for TTL'd, append-only data such as
    /// flow tables.
    TimeWindow,
}

/// TLS material for the store connection. `None` fields mean "use the
/// platform trust store" / "no client cert".
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct TlsSettings {
    /// Enables TLS on the store connection.
    #[serde(default)]
    pub enabled: bool,
    /// Path to a CA bundle used to verify the store's certificate.
    pub ca_cert_path: Option<String>,
    /// Path to a client certificate, for mutual TLS.
    pub client_cert_path: Option<String>,
    /// Path to the client certificate's private key.
    pub client_key_path: Option<String>,
}

/// Credentials used to authenticate against the store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreCredentials {
    /// Store username.
    #[validate(length(min = 1))]
    pub username: String,
    /// Store password.
    #[validate(length(min = 1))]
    pub password: String,
}

/// Global write-disable switches, checked by the admission controller
/// before column assembly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct WriteSwitches {
    /// Short-circuits every write.
    #[serde(default)]
    pub disable_all_db_writes: bool,
    /// Short-circuits stats-table writes only.
    #[serde(default)]
    pub disable_db_stats_writes: bool,
    /// Short-circuits message-table writes only.
    #[serde(default)]
    pub disable_db_messages_writes: bool,
}

/// The three watermark-governed signals the admission controller
/// monitors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WatermarkSettings {
    /// Store submission queue depth.
    pub queue_depth: WaterMarkTuple,
    /// Disk-usage percentage.
    pub disk_usage_pct: WaterMarkTuple,
    /// Pending-compaction task count.
    pub pending_compactions: WaterMarkTuple,
}

/// Startup configuration for the collector: store endpoints, credentials,
/// TLS, TTLs, compaction strategy, watermarks, and the global write
/// switches. Loaded once and handed to every pipeline stage that needs it.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartupConfig {
    /// Store contact points, `host:port`.
    #[validate(length(min = 1))]
    pub store_endpoints: Vec<String>,

    /// Optional store credentials.
    #[validate]
    pub credentials: Option<StoreCredentials>,

    /// TLS material for the store connection.
    #[validate]
    #[serde(default)]
    pub tls: TlsSettings,

    /// Distinguishes this collector's keyspace from others sharing the
    /// same store cluster; appended as `_<cluster_id>` to
    /// [`DEFAULT_KEYSPACE`] when non-empty.
    #[serde(default)]
    pub cluster_id: String,

    /// TTL, in hours, for each TTL class.
    pub ttl_hours: HashMap<TtlClass, u32>,

    /// Compaction strategy applied to every column family by default.
    pub compaction_strategy: CompactionStrategy,

    /// Compaction strategy override for flow-related tables; falls back to
    /// `compaction_strategy` when absent.
    pub flow_compaction_strategy: Option<CompactionStrategy>,

    /// Admission-controller watermark triples, one per monitored signal.
    #[serde(default)]
    pub watermarks: WatermarkSettings,

    /// Global write-disable switches.
    #[serde(default)]
    pub write_switches: WriteSwitches,

    /// Whether the initializer should coordinate schema creation with
    /// peers via a distributed lock before probing/creating schema.
    #[serde(default = "default_true")]
    pub coordinate_with_peers: bool,
}

fn default_true() -> bool {
    true
}

impl StartupConfig {
    /// Returns the keyspace name to use, suffixing [`DEFAULT_KEYSPACE`]
    /// with the cluster ID when one is configured.
    pub fn keyspace_name(&self) -> String {
        if self.cluster_id.is_empty() {
            DEFAULT_KEYSPACE.to_string()
        } else {
            format!("{DEFAULT_KEYSPACE}_{}", self.cluster_id)
        }
    }

    /// Returns the compaction strategy for flow tables, falling back to
    /// the generic strategy when no override is configured.
    pub fn compaction_strategy_for_flow(&self) -> CompactionStrategy {
        self.flow_compaction_strategy.unwrap_or(self.compaction_strategy)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn keyspace_name_appends_cluster_suffix_only_when_set() {
        let mut config = sample();
        assert_eq!(config.keyspace_name(), DEFAULT_KEYSPACE);
        config.cluster_id = "east1".to_string();
        assert_eq!(config.keyspace_name(), "COLLECTOR_KEYSPACE_CQL_east1");
    }

    #[test]
    fn flow_compaction_falls_back_to_generic() {
        let config = sample();
        assert_eq!(config.compaction_strategy_for_flow(), CompactionStrategy::SizeTiered);
    }

    fn sample() -> StartupConfig {
        StartupConfig {
            store_endpoints: vec!["127.0.0.1:9042".to_string()],
            credentials: None,
            tls: TlsSettings::default(),
            cluster_id: String::new(),
            ttl_hours: HashMap::new(),
            compaction_strategy: CompactionStrategy::SizeTiered,
            flow_compaction_strategy: None,
            watermarks: WatermarkSettings::default(),
            write_switches: WriteSwitches::default(),
            coordinate_with_peers: true,
        }
    }
}
