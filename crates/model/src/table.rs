//! Static description of the persisted column families.

use serde::{Deserialize, Serialize};

/// TTL class a table's rows are governed by; the numeric TTL (in hours) for
/// each class is carried in the startup settings, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtlClass {
    /// Flow/session data.
    FlowData,
    /// Aggregated statistics.
    StatsData,
    /// Configuration audit trail (`VncApiConfigLog` messages).
    ConfigAudit,
    /// Everything else.
    Global,
}

/// Identifies one of the five persisted column families named in the
/// catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    /// `message` table.
    Message,
    /// `object_value` table.
    ObjectValue,
    /// `field_names` secondary index.
    FieldNames,
    /// `stats` table.
    Stats,
    /// `session` table.
    Session,
    /// `system_object` bootstrap table written by the initializer. Not part
    /// of the writer-path catalog returned by [`table_catalog`].
    SystemObject,
}

impl TableName {
    /// Returns the schema identifier used as a row-key / partition
    /// component.
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::Message => "message",
            TableName::ObjectValue => "object_value",
            TableName::FieldNames => "field_names",
            TableName::Stats => "stats",
            TableName::Session => "session",
            TableName::SystemObject => "system_object",
        }
    }
}

/// A static description of one column family: its name, TTL class, and
/// whether it maintains a secondary index.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// The table's identifier.
    pub name: TableName,
    /// The TTL class governing rows in this table.
    pub ttl_class: TtlClass,
    /// Whether a secondary index (field_names-style) is maintained for this
    /// table.
    pub has_secondary_index: bool,
}

/// The catalog of tables this collector writes to.
pub fn table_catalog() -> Vec<TableSchema> {
    vec![
        TableSchema {
            name: TableName::Message,
            ttl_class: TtlClass::Global,
            has_secondary_index: true,
        },
        TableSchema {
            name: TableName::ObjectValue,
            ttl_class: TtlClass::Global,
            has_secondary_index: false,
        },
        TableSchema {
            name: TableName::FieldNames,
            ttl_class: TtlClass::Global,
            has_secondary_index: false,
        },
        TableSchema {
            name: TableName::Stats,
            ttl_class: TtlClass::StatsData,
            has_secondary_index: true,
        },
        TableSchema {
            name: TableName::Session,
            ttl_class: TtlClass::FlowData,
            has_secondary_index: true,
        },
    ]
}

/// Maximum number of object-name columns written per message-table row;
/// excess object names are logged and dropped so the column layout stays a
/// stable width.
pub const MSG_TABLE_MAX_OBJECTS_PER_MSG: usize = 6;

/// Number of reserved leading stat tags that are never hash-grouped
/// (`name`, `source`, `key`, `proxy`).
pub const NUM_STATS_TAGS_FIELD: usize = 4;

/// Blank-column default value used by the session table.
pub const UNKNOWN_MARKER: &str = "__UNKNOWN__";
