//! Row/column assembly for the five persisted tables, per spec §4.4's
//! partition-key / clustering-column / value contract.

use std::collections::HashMap;

use collector_model::metric::MetricRecord;
use collector_model::record::SyslogRecord;
use collector_model::store_driver::{ColumnWrite, RowWrite};
use collector_model::table::{TableName, TtlClass, MSG_TABLE_MAX_OBJECTS_PER_MSG, UNKNOWN_MARKER};

use crate::field_names::FieldNamesCache;
use crate::stats_json::encode_stat_row;
use crate::uuid_gen::{field_names_uuid, random_row_uuid};

/// The tag the message table (and its `object_value` companion) treats as
/// config-audit traffic rather than general telemetry (`PrependT2`'s
/// `CONFIGAUDIT_TTL` branch, db_handler.cc:674-678).
pub const CONFIG_AUDIT_TAG: &str = "VncApiConfigLog";

/// Converts an hours-denominated TTL class entry into seconds, the unit
/// [`ColumnWrite::ttl_seconds`] is expressed in.
fn ttl_seconds_for(ttl_hours: &HashMap<TtlClass, u32>, class: TtlClass) -> Option<u32> {
    ttl_hours.get(&class).map(|hours| hours.saturating_mul(3600))
}

/// `PrependT2`: every secondary-index column's *value* (not its name) is
/// prefixed with the decimal `T2` bucket and a colon, so a range scan over
/// one bucket stays contiguous (spec §3.2, P3).
fn prepend_t2(t2: i64, value: impl Into<String>) -> String {
    format!("{t2}:{}", value.into())
}

fn column(name: impl Into<String>, value: impl Into<String>, ttl_seconds: Option<u32>) -> ColumnWrite {
    ColumnWrite {
        name: name.into(),
        value: value.into(),
        ttl_seconds,
    }
}

/// A column whose value is a secondary-index entry: its value is prefixed
/// with `"{t2}:"` via [`prepend_t2`].
fn indexed_column(t2: i64, name: impl Into<String>, value: impl Into<String>, ttl_seconds: Option<u32>) -> ColumnWrite {
    column(name, prepend_t2(t2, value), ttl_seconds)
}

/// Builds the `message` table row for one record. `object_names` is the
/// set of object-name dimensions found on the record; only the first
/// [`MSG_TABLE_MAX_OBJECTS_PER_MSG`] are written, the rest are logged and
/// dropped, and unused object slots are filled with the blank marker so the
/// row stays a stable width.
pub fn build_message_row(record: &SyslogRecord, object_names: &[String], ttl_hours: &HashMap<TtlClass, u32>) -> RowWrite {
    if object_names.len() > MSG_TABLE_MAX_OBJECTS_PER_MSG {
        tracing::warn!(
            count = object_names.len(),
            max = MSG_TABLE_MAX_OBJECTS_PER_MSG,
            "message carries more object names than the table allows, dropping the excess"
        );
    }

    let t2 = record.t2();
    let t1 = record.t1();
    let uuid = random_row_uuid();
    let ttl_class = if record.tag == CONFIG_AUDIT_TAG { TtlClass::ConfigAudit } else { TtlClass::Global };
    let ttl = ttl_seconds_for(ttl_hours, ttl_class);

    let mut columns = vec![
        column("T1", t1.to_string(), ttl),
        column("uuid", uuid.to_string(), ttl),
        indexed_column(t2, "T2:source", record.hostname.clone(), ttl),
        indexed_column(t2, "T2:messagetype", record.tag.clone(), ttl),
        indexed_column(t2, "T2:module", record.str_field("module"), ttl),
        column("ip", record.str_field("ip"), ttl),
        column("pid", record.int_field("pid", 0).to_string(), ttl),
        column("category", record.str_field("category"), ttl),
        column("level", record.str_field("level"), ttl),
        column("node_type", record.str_field("node-type"), ttl),
        column("instance_id", record.str_field("instance-id"), ttl),
        column("seqnum", record.int_field("seqnum", 0).to_string(), ttl),
        column("type", record.str_field("type"), ttl),
    ];

    for slot in 0..MSG_TABLE_MAX_OBJECTS_PER_MSG {
        let value = object_names.get(slot).cloned().unwrap_or_else(|| UNKNOWN_MARKER.to_string());
        columns.push(indexed_column(t2, format!("T2:obj{slot}"), value, ttl));
    }

    RowWrite {
        table: TableName::Message,
        row_key: format!("{t2}:{}", partition_of(t2)),
        columns,
    }
}

/// Builds one `object_value` row per object name, keyed by `(T2, table_name)`.
pub fn build_object_value_rows(record: &SyslogRecord, object_names: &[String], ttl_hours: &HashMap<TtlClass, u32>) -> Vec<RowWrite> {
    let t2 = record.t2();
    let t1 = record.t1();
    let ttl_class = if record.tag == CONFIG_AUDIT_TAG { TtlClass::ConfigAudit } else { TtlClass::Global };
    let ttl = ttl_seconds_for(ttl_hours, ttl_class);
    object_names
        .iter()
        .map(|object_key| RowWrite {
            table: TableName::ObjectValue,
            row_key: format!("{t2}:{object_key}"),
            columns: vec![column("T1", t1.to_string(), ttl), column("object_key", object_key.clone(), ttl)],
        })
        .collect()
}

/// Builds the `field_names` rows for one record's dimensions
/// (`messagetype`, `module`, `source`, `category`), skipping any triple the
/// epoch-scoped dedup cache has already admitted.
pub fn build_field_names_rows(record: &SyslogRecord, cache: &mut FieldNamesCache, ttl_hours: &HashMap<TtlClass, u32>) -> Vec<RowWrite> {
    let t2 = record.t2();
    let ttl = ttl_seconds_for(ttl_hours, TtlClass::Global);
    let dimensions = [
        ("Messagetype", record.tag.clone()),
        ("ModuleId", record.str_field("module").to_string()),
        ("Source", record.hostname.clone()),
        ("Category", record.str_field("category").to_string()),
    ];

    let mut rows = Vec::new();
    for (field, value) in dimensions {
        if value.is_empty() || !cache.admit(t2, "message", field, &value) {
            continue;
        }
        let uuid = field_names_uuid(&value);
        rows.push(RowWrite {
            table: TableName::FieldNames,
            row_key: format!("FieldNames:fields:{field}"),
            columns: vec![
                column("entity_name", value, ttl),
                column("uuid", uuid.to_string(), ttl),
                indexed_column(t2, "T2:source", record.hostname.clone(), ttl),
            ],
        });
    }
    rows
}

/// Builds the `stats` table row for one attribute document keyed by
/// `(T2, part, stat_name, stat_attr)`.
pub fn build_stats_row(record: &SyslogRecord, stat_name: &str, stat_attr: &str, ttl_hours: &HashMap<TtlClass, u32>) -> RowWrite {
    let t2 = record.t2();
    let t1 = record.t1();
    let encoded = encode_stat_row(&record.fields);
    let uuid = random_row_uuid();
    let ttl = ttl_seconds_for(ttl_hours, TtlClass::StatsData);

    let mut columns = vec![
        column("T1", t1.to_string(), ttl),
        column("uuid", uuid.to_string(), ttl),
        indexed_column(t2, "T2:source", record.hostname.clone(), ttl),
        indexed_column(t2, "T2:key", encoded.key.clone().unwrap_or_default(), ttl),
        indexed_column(t2, "T2:proxy", encoded.proxy.clone().unwrap_or_default(), ttl),
        column("attributes", encoded.attributes.to_string(), ttl),
    ];
    for (i, group) in encoded.tag_groups.iter().enumerate() {
        columns.push(indexed_column(t2, format!("T2:tag_group_{i}"), group.clone(), ttl));
    }

    RowWrite {
        table: TableName::Stats,
        row_key: format!("{t2}:{}:{stat_name}:{stat_attr}", partition_of(t2)),
        columns,
    }
}

/// Builds the `session` table row, defaulting absent columns to the blank
/// marker so the table's column layout stays uniform across sessions that
/// don't report every dimension.
pub fn build_session_row(record: &SyslogRecord, is_si: bool, is_client: bool, ttl_hours: &HashMap<TtlClass, u32>) -> RowWrite {
    let t2 = record.t2();
    let t1 = record.t1();
    let uuid = random_row_uuid();
    let ttl = ttl_seconds_for(ttl_hours, TtlClass::FlowData);

    let blank_or = |key: &str| {
        let value = record.str_field(key);
        if value.is_empty() {
            UNKNOWN_MARKER.to_string()
        } else {
            value.to_string()
        }
    };

    let columns = vec![
        column("T1", t1.to_string(), ttl),
        column("sport", record.int_field("sport", 0).to_string(), ttl),
        column("protocol", blank_or("protocol"), ttl),
        column("uuid", uuid.to_string(), ttl),
        indexed_column(t2, "T2:ip", blank_or("source-address"), ttl),
        indexed_column(t2, "T2:vn", blank_or("source-virtual-network"), ttl),
        indexed_column(t2, "T2:remote_vn", blank_or("destination-virtual-network"), ttl),
    ];

    RowWrite {
        table: TableName::Session,
        row_key: format!("{t2}:{}:{is_si}:{is_client}", partition_of(t2)),
        columns,
    }
}

/// Builds a `stats` table row from a UVE metric record at the given `T2`
/// bucket; metric records carry no timestamp of their own, so the caller
/// (the store processor) stamps them with the current wall-clock bucket.
pub fn build_stats_row_from_metric(metric: &MetricRecord, stat_name: &str, stat_attr: &str, t2: i64, ttl_hours: &HashMap<TtlClass, u32>) -> RowWrite {
    let encoded = encode_stat_row(&metric.fields);
    let uuid = random_row_uuid();
    let ttl = ttl_seconds_for(ttl_hours, TtlClass::StatsData);

    let mut columns = vec![
        column("uuid", uuid.to_string(), ttl),
        indexed_column(t2, "T2:key", metric.key.clone(), ttl),
        column("attributes", encoded.attributes.to_string(), ttl),
    ];
    for (i, group) in encoded.tag_groups.iter().enumerate() {
        columns.push(indexed_column(t2, format!("T2:tag_group_{i}"), group.clone(), ttl));
    }

    RowWrite {
        table: TableName::Stats,
        row_key: format!("{t2}:{}:{stat_name}:{stat_attr}", partition_of(t2)),
        columns,
    }
}

fn partition_of(t2: i64) -> i64 {
    t2 % 16
}
