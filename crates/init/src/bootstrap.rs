//! Row assembly for the `SYSTEM_OBJECT_TABLE` sentinel the initializer reads
//! on `SCHEMA_PROBING` and writes on `SCHEMA_CREATING`.

use std::time::{SystemTime, UNIX_EPOCH};

use collector_model::{ColumnWrite, RowWrite, TableName, TtlClass};
use std::collections::HashMap;

/// Row key of the sentinel row in `SYSTEM_OBJECT_TABLE`.
pub const SYSTEM_OBJECT_ANALYTICS_KEY: &str = "SYSTEM_OBJECT_ANALYTICS";

/// Column carrying the sentinel's start time, whose presence on
/// `SCHEMA_PROBING` means initialization has already happened.
pub const SYSTEM_OBJECT_START_TIME_COLUMN: &str = "SYSTEM_OBJECT_START_TIME";

fn now_usec() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).expect("system clock before epoch").as_micros() as i64
}

/// Builds the sentinel row written once schema creation succeeds:
/// `{start_time, flow_start_time, msg_start_time, stat_start_time}`, all set
/// to the same `now_usec()` snapshot.
///
/// Kept disjoint from [`build_ttl_advertisement_row`] on purpose: readers
/// distinguish the two payloads by column name, not by a shared write.
pub fn write_start_times() -> RowWrite {
    let now = now_usec().to_string();
    RowWrite {
        table: TableName::SystemObject,
        row_key: SYSTEM_OBJECT_ANALYTICS_KEY.to_string(),
        columns: vec![
            ColumnWrite {
                name: SYSTEM_OBJECT_START_TIME_COLUMN.to_string(),
                value: now.clone(),
                ttl_seconds: None,
            },
            ColumnWrite {
                name: "FLOW_START_TIME".to_string(),
                value: now.clone(),
                ttl_seconds: None,
            },
            ColumnWrite {
                name: "MSG_START_TIME".to_string(),
                value: now.clone(),
                ttl_seconds: None,
            },
            ColumnWrite {
                name: "STAT_START_TIME".to_string(),
                value: now,
                ttl_seconds: None,
            },
        ],
    }
}

/// Builds the TTL-advertisement row, `{flow_ttl, stats_ttl, config_audit_ttl,
/// global_ttl}` in hours, read by peers (and the original store's own
/// tooling) to learn the TTL this instance was configured with.
pub fn write_ttls(ttl_hours: &HashMap<TtlClass, u32>) -> RowWrite {
    let hours_for = |class: TtlClass| ttl_hours.get(&class).copied().unwrap_or(0).to_string();
    RowWrite {
        table: TableName::SystemObject,
        row_key: SYSTEM_OBJECT_ANALYTICS_KEY.to_string(),
        columns: vec![
            ColumnWrite {
                name: "FLOW_TTL".to_string(),
                value: hours_for(TtlClass::FlowData),
                ttl_seconds: None,
            },
            ColumnWrite {
                name: "STATS_TTL".to_string(),
                value: hours_for(TtlClass::StatsData),
                ttl_seconds: None,
            },
            ColumnWrite {
                name: "CONFIG_AUDIT_TTL".to_string(),
                value: hours_for(TtlClass::ConfigAudit),
                ttl_seconds: None,
            },
            ColumnWrite {
                name: "GLOBAL_TTL".to_string(),
                value: hours_for(TtlClass::Global),
                ttl_seconds: None,
            },
        ],
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn start_times_row_targets_the_sentinel_key() {
        let row = write_start_times();
        assert_eq!(row.table, TableName::SystemObject);
        assert_eq!(row.row_key, SYSTEM_OBJECT_ANALYTICS_KEY);
        assert!(row.columns.iter().any(|c| c.name == SYSTEM_OBJECT_START_TIME_COLUMN));
    }

    #[test]
    fn ttl_row_defaults_missing_classes_to_zero() {
        let row = write_ttls(&HashMap::new());
        assert!(row.columns.iter().all(|c| c.value == "0"));
    }
}
