#![deny(
    trivial_numeric_casts,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    unused_results
)]
#![warn(rust_2021_compatibility, unreachable_pub)]

//! Shared data model for the structured-telemetry collector pipeline:
//! the tagged field value, the parsed syslog record, enrichment lookup
//! shapes, the table catalog, watermark tuples, UVE metric records, and the
//! `CollectorEvent` type every pipeline stage exchanges.

pub mod counters;
pub mod enrichment;
pub mod event;
pub mod message_type;
pub mod metric;
pub mod record;
pub mod store_driver;
pub mod table;
pub mod value;

pub use counters::IntrospectCounters;
pub use enrichment::{HostnameRecord, LinkMapEntry, SlaProfileKey, SlaProfileRecord, TenantRecord};
pub use event::CollectorEvent;
pub use message_type::MessageTypeConfig;
pub use metric::{MetricGroup, MetricKind, MetricRecord};
pub use record::SyslogRecord;
pub use store_driver::{ColumnWrite, CompactionHint, RowWrite, StoreDriver, StoreError};
pub use table::{table_catalog, TableName, TableSchema, TtlClass, MSG_TABLE_MAX_OBJECTS_PER_MSG, NUM_STATS_TAGS_FIELD, UNKNOWN_MARKER};
pub use value::FieldValue;
pub use watermark::{Severity, ThresholdSeverity, WaterMarkTuple};

pub mod watermark;
