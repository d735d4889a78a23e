//! Opaque storage collaborator used by the writer and initializer crates.
//!
//! The collector core never speaks a concrete wide-column wire protocol
//! itself; it depends on this trait and a binary wires up whatever driver
//! actually talks to the backing store. This mirrors how `beaubourg`'s
//! `receiver`/`exporter` crates stay agnostic of the concrete transport.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::table::TableName;

/// Errors a [`StoreDriver`] implementation may report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// The backing store rejected or could not complete the operation.
    #[error("store operation failed: {message}")]
    OperationFailed {
        /// Human-readable detail from the driver.
        message: String,
    },
    /// The driver is not currently connected to a usable store.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// Human-readable detail from the driver.
        message: String,
    },
}

/// One column write within a row.
#[derive(Debug, Clone)]
pub struct ColumnWrite {
    /// Column name.
    pub name: String,
    /// Column value, already rendered to its wire representation.
    pub value: String,
    /// Column-level TTL in seconds, if this column overrides the table's
    /// default TTL class.
    pub ttl_seconds: Option<u32>,
}

/// A batch of column writes against one row of one table.
#[derive(Debug, Clone)]
pub struct RowWrite {
    /// Table the row belongs to.
    pub table: TableName,
    /// Row key.
    pub row_key: String,
    /// Columns to write.
    pub columns: Vec<ColumnWrite>,
}

/// Compaction strategy hint passed at schema-creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionHint {
    /// The generic strategy applied to most tables.
    Generic,
    /// The flow/session-table override (higher write amplification,
    /// shorter-lived rows).
    Flow,
}

/// Collaborator abstracting the backing wide-column store.
///
/// Implementations are free to batch, retry or pool connections; the trait
/// only commits to the operations this collector needs.
#[async_trait]
pub trait StoreDriver: Send + Sync {
    /// Selects (and, if absent, does not create) the keyspace the driver
    /// operates against.
    async fn set_keyspace(&self, keyspace: &str) -> Result<(), StoreError>;

    /// Creates a table if it does not already exist, applying the given
    /// compaction hint and, when requested, a secondary index.
    async fn create_table(
        &self,
        table: TableName,
        compaction: CompactionHint,
        with_secondary_index: bool,
    ) -> Result<(), StoreError>;

    /// Adds a column to an existing table's schema. A no-op for stores that
    /// accept unknown columns at write time, required for those that don't.
    async fn add_column(&self, table: TableName, column_name: &str) -> Result<(), StoreError>;

    /// Reads back a row's columns, used by the initializer to probe schema
    /// readiness and by tests.
    async fn get_row(
        &self,
        table: TableName,
        row_key: &str,
    ) -> Result<Option<HashMap<String, String>>, StoreError>;

    /// Commits one or more row writes.
    async fn queue_stats(&self, writes: Vec<RowWrite>) -> Result<(), StoreError>;
}
