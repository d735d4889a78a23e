//! Logging-only stand-ins for the collaborators the pipeline treats as
//! opaque: the wide-column store driver, the distributed lock service and
//! the message bus. A real deployment wires in whatever concrete client
//! talks to its store/lock/bus cluster; these exist so the binary has
//! something to run against, the same role `beaubourg`'s own example
//! binaries give `TestReceiverFactory`/`TestProcessorFactory`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use collector_init::{DistributedLock, LockError, LockGuard};
use collector_model::{ColumnWrite, CompactionHint, RowWrite, StoreDriver, StoreError, TableName};
use collector_forwarder::{BusError, MessageBusSink};

/// A [`StoreDriver`] that keeps rows in memory and never fails. Schema
/// operations are no-ops since there is no real schema to create.
#[derive(Default)]
pub struct InMemoryStoreDriver {
    rows: Mutex<HashMap<(TableName, String), HashMap<String, String>>>,
}

impl InMemoryStoreDriver {
    /// Creates an empty driver.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreDriver for InMemoryStoreDriver {
    async fn set_keyspace(&self, keyspace: &str) -> Result<(), StoreError> {
        tracing::info!(%keyspace, "in-memory store driver: keyspace selected");
        Ok(())
    }

    async fn create_table(&self, table: TableName, compaction: CompactionHint, with_secondary_index: bool) -> Result<(), StoreError> {
        tracing::info!(?table, ?compaction, with_secondary_index, "in-memory store driver: table created");
        Ok(())
    }

    async fn add_column(&self, table: TableName, column_name: &str) -> Result<(), StoreError> {
        tracing::info!(?table, %column_name, "in-memory store driver: column added");
        Ok(())
    }

    async fn get_row(&self, table: TableName, row_key: &str) -> Result<Option<HashMap<String, String>>, StoreError> {
        let rows = self.rows.lock().expect("in-memory store rows lock poisoned");
        Ok(rows.get(&(table, row_key.to_string())).cloned())
    }

    async fn queue_stats(&self, writes: Vec<RowWrite>) -> Result<(), StoreError> {
        let mut rows = self.rows.lock().expect("in-memory store rows lock poisoned");
        for write in writes {
            let entry = rows.entry((write.table, write.row_key)).or_default();
            for column in write.columns {
                let _ = entry.insert(column.name, column.value);
            }
        }
        Ok(())
    }
}

struct NoopLockGuard;
impl LockGuard for NoopLockGuard {}

/// A [`DistributedLock`] that always grants the lock immediately. Correct
/// only for single-instance deployments; `coordinate_with_peers: false` in
/// startup config is the usual way to avoid needing a real one.
#[derive(Default)]
pub struct AlwaysGrantedLock;

impl AlwaysGrantedLock {
    /// Creates a lock that never contends.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DistributedLock for AlwaysGrantedLock {
    async fn acquire(&self, name: &str) -> Result<Box<dyn LockGuard>, LockError> {
        tracing::info!(%name, "always-granted lock: acquired");
        Ok(Box::new(NoopLockGuard))
    }
}

/// A [`MessageBusSink`] that logs the publish and drops the payload.
#[derive(Default)]
pub struct LoggingMessageBusSink;

impl LoggingMessageBusSink {
    /// Creates a sink that only logs.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageBusSink for LoggingMessageBusSink {
    async fn send(&self, routing_key: &str, payload: Vec<u8>) -> Result<(), BusError> {
        tracing::debug!(%routing_key, bytes = payload.len(), "logging message bus: publish");
        Ok(())
    }
}
