//! The `IDLE → LOCK_ACQUIRING → SCHEMA_PROBING → SCHEMA_CREATING → READY`
//! state machine.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use collector_model::{CompactionHint, StoreDriver, TableName, TtlClass};
use collector_settings::StartupConfig;
use tracing::{info, warn};

use crate::bootstrap::{self, SYSTEM_OBJECT_ANALYTICS_KEY, SYSTEM_OBJECT_START_TIME_COLUMN};
use crate::lock::{DistributedLock, LockGuard};

/// The initializer's current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Not yet started.
    Idle,
    /// Acquiring the named distributed lock, if `coordinate_with_peers`.
    LockAcquiring,
    /// Probing the store for the sentinel row.
    SchemaProbing,
    /// Creating column families, secondary indexes and the sentinel rows.
    SchemaCreating,
    /// Initialization is complete; pipelines may start.
    Ready,
}

/// Connection status reported after every state transition, mirroring the
/// UP/DOWN status the original collector surfaced to its own health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// The store (and lock service, if configured) are reachable.
    Up,
    /// The last attempt failed; a retry is scheduled.
    Down,
}

const SCHEMA_LOCK_NAME: &str = "collector_schema_init";

/// Runs the one-time keyspace/schema provisioning state machine to
/// completion, retrying on a constant interval until it succeeds.
pub struct Initializer {
    driver: Arc<dyn StoreDriver>,
    lock: Option<Arc<dyn DistributedLock>>,
    config: StartupConfig,
    retry_interval: Duration,
    status: AtomicBool,
}

impl Initializer {
    /// Creates an initializer over `driver`, optionally coordinating with
    /// `lock` when `config.coordinate_with_peers` is set, retrying failed
    /// transitions every `retry_interval`.
    pub fn new(driver: Arc<dyn StoreDriver>, lock: Option<Arc<dyn DistributedLock>>, config: StartupConfig, retry_interval: Duration) -> Self {
        Self {
            driver,
            lock,
            config,
            retry_interval,
            status: AtomicBool::new(false),
        }
    }

    /// The most recently reported connection status.
    pub fn status(&self) -> ConnectionStatus {
        if self.status.load(Ordering::Acquire) {
            ConnectionStatus::Up
        } else {
            ConnectionStatus::Down
        }
    }

    fn report(&self, status: ConnectionStatus) {
        self.status.store(status == ConnectionStatus::Up, Ordering::Release);
        match status {
            ConnectionStatus::Up => info!("initializer: store connection up"),
            ConnectionStatus::Down => warn!("initializer: store connection down, retry armed"),
        }
    }

    /// Drives the state machine to [`State::Ready`], blocking (via
    /// `tokio::time::sleep`) across retries. Every failure is retried, so
    /// this only returns once initialization has succeeded.
    pub async fn run(&self) {
        let mut state = State::Idle;
        let mut guard: Option<Box<dyn LockGuard>> = None;

        loop {
            state = match state {
                State::Idle => State::LockAcquiring,

                State::LockAcquiring => {
                    if !self.config.coordinate_with_peers {
                        State::SchemaProbing
                    } else {
                        match &self.lock {
                            None => State::SchemaProbing,
                            Some(lock) => match lock.acquire(SCHEMA_LOCK_NAME).await {
                                Ok(acquired) => {
                                    guard = Some(acquired);
                                    State::SchemaProbing
                                }
                                Err(err) => {
                                    warn!(error = %err, "initializer: lock acquisition failed");
                                    self.report(ConnectionStatus::Down);
                                    tokio::time::sleep(self.retry_interval).await;
                                    State::LockAcquiring
                                }
                            },
                        }
                    }
                }

                State::SchemaProbing => match self.driver.get_row(TableName::SystemObject, SYSTEM_OBJECT_ANALYTICS_KEY).await {
                    Ok(Some(row)) if row.contains_key(SYSTEM_OBJECT_START_TIME_COLUMN) => State::Ready,
                    Ok(_) => State::SchemaCreating,
                    Err(err) => {
                        warn!(error = %err, "initializer: schema probe failed");
                        guard = None;
                        self.report(ConnectionStatus::Down);
                        tokio::time::sleep(self.retry_interval).await;
                        State::LockAcquiring
                    }
                },

                State::SchemaCreating => match self.create_schema().await {
                    Ok(()) => {
                        guard = None;
                        State::Ready
                    }
                    Err(err) => {
                        warn!(error = %err, "initializer: schema creation failed");
                        guard = None;
                        self.report(ConnectionStatus::Down);
                        tokio::time::sleep(self.retry_interval).await;
                        State::LockAcquiring
                    }
                },

                State::Ready => {
                    self.report(ConnectionStatus::Up);
                    return;
                }
            };
        }
    }

    async fn create_schema(&self) -> Result<(), collector_model::StoreError> {
        self.driver.set_keyspace(&self.config.keyspace_name()).await?;

        for schema in collector_model::table_catalog() {
            let compaction = if schema.ttl_class == TtlClass::FlowData {
                CompactionHint::Flow
            } else {
                CompactionHint::Generic
            };
            self.driver.create_table(schema.name, compaction, schema.has_secondary_index).await?;
        }
        self.driver.create_table(TableName::SystemObject, CompactionHint::Generic, false).await?;

        self.driver.queue_stats(vec![bootstrap::write_start_times(), bootstrap::write_ttls(&self.ttl_hours())]).await?;

        Ok(())
    }

    fn ttl_hours(&self) -> HashMap<TtlClass, u32> {
        self.config.ttl_hours.clone()
    }
}
