//! Opaque partitioned message-bus collaborator the forwarder publishes
//! decorated records to.
//!
//! As with [`collector_model::StoreDriver`] and `collector_init`'s
//! `DistributedLock`, the forwarder depends only on this trait; a binary
//! wires up whatever bus client (partitioned log, queue broker, or a no-op
//! for deployments that only mirror to stream destinations) actually backs
//! it.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a [`MessageBusSink`] implementation may report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BusError {
    /// The bus could not be reached.
    #[error("message bus unavailable: {message}")]
    Unavailable {
        /// Human-readable detail from the implementation.
        message: String,
    },
    /// The bus rejected the publish.
    #[error("message bus publish failed: {message}")]
    PublishFailed {
        /// Human-readable detail from the implementation.
        message: String,
    },
}

/// Collaborator abstracting a partitioned message bus.
#[async_trait]
pub trait MessageBusSink: Send + Sync {
    /// Publishes `payload` (a JSON-encoded object, see
    /// [`crate::exporter::encode_bus_payload`]), routed by `routing_key`
    /// (the record's source `hostname`, per spec).
    async fn send(&self, routing_key: &str, payload: Vec<u8>) -> Result<(), BusError>;
}
