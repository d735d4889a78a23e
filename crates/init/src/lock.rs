//! Opaque distributed-lock collaborator used to coordinate schema creation
//! across peer collector instances.
//!
//! As with [`collector_model::StoreDriver`], the initializer depends only on
//! this trait; a binary wires up whatever lock service (the store's own
//! lightweight-transaction support, an external coordination service, or a
//! no-op for single-instance deployments) actually backs it.

use async_trait::async_trait;
use thiserror::Error;

/// Errors a [`DistributedLock`] implementation may report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LockError {
    /// The lock service could not be reached.
    #[error("lock service unavailable: {message}")]
    Unavailable {
        /// Human-readable detail from the implementation.
        message: String,
    },
    /// Another peer currently holds the named lock.
    #[error("lock {name} held by another peer")]
    Contended {
        /// The contended lock's name.
        name: String,
    },
}

/// An acquired lock. Dropping the guard releases the lock; implementations
/// do the release in their `Drop` impl rather than exposing an explicit
/// `release` method, so a guard dropped on any error path (including a
/// panic unwind) still releases.
pub trait LockGuard: Send + Sync {}

/// Collaborator abstracting a named distributed lock.
#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Acquires the named lock, blocking until held or the implementation
    /// gives up and reports [`LockError`].
    async fn acquire(&self, name: &str) -> Result<Box<dyn LockGuard>, LockError>;
}
