#![deny(
    trivial_numeric_casts,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    unused_results,
    variant_size_differences
)]
#![warn(rust_2021_compatibility, unreachable_pub)]

//! One-time keyspace and schema provisioning, run once before the engine
//! starts accepting pipelines rather than as a pipeline stage itself.

pub mod bootstrap;
pub mod lock;
pub mod state;

pub use lock::{DistributedLock, LockError, LockGuard};
pub use state::{ConnectionStatus, Initializer, State};
