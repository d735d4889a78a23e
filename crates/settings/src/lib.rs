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

//! Startup configuration and the live message-type table for the
//! structured-telemetry collector: store endpoints/credentials/TLS, TTL
//! map, compaction strategy, watermark triples, global write switches, and
//! the `"udc"`-subscribed per-tag processing flags.

pub mod defaults;
pub mod error;
pub mod startup;
pub mod subscriber;

pub use defaults::default_message_types;
pub use error::Error;
pub use startup::{CompactionStrategy, StartupConfig, StoreCredentials, TlsSettings, WatermarkSettings, WriteSwitches, DEFAULT_KEYSPACE};
pub use subscriber::{ConfigSubscriber, MessageTypeTable, MESSAGE_TYPE_TOPIC};

use std::{fs::File, io::BufReader, path::Path};

use validator::Validate;

/// Loads and validates a [`StartupConfig`] from a YAML file, mirroring how
/// `collector_config::Config::load_with_factories` loads pipeline
/// configuration.
pub fn load_startup_config<P: AsRef<Path>>(path: P) -> Result<StartupConfig, Error> {
    let file_name = path.as_ref().display().to_string();
    let file = File::open(path.as_ref()).map_err(|err| Error::InvalidSettings {
        file: file_name.clone(),
        message: err.to_string(),
    })?;
    let reader = BufReader::new(file);
    let config: StartupConfig = serde_yaml::from_reader(reader).map_err(|err| Error::InvalidSettings {
        file: file_name.clone(),
        message: err.to_string(),
    })?;
    config.validate().map_err(|err| Error::Invalid {
        file: file_name,
        message: err.to_string(),
    })?;
    Ok(config)
}
