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

//! Core of a structured-telemetry collector and writer: ingests structured
//! syslog from network devices, normalizes and enriches it, derives
//! real-time aggregate metrics (UVE), and persists both raw events and
//! derived statistics into a wide-column store under admission control.
//!
//! The processing pipeline is built on the same receiver/processor/exporter
//! pipeline model as the underlying engine crate: one or more receivers feed
//! a chain of processors which fan out to one or more exporters. Here a
//! single receiver (`collector-parser`) turns transport bytes into
//! [`collector_model::CollectorEvent`], a chain of processors
//! (`collector-decorator` → `collector-admission` → `collector-uve` →
//! `collector-store`) enrich, gate, aggregate and persist it, and exporters
//! (`collector-forwarder`) mirror decorated records downstream.
//!
//! An **engine** is an execution environment for one or more pipelines
//! running in parallel. A configuration file defines the receivers,
//! processors, exporters, and their connections.

pub use collector_admission as admission;
pub use collector_decorator as decorator;
pub use collector_forwarder as forwarder;
pub use collector_init as init;
pub use collector_model as model;
pub use collector_parser as parser;
pub use collector_settings as settings;
pub use collector_store as store;
pub use collector_uve as uve;
pub use config;
pub use context;
pub use engine;
pub use exporter;
pub use processor;
pub use receiver;
pub use signal;
pub use task;
