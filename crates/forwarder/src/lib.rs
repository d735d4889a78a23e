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

//! Mirrors decorated structured-syslog records to downstream stream
//! destinations and/or a partitioned message bus.
//!
//! Grounded on `beaubourg/crates/exporter`'s `AsyncExporter`/`EffectHandler`
//! shape: this is the one `AsyncExporter<CollectorEvent>` in the pipeline,
//! sitting after the processor chain so it only ever sees already-decorated
//! records. `forward_buf` (populated by the parser, stitched in place by
//! the decorator) is mirrored byte-for-byte to stream destinations; the
//! message bus gets a freshly-encoded JSON object instead, since its wire
//! format is unrelated to the syslog frame.

pub mod bus;
pub mod config;
pub mod exporter;
pub mod stream;

pub use bus::{BusError, MessageBusSink};
pub use config::{ForwarderConfig, StreamDestination};
pub use exporter::{ForwarderExporter, ForwarderExporterFactory};
pub use stream::StreamSink;
