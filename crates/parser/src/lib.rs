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

//! Structured-syslog framing, header/structured-block parsing, and the
//! `AsyncReceiver` that turns reassembled frames into `CollectorEvent`s.

pub mod error;
pub mod frame;
pub mod framing;
pub mod header;
pub mod kv;
pub mod receiver;

pub use error::ParseError;
pub use frame::parse_frame;
pub use framing::{FrameExtractor, MAX_CARRY_OVER};
pub use receiver::{ParserConfig, ParserReceiverFactory, StructuredSyslogReceiver, DEFAULT_PORT};
