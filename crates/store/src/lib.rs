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

//! The wide-column table writer: row/column assembly for the five
//! persisted tables, DJB2 tag-group hashing, stats-JSON sigil encoding,
//! UUID generation and the field-names epoch dedup cache, tied to the
//! pipeline by an `AsyncProcessor`.

pub mod field_names;
pub mod hash;
pub mod processor;
pub mod stats_json;
pub mod tables;
pub mod uuid_gen;

pub use field_names::FieldNamesCache;
pub use processor::{StoreProcessor, StoreProcessorFactory};
