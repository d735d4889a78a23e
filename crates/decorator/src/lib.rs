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

//! Enrichment: hostname/tenant/SLA-profile lookups applied to parsed syslog
//! records, plus the `AsyncProcessor` that runs them on the pipeline.

pub mod decorate;
pub mod processor;
pub mod store;

pub use decorate::decorate;
pub use processor::{DecoratorProcessor, DecoratorProcessorFactory};
pub use store::{EnrichmentSnapshot, EnrichmentStore};
