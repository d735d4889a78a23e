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

//! Admission control: sheds messages under write pressure before they reach
//! the aggregator or the table writer, ahead of `collector-uve` and
//! `collector-store` in the pipeline chain.

pub mod category;
pub mod processor;
pub mod watermarks;

pub use category::{classify, Category};
pub use processor::{AdmissionProcessor, AdmissionProcessorFactory};
pub use watermarks::WatermarkEngine;
