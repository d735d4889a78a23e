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

//! UVE aggregation: the session-counter cache, the KPI/MOS link score, the
//! four discard-filter rules, the six `summarize_*` modes, and the
//! `AsyncProcessor` that ties them to the pipeline.

pub mod cache;
pub mod filters;
pub mod kpi;
pub mod processor;
pub mod summarize;

pub use cache::{Counters, SessionCounterCache};
pub use kpi::{calculate_link_score, LinkScoreCoefficients};
pub use processor::{UveProcessor, UveProcessorFactory};
