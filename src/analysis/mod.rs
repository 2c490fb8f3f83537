//! Analysis modules.
//!
//! The coerce, derive and aggregate stages of the pipeline.

pub mod aggregator;

pub use aggregator::*;
