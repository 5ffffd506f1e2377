//! Output module for the final dataset and run reports
//!
//! This module handles:
//! - Repairing the append-only raw dataset into one JSON array
//! - Summarizing what each pipeline phase did

mod normalize;
mod stats;

pub use normalize::{normalize, write_normalized, FormatError, FormatResult};
pub use stats::{DedupReport, DiscoveryReport, ExtractionReport, HarvestSummary, WindowStop};
