//! URL handling module for Immo-Harvest
//!
//! This module builds the paginated search URLs for a price window and turns
//! discovered listing URLs into canonical identifiers for deduplication.

mod listing;
mod search;

// Re-export main types and functions
pub use listing::{dedupe, listing_ref, Deduplicated, ListingRef};
pub use search::SearchPages;
