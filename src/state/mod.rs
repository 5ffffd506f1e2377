//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PriceWindow` / `WindowCursor`: the price filter being crawled and the
//!   partitioner that advances it through the price tiers
//! - `CrawlCheckpoint`: the persisted progress record shared by discovery and
//!   extraction

mod checkpoint;
mod window;

// Re-export main types
pub use checkpoint::{CheckpointFormatError, CrawlCheckpoint};
pub use window::{advance, PriceWindow, WindowCursor, PRICE_CEILING};
