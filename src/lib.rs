//! Immo-Harvest: a resumable listing crawler
//!
//! This crate walks the search pages of a real-estate site one price window at a
//! time, collects listing URLs, deduplicates them, then visits every listing to
//! extract its feature table into a JSON dataset. Progress is checkpointed so an
//! interrupted run picks up where it stopped.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Immo-Harvest operations
///
/// Only configuration, storage and formatting failures surface here. Per-page and
/// per-item failures are absorbed by the crawler and reported through counters.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Dataset format error: {0}")]
    Format(#[from] output::FormatError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Immo-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::state::{advance, CrawlCheckpoint, PriceWindow, WindowCursor};
pub use crate::url::{dedupe, ListingRef};
