//! Crawler module for listing discovery and extraction
//!
//! This module contains the network-facing parts of the pipeline:
//! - HTTP fetching behind the `Fetcher` trait
//! - Site markup parsing behind the `PageParser` trait
//! - The paged crawl of one price window
//! - The checkpointed per-listing extraction
//! - Phase coordination

mod coordinator;
mod extractor;
mod fetcher;
mod pagination;
mod parser;

pub use coordinator::Harvester;
pub use extractor::ExtractionRunner;
pub use fetcher::{build_http_client, FetchError, FetchResponse, Fetcher, HttpFetcher};
pub use pagination::{PaginationCrawler, WindowCrawl};
pub use parser::{feature_record, ListingPageParser, PageParser};
