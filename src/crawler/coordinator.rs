//! Harvest coordinator - phase orchestration
//!
//! The pipeline runs in four phases, each restartable on its own:
//! 1. Discovery: crawl price windows, append listing URLs (checkpointed per window)
//! 2. Dedupe: collapse the raw URLs into the deduplicated store, once
//! 3. Extraction: visit listings, append records (checkpointed per item)
//! 4. Normalization: rewrite the raw dataset as one JSON array

use crate::config::Config;
use crate::crawler::extractor::ExtractionRunner;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::pagination::PaginationCrawler;
use crate::crawler::parser::{ListingPageParser, PageParser};
use crate::output::{
    write_normalized, DedupReport, DiscoveryReport, ExtractionReport, HarvestSummary, WindowStop,
};
use crate::state::{advance, WindowCursor};
use crate::storage::{CheckpointStore, DatasetStore, FileCheckpointStore, UrlStore};
use crate::url::{dedupe, SearchPages};
use crate::Result;
use std::path::Path;
use std::time::Duration;

/// Owns the stores and collaborators shared by every phase
pub struct Harvester {
    config: Config,
    fetcher: Box<dyn Fetcher>,
    parser: Box<dyn PageParser>,
    pages: SearchPages,
    checkpoint: FileCheckpointStore,
    raw_urls: UrlStore,
    unique_urls: UrlStore,
    dataset: DatasetStore,
}

impl Harvester {
    /// Creates a harvester that talks to the configured site over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Client built and checkpoint opened
    /// * `Err(HarvestError)` - Failed to initialize
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.fetch)?;
        let pages = SearchPages::from_config(&config.site)?;
        let parser = ListingPageParser::new(pages.base().clone(), &config.selectors)?;
        Self::with_components(config, Box::new(fetcher), Box::new(parser))
    }

    /// Creates a harvester with caller-supplied fetcher and parser
    pub fn with_components(
        config: Config,
        fetcher: Box<dyn Fetcher>,
        parser: Box<dyn PageParser>,
    ) -> Result<Self> {
        let pages = SearchPages::from_config(&config.site)?;
        let output = &config.output;
        let checkpoint = FileCheckpointStore::open(
            Path::new(&output.checkpoint_path),
            config.crawl.start_window(),
        )?;
        let raw_urls = UrlStore::new(Path::new(&output.urls_path));
        let unique_urls = UrlStore::new(Path::new(&output.deduplicated_urls_path));
        let dataset = DatasetStore::new(Path::new(&output.dataset_path));

        Ok(Self {
            config,
            fetcher,
            parser,
            pages,
            checkpoint,
            raw_urls,
            unique_urls,
            dataset,
        })
    }

    fn request_delay(&self) -> Duration {
        Duration::from_millis(self.config.fetch.request_delay_ms)
    }

    /// Crawls price windows from the checkpointed one until the walk ends
    ///
    /// A window's URLs are appended before the checkpoint moves past it, so an
    /// interruption re-crawls at most the current window. A transport failure
    /// ends discovery with the failed window still checkpointed; the next run
    /// crawls it again from page 1.
    pub async fn discover(&mut self) -> Result<DiscoveryReport> {
        let mut report = DiscoveryReport::default();
        let crawler = PaginationCrawler::new(self.fetcher.as_ref(), self.parser.as_ref(), &self.pages)
            .with_request_delay(self.request_delay())
            .with_max_pages(self.config.fetch.max_pages_per_window);

        loop {
            let window = match self.checkpoint.load_window()? {
                WindowCursor::Open(window) => window,
                WindowCursor::Terminal => {
                    tracing::info!("All price windows have been crawled");
                    break;
                }
            };

            tracing::info!("Crawling price window {}", window);
            let crawl = crawler.crawl(&window).await;

            self.raw_urls.append(&crawl.urls)?;
            tracing::info!(
                "{} URLs saved to {}",
                crawl.urls.len(),
                self.raw_urls.path().display()
            );
            report.record_window(window, crawl.pages, crawl.urls.len(), &crawl.stop);

            if matches!(crawl.stop, WindowStop::Transport(_)) {
                tracing::error!(
                    "Stopping discovery: window {} is kept in {}",
                    window,
                    self.checkpoint.path().display()
                );
                report.interrupted_at = Some(window);
                break;
            }

            let next = advance(&window);
            self.checkpoint.save_window(next)?;
        }

        report.log();
        Ok(report)
    }

    /// Writes the deduplicated URL store from the raw one
    ///
    /// Once extraction has saved anything, the existing deduplicated store is
    /// kept as is: the item checkpoint indexes into its exact order.
    pub fn dedupe(&mut self) -> Result<DedupReport> {
        let items_processed = self.checkpoint.load_items_processed()?;
        if items_processed > 0 && self.unique_urls.exists() {
            tracing::warn!(
                "Extraction has saved {} items; keeping {} unchanged",
                items_processed,
                self.unique_urls.path().display()
            );
            let report = DedupReport {
                unique_urls: self.unique_urls.load()?.len(),
                kept_existing: true,
                ..DedupReport::default()
            };
            report.log();
            return Ok(report);
        }

        let raw = self.raw_urls.load()?;
        let result = dedupe(&raw, &self.config.site.listing_prefix);
        for line in &result.rejected {
            tracing::warn!("Rejected URL line: {}", line);
        }

        self.unique_urls.replace(&result.urls)?;
        tracing::info!("File successfully created: {}", self.unique_urls.path().display());

        let report = DedupReport {
            raw_urls: raw.len(),
            unique_urls: result.urls.len(),
            duplicates: result.duplicates,
            rejected: result.rejected.len(),
            kept_existing: false,
        };
        report.log();
        Ok(report)
    }

    /// Extracts features for every listing not yet saved
    pub async fn extract(&mut self) -> Result<ExtractionReport> {
        if !self.unique_urls.exists() {
            tracing::warn!(
                "No deduplicated URL store at {}; run the dedupe phase first",
                self.unique_urls.path().display()
            );
        }

        let delay = self.request_delay();
        let report = ExtractionRunner::new(
            self.fetcher.as_ref(),
            self.parser.as_ref(),
            &mut self.checkpoint,
            &self.unique_urls,
            &self.dataset,
        )
        .with_request_delay(delay)
        .run()
        .await?;

        report.log();
        Ok(report)
    }

    /// Rewrites the raw dataset as a single JSON array
    ///
    /// Returns `Ok(None)` when there is no raw dataset yet.
    pub fn normalize(&self) -> Result<Option<usize>> {
        if !self.dataset.path().exists() {
            tracing::info!(
                "No dataset at {}, nothing to normalize",
                self.dataset.path().display()
            );
            return Ok(None);
        }

        let count = write_normalized(
            self.dataset.path(),
            Path::new(&self.config.output.formatted_dataset_path),
        )?;
        Ok(Some(count))
    }

    /// Runs all four phases in order
    ///
    /// Stops after discovery when it was interrupted: deduplicating a partial
    /// URL store would freeze it once extraction saves its first item.
    pub async fn run(&mut self) -> Result<HarvestSummary> {
        let discovery = self.discover().await?;
        if discovery.is_interrupted() {
            return Ok(HarvestSummary {
                discovery: Some(discovery),
                ..HarvestSummary::default()
            });
        }

        let dedup = self.dedupe()?;
        let extraction = self.extract().await?;
        let normalized_records = self.normalize()?;

        Ok(HarvestSummary {
            discovery: Some(discovery),
            dedup: Some(dedup),
            extraction: Some(extraction),
            normalized_records,
        })
    }
}
