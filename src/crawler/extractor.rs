//! Per-listing feature extraction
//!
//! Listings are visited in the order of the deduplicated URL store, starting
//! at the checkpointed item count. The count only advances after a record has
//! been appended to the dataset, so an interruption redoes at most one item.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::{feature_record, PageParser};
use crate::output::ExtractionReport;
use crate::storage::{CheckpointStore, DatasetStore, FeatureRecord, StorageResult, UrlStore};
use std::time::Duration;

/// Outcome of visiting one listing
#[derive(Debug)]
enum ItemOutcome {
    Record(FeatureRecord),

    /// The page loaded but had no features
    Empty,

    /// Non-200 status or transport failure
    Failed,
}

/// Visits listings and appends their features to the dataset
pub struct ExtractionRunner<'a> {
    fetcher: &'a dyn Fetcher,
    parser: &'a dyn PageParser,
    checkpoint: &'a mut dyn CheckpointStore,
    urls: &'a UrlStore,
    dataset: &'a DatasetStore,
    request_delay: Duration,
}

impl<'a> ExtractionRunner<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        parser: &'a dyn PageParser,
        checkpoint: &'a mut dyn CheckpointStore,
        urls: &'a UrlStore,
        dataset: &'a DatasetStore,
    ) -> Self {
        Self {
            fetcher,
            parser,
            checkpoint,
            urls,
            dataset,
            request_delay: Duration::ZERO,
        }
    }

    /// Pause between consecutive listings
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Processes every listing at index >= the checkpointed item count
    ///
    /// Listings that yield no record are logged and skipped for good. Only
    /// checkpoint and store I/O failures are returned as errors.
    pub async fn run(&mut self) -> StorageResult<ExtractionReport> {
        let start = self.checkpoint.load_items_processed()?;
        let urls = self.urls.load()?;

        let mut report = ExtractionReport {
            start_offset: start,
            items_processed: start,
            ..ExtractionReport::default()
        };

        let remaining = usize::try_from(start)
            .ok()
            .and_then(|offset| urls.get(offset..))
            .unwrap_or_default();

        if remaining.is_empty() && start > urls.len() as u64 {
            tracing::warn!(
                "Checkpoint says {} items processed but only {} URLs exist in {}",
                start,
                urls.len(),
                self.urls.path().display()
            );
        }

        tracing::info!(
            "Starting extraction from item {}. URLs to process: {}",
            start + 1,
            remaining.len()
        );

        for (index, url) in remaining.iter().enumerate() {
            if index > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            report.attempted += 1;

            match self.extract(url).await {
                ItemOutcome::Record(record) => {
                    self.dataset.append(&record)?;
                    report.items_processed += 1;
                    self.checkpoint
                        .save_items_processed(report.items_processed)?;
                    report.saved += 1;
                    tracing::info!(
                        "[{}] Saved {} features for {}",
                        report.items_processed,
                        record.len(),
                        url
                    );
                }
                ItemOutcome::Empty => {
                    report.skipped += 1;
                    tracing::warn!("Skipped {}: no features found", url);
                }
                ItemOutcome::Failed => {
                    report.skipped += 1;
                    report.errors += 1;
                    tracing::warn!("Skipped {} due to error", url);
                }
            }
        }

        Ok(report)
    }

    async fn extract(&self, url: &str) -> ItemOutcome {
        let response = match self.fetcher.fetch(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("{}", e);
                return ItemOutcome::Failed;
            }
        };

        if response.status != 200 {
            tracing::warn!("Error {}: failed to fetch {}", response.status, url);
            return ItemOutcome::Failed;
        }

        let record = feature_record(self.parser.parse_feature_pairs(&response.body));
        if record.is_empty() {
            ItemOutcome::Empty
        } else {
            ItemOutcome::Record(record)
        }
    }
}
