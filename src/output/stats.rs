//! Phase reports
//!
//! Per-page and per-item failures never stop the pipeline, so these counters
//! are the only place they become visible.

use crate::state::PriceWindow;
use std::fmt;

/// Why the crawl of one price window stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowStop {
    /// HTTP 404: no more result pages
    Exhausted,

    /// HTTP 403
    AccessDenied,

    /// Any other non-200 status
    UnknownStatus(u16),

    /// Connection or timeout failure
    Transport(String),

    /// The per-window page cap was reached
    PageLimit,
}

impl WindowStop {
    /// True when the window may have more pages than were collected
    pub fn is_incomplete(&self) -> bool {
        !matches!(self, Self::Exhausted)
    }
}

impl fmt::Display for WindowStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => write!(f, "exhausted"),
            Self::AccessDenied => write!(f, "access denied (403)"),
            Self::UnknownStatus(status) => write!(f, "unknown status {}", status),
            Self::Transport(error) => write!(f, "transport error: {}", error),
            Self::PageLimit => write!(f, "page limit reached"),
        }
    }
}

/// Counters for the discovery phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryReport {
    pub windows_crawled: u64,
    pub pages_fetched: u64,
    pub urls_found: u64,
    pub access_denied: u64,
    pub unknown_status: u64,
    pub transport_errors: u64,

    /// Windows that stopped for any reason other than exhaustion
    pub incomplete_windows: Vec<(PriceWindow, WindowStop)>,

    /// Window left checkpointed after a transport failure ended the run
    pub interrupted_at: Option<PriceWindow>,
}

impl DiscoveryReport {
    /// Folds the outcome of one window into the totals
    pub fn record_window(&mut self, window: PriceWindow, pages: u32, urls: usize, stop: &WindowStop) {
        self.windows_crawled += 1;
        self.pages_fetched += u64::from(pages);
        self.urls_found += urls as u64;

        match stop {
            WindowStop::AccessDenied => self.access_denied += 1,
            WindowStop::UnknownStatus(_) => self.unknown_status += 1,
            WindowStop::Transport(_) => self.transport_errors += 1,
            WindowStop::Exhausted | WindowStop::PageLimit => {}
        }

        if stop.is_incomplete() {
            self.incomplete_windows.push((window, stop.clone()));
        }
    }

    /// True when discovery stopped before the walk reached its end
    pub fn is_interrupted(&self) -> bool {
        self.interrupted_at.is_some()
    }

    pub fn log(&self) {
        tracing::info!(
            "Discovery: {} windows, {} pages, {} URLs ({} access denied, {} unknown status, {} transport errors)",
            self.windows_crawled,
            self.pages_fetched,
            self.urls_found,
            self.access_denied,
            self.unknown_status,
            self.transport_errors
        );
        for (window, stop) in &self.incomplete_windows {
            tracing::warn!("Window {} may be incomplete: {}", window, stop);
        }
        if let Some(window) = &self.interrupted_at {
            tracing::warn!("Discovery interrupted; window {} will be crawled again", window);
        }
    }
}

/// Counters for the deduplication pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub raw_urls: usize,
    pub unique_urls: usize,
    pub duplicates: usize,
    pub rejected: usize,

    /// The deduplicated store was kept because extraction already indexes it
    pub kept_existing: bool,
}

impl DedupReport {
    pub fn log(&self) {
        if self.kept_existing {
            tracing::info!("Dedupe: kept existing store with {} URLs", self.unique_urls);
        } else {
            tracing::info!(
                "Dedupe: {} raw URLs -> {} unique ({} duplicates, {} rejected)",
                self.raw_urls,
                self.unique_urls,
                self.duplicates,
                self.rejected
            );
        }
    }
}

/// Counters for the extraction phase
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Checkpointed item count the run started from
    pub start_offset: u64,
    pub attempted: u64,
    pub saved: u64,

    /// Items that produced no record; these are not retried
    pub skipped: u64,

    /// Skips caused by a failed fetch rather than an empty page
    pub errors: u64,

    /// Checkpointed item count when the run ended
    pub items_processed: u64,
}

impl ExtractionReport {
    pub fn log(&self) {
        tracing::info!(
            "Extraction: started at item {}, {} attempted, {} saved, {} skipped ({} errors); {} items processed in total",
            self.start_offset,
            self.attempted,
            self.saved,
            self.skipped,
            self.errors,
            self.items_processed
        );
    }
}

/// Everything a full pipeline run did
#[derive(Debug, Clone, Default)]
pub struct HarvestSummary {
    pub discovery: Option<DiscoveryReport>,
    pub dedup: Option<DedupReport>,
    pub extraction: Option<ExtractionReport>,

    /// Records in the normalized dataset
    pub normalized_records: Option<usize>,
}
