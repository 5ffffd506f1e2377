//! Paged crawl of one price window
//!
//! Result pages are requested as page 1, 2, 3, ... until the site answers 404.
//! Any other non-200 status or a transport failure also ends the window; there
//! is no retry, so the window is reported as possibly incomplete instead.

use crate::config::DEFAULT_MAX_PAGES_PER_WINDOW;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::parser::PageParser;
use crate::output::WindowStop;
use crate::state::PriceWindow;
use crate::url::SearchPages;
use std::time::Duration;

/// What one window's crawl collected and why it stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowCrawl {
    /// Listing URLs in page order, duplicates included
    pub urls: Vec<String>,

    /// Pages that answered 200
    pub pages: u32,

    pub stop: WindowStop,
}

/// Walks the result pages of a price window
pub struct PaginationCrawler<'a> {
    fetcher: &'a dyn Fetcher,
    parser: &'a dyn PageParser,
    pages: &'a SearchPages,
    request_delay: Duration,
    max_pages: u32,
}

impl<'a> PaginationCrawler<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, parser: &'a dyn PageParser, pages: &'a SearchPages) -> Self {
        Self {
            fetcher,
            parser,
            pages,
            request_delay: Duration::ZERO,
            max_pages: DEFAULT_MAX_PAGES_PER_WINDOW,
        }
    }

    /// Pause before every page after the first
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Give up on a window after this many pages
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Crawls `window` from page 1 until exhaustion or the first failure
    ///
    /// Never fails: every stop condition is reported in `WindowCrawl::stop`
    /// together with the URLs gathered up to that point.
    pub async fn crawl(&self, window: &PriceWindow) -> WindowCrawl {
        let mut urls = Vec::new();
        let mut pages = 0;
        let mut page: u32 = 1;

        let stop = loop {
            if page > self.max_pages {
                tracing::warn!(
                    "Window {}: stopping after {} pages without reaching the end",
                    window,
                    self.max_pages
                );
                break WindowStop::PageLimit;
            }

            if page > 1 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }

            let url = self.pages.page_url(window, page);
            let response = match self.fetcher.fetch(url.as_str()).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!("Window {}, page {}: {}", window, page, e);
                    break WindowStop::Transport(e.to_string());
                }
            };

            match response.status {
                200 => {
                    if page == 1 {
                        match self.parser.parse_result_count(&response.body) {
                            Some(count) => {
                                tracing::info!("Window {}: {} results advertised", window, count)
                            }
                            None => tracing::debug!("Window {}: no result count on page 1", window),
                        }
                    }

                    let page_urls = self.parser.parse_listing_links(&response.body);
                    tracing::info!("Page {}: retrieved {} URLs", page, page_urls.len());
                    urls.extend(page_urls);
                    pages += 1;
                }
                404 => break WindowStop::Exhausted,
                403 => {
                    tracing::warn!("Access denied (403) for {}", url);
                    break WindowStop::AccessDenied;
                }
                status => {
                    tracing::warn!("Unknown status {} for {}", status, url);
                    break WindowStop::UnknownStatus(status);
                }
            }

            page = match page.checked_add(1) {
                Some(next) => next,
                None => break WindowStop::PageLimit,
            };
        };

        tracing::info!(
            "Window {}: {} pages, {} URLs ({})",
            window,
            pages,
            urls.len(),
            stop
        );

        WindowCrawl { urls, pages, stop }
    }
}
