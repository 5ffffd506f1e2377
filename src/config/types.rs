use crate::state::PriceWindow;
use serde::Deserialize;

/// Main configuration structure for Immo-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub site: SiteConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Target site addressing
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// Search results page that accepts the price and page query parameters
    #[serde(rename = "search-url")]
    pub search_url: String,

    /// Fixed prefix in front of every listing identifier (must end with '/')
    #[serde(rename = "listing-prefix")]
    pub listing_prefix: String,

    #[serde(rename = "min-price-param", default = "default_min_price_param")]
    pub min_price_param: String,

    #[serde(rename = "max-price-param", default = "default_max_price_param")]
    pub max_price_param: String,

    #[serde(rename = "page-param", default = "default_page_param")]
    pub page_param: String,
}

/// User agent sent with every request
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    pub value: String,
}

/// HTTP request behavior
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Upper bound for a whole request, in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Pause between consecutive requests (milliseconds)
    #[serde(rename = "request-delay-ms", default)]
    pub request_delay_ms: u64,

    /// Stop a window after this many pages even if the site keeps answering 200
    #[serde(rename = "max-pages-per-window", default = "default_max_pages")]
    pub max_pages_per_window: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            request_delay_ms: 0,
            max_pages_per_window: default_max_pages(),
        }
    }
}

/// Where discovery starts when no checkpoint exists yet
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    #[serde(rename = "start-min-price", default)]
    pub start_min_price: u64,

    #[serde(rename = "start-max-price", default = "default_start_max_price")]
    pub start_max_price: u64,
}

impl CrawlConfig {
    pub fn start_window(&self) -> PriceWindow {
        PriceWindow::new(self.start_min_price, self.start_max_price)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            start_min_price: 0,
            start_max_price: default_start_max_price(),
        }
    }
}

/// CSS selectors for the target markup
#[derive(Debug, Clone, Deserialize)]
pub struct SelectorConfig {
    /// Anchor of a listing card on a search page
    #[serde(rename = "listing-link", default = "default_listing_link")]
    pub listing_link: String,

    /// Listings whose anchor title contains this text are auctions and skipped
    #[serde(rename = "auction-marker", default = "default_auction_marker")]
    pub auction_marker: String,

    #[serde(rename = "result-count", default = "default_result_count")]
    pub result_count: String,

    #[serde(rename = "feature-title", default = "default_feature_title")]
    pub feature_title: String,

    #[serde(rename = "feature-value", default = "default_feature_value")]
    pub feature_value: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            listing_link: default_listing_link(),
            auction_marker: default_auction_marker(),
            result_count: default_result_count(),
            feature_title: default_feature_title(),
            feature_value: default_feature_value(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Two-line checkpoint file (price window, items processed)
    #[serde(rename = "checkpoint-path")]
    pub checkpoint_path: String,

    /// Raw discovered URLs, appended per window
    #[serde(rename = "urls-path")]
    pub urls_path: String,

    #[serde(rename = "deduplicated-urls-path")]
    pub deduplicated_urls_path: String,

    /// Append-only raw dataset
    #[serde(rename = "dataset-path")]
    pub dataset_path: String,

    #[serde(rename = "formatted-dataset-path")]
    pub formatted_dataset_path: String,
}

fn default_min_price_param() -> String {
    "prezzoMinimo".to_string()
}

fn default_max_price_param() -> String {
    "prezzoMassimo".to_string()
}

fn default_page_param() -> String {
    "pag".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

/// Page cap applied to a window when none is configured
pub const DEFAULT_MAX_PAGES_PER_WINDOW: u32 = 1000;

fn default_max_pages() -> u32 {
    DEFAULT_MAX_PAGES_PER_WINDOW
}

fn default_start_max_price() -> u64 {
    20_000
}

fn default_listing_link() -> String {
    "a.in-listingCardTitle".to_string()
}

fn default_auction_marker() -> String {
    "asta".to_string()
}

fn default_result_count() -> String {
    "div.in-realEstateListHeader__title".to_string()
}

fn default_feature_title() -> String {
    "dt.re-featuresItem__title".to_string()
}

fn default_feature_value() -> String {
    "dd.re-featuresItem__description".to_string()
}
