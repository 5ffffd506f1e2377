//! HTML parser for search and listing pages
//!
//! All knowledge of the target site's markup lives here, behind
//! `PageParser`. Another site only needs another implementation.

use crate::config::SelectorConfig;
use crate::storage::FeatureRecord;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracts the three things the pipeline needs from a page body
pub trait PageParser: Send + Sync {
    /// Absolute listing URLs on a search page, auctions excluded
    fn parse_listing_links(&self, body: &str) -> Vec<String>;

    /// The advertised number of results on a search page, if shown
    fn parse_result_count(&self, body: &str) -> Option<String>;

    /// Feature name/value pairs on a listing page, in page order
    fn parse_feature_pairs(&self, body: &str) -> Vec<(String, String)>;
}

/// Builds a record from feature pairs; a repeated name keeps its last value
pub fn feature_record(pairs: Vec<(String, String)>) -> FeatureRecord {
    pairs.into_iter().collect()
}

/// `PageParser` driven by configurable CSS selectors
#[derive(Debug, Clone)]
pub struct ListingPageParser {
    base_url: Url,
    listing_link: Selector,
    auction_marker: String,
    result_count: Selector,
    feature_title: Selector,
    feature_value: Selector,
}

impl ListingPageParser {
    /// Compiles the selectors; relative links resolve against `base_url`
    pub fn new(base_url: Url, selectors: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url,
            listing_link: compile(&selectors.listing_link)?,
            auction_marker: selectors.auction_marker.clone(),
            result_count: compile(&selectors.result_count)?,
            feature_title: compile(&selectors.feature_title)?,
            feature_value: compile(&selectors.feature_value)?,
        })
    }

    fn is_auction(&self, element: &ElementRef) -> bool {
        !self.auction_marker.is_empty()
            && element
                .value()
                .attr("title")
                .is_some_and(|title| title.contains(&self.auction_marker))
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::Validation(format!("Invalid selector '{}': {:?}", selector, e)))
}

impl PageParser for ListingPageParser {
    fn parse_listing_links(&self, body: &str) -> Vec<String> {
        let document = Html::parse_document(body);

        document
            .select(&self.listing_link)
            .filter(|element| !self.is_auction(element))
            .filter_map(|element| element.value().attr("href"))
            .filter_map(|href| resolve_link(href, &self.base_url))
            .collect()
    }

    fn parse_result_count(&self, body: &str) -> Option<String> {
        let document = Html::parse_document(body);
        let label = document
            .select(&self.result_count)
            .next()
            .map(|element| element_text(&element))?;

        // "1.234 risultati per: case in vendita Roma" -> "1.234"
        let count = label
            .split(" risultati")
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();

        if count.is_empty() {
            None
        } else {
            Some(count)
        }
    }

    fn parse_feature_pairs(&self, body: &str) -> Vec<(String, String)> {
        let document = Html::parse_document(body);

        let titles: Vec<String> = document
            .select(&self.feature_title)
            .map(|element| element_text(&element))
            .collect();
        let values: Vec<String> = document
            .select(&self.feature_value)
            .map(|element| element_text(&element))
            .collect();

        if titles.len() != values.len() {
            tracing::debug!(
                "Feature lists differ in length ({} titles, {} values); pairing by position",
                titles.len(),
                values.len()
            );
        }

        titles.into_iter().zip(values).collect()
    }
}

/// Text nodes of an element, trimmed and joined by single spaces
fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolves a link href to an absolute http(s) URL
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url.to_string())
    } else {
        None
    }
}
