//! Listing identifiers and deduplication

use indexmap::IndexSet;
use std::fmt;
use url::Url;

/// Canonical identifier of one listing
///
/// This is the path segment after the listing prefix, with no scheme, host,
/// query, fragment or trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListingRef(String);

impl ListingRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The canonical absolute URL: `prefix` + identifier + `/`
    pub fn to_url(&self, prefix: &str) -> String {
        format!("{}{}/", prefix, self.0)
    }
}

impl fmt::Display for ListingRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extracts the listing identifier from a raw URL line
///
/// The URL must sit under `prefix`. Scheme and a leading `www.` on the host
/// are not significant, so `http://immobiliare.it/annunci/1` matches the
/// prefix `https://www.immobiliare.it/annunci/`.
///
/// # Returns
///
/// `None` for lines outside the prefix or with an empty identifier, which
/// includes a line torn by an interrupted write.
///
/// # Examples
///
/// ```
/// use immo_harvest::url::listing_ref;
///
/// let id = listing_ref("https://host/annunci/AB1/\n", "https://host/annunci/").unwrap();
/// assert_eq!(id.as_str(), "AB1");
/// ```
pub fn listing_ref(raw: &str, prefix: &str) -> Option<ListingRef> {
    let trimmed = raw.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or("");
    let without_query = without_fragment.split('?').next().unwrap_or("");

    let rest = match without_query.strip_prefix(prefix) {
        Some(rest) => rest.to_string(),
        None => strip_prefix_loosely(without_query, prefix)?,
    };

    let id = rest.trim_end_matches('/');
    if id.is_empty() {
        return None;
    }

    Some(ListingRef(id.to_string()))
}

/// Prefix match that ignores scheme, host case and a `www.` host prefix
fn strip_prefix_loosely(candidate: &str, prefix: &str) -> Option<String> {
    let candidate = Url::parse(candidate).ok()?;
    let prefix = Url::parse(prefix).ok()?;

    if bare_host(&candidate)? != bare_host(&prefix)? || candidate.port() != prefix.port() {
        return None;
    }

    candidate
        .path()
        .strip_prefix(prefix.path())
        .map(str::to_string)
}

fn bare_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Result of deduplicating the raw URL store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deduplicated {
    /// One canonical URL per listing, in first-seen order
    pub urls: Vec<String>,

    /// Lines that did not yield a listing identifier
    pub rejected: Vec<String>,

    /// Lines dropped because their listing was already seen
    pub duplicates: usize,
}

/// Collapses raw URLs to one canonical URL per listing
///
/// Every surviving URL is rebuilt from its identifier as `prefix` + id + `/`.
/// First-seen order is kept, though callers persist the result once rather
/// than depend on it being reproducible across different raw stores.
pub fn dedupe<S: AsRef<str>>(raw_urls: &[S], prefix: &str) -> Deduplicated {
    let mut seen: IndexSet<ListingRef> = IndexSet::new();
    let mut rejected = Vec::new();
    let mut duplicates = 0;

    for raw in raw_urls {
        let raw = raw.as_ref();
        match listing_ref(raw, prefix) {
            Some(id) => {
                if !seen.insert(id) {
                    duplicates += 1;
                }
            }
            None => {
                if !raw.trim().is_empty() {
                    rejected.push(raw.trim().to_string());
                }
            }
        }
    }

    Deduplicated {
        urls: seen.iter().map(|id| id.to_url(prefix)).collect(),
        rejected,
        duplicates,
    }
}
