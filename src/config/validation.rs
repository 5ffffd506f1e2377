use crate::config::types::{
    Config, CrawlConfig, FetchConfig, OutputConfig, SelectorConfig, SiteConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_fetch_config(&config.fetch)?;
    validate_crawl_config(&config.crawl)?;
    validate_selector_config(&config.selectors)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates site addressing
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url("search-url", &config.search_url)?;
    validate_http_url("listing-prefix", &config.listing_prefix)?;

    // Identifiers are cut out of the path right after the prefix
    if !config.listing_prefix.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "listing-prefix must end with '/', got '{}'",
            config.listing_prefix
        )));
    }

    for (name, value) in [
        ("min-price-param", &config.min_price_param),
        ("max-price-param", &config.max_price_param),
        ("page-param", &config.page_param),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

fn validate_http_url(name: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", name, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name, value
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent value cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates fetch configuration
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "connect-timeout-secs must be >= 1, got {}",
            config.connect_timeout_secs
        )));
    }

    if config.max_pages_per_window < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages-per-window must be >= 1, got {}",
            config.max_pages_per_window
        )));
    }

    Ok(())
}

/// Validates the start window
fn validate_crawl_config(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.start_min_price > config.start_max_price {
        return Err(ConfigError::Validation(format!(
            "start-min-price ({}) cannot exceed start-max-price ({})",
            config.start_min_price, config.start_max_price
        )));
    }
    Ok(())
}

/// Validates that every selector parses as CSS
fn validate_selector_config(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("listing-link", &config.listing_link),
        ("result-count", &config.result_count),
        ("feature-title", &config.feature_title),
        ("feature-value", &config.feature_value),
    ] {
        Selector::parse(value).map_err(|e| {
            ConfigError::Validation(format!("Invalid {} selector '{}': {:?}", name, value, e))
        })?;
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("checkpoint-path", &config.checkpoint_path),
        ("urls-path", &config.urls_path),
        ("deduplicated-urls-path", &config.deduplicated_urls_path),
        ("dataset-path", &config.dataset_path),
        ("formatted-dataset-path", &config.formatted_dataset_path),
    ] {
        if value.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    if config.urls_path == config.deduplicated_urls_path {
        return Err(ConfigError::Validation(
            "urls-path and deduplicated-urls-path must differ".to_string(),
        ));
    }

    if config.dataset_path == config.formatted_dataset_path {
        return Err(ConfigError::Validation(
            "dataset-path and formatted-dataset-path must differ".to_string(),
        ));
    }

    Ok(())
}
