use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs over the same stores can be matched to the
/// configuration that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const MINIMAL: &str = r#"
[site]
search-url = "https://www.immobiliare.it/vendita-case/roma/"
listing-prefix = "https://www.immobiliare.it/annunci/"

[user-agent]
value = "Mozilla/5.0 (TestHarvest)"

[output]
checkpoint-path = "./checkpoint.txt"
urls-path = "./urls.txt"
deduplicated-urls-path = "./urls_dedup.txt"
dataset-path = "./dataset.json"
formatted-dataset-path = "./formatted.json"
"#;

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let file = create_temp_config(MINIMAL);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.min_price_param, "prezzoMinimo");
        assert_eq!(config.site.max_price_param, "prezzoMassimo");
        assert_eq!(config.site.page_param, "pag");
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.request_delay_ms, 0);
        assert_eq!(config.crawl.start_window().low(), 0);
        assert_eq!(config.crawl.start_window().high(), 20_000);
        assert_eq!(config.selectors.listing_link, "a.in-listingCardTitle");
        assert_eq!(config.selectors.auction_marker, "asta");
    }

    #[test]
    fn test_load_config_overrides() {
        let content = format!(
            "{}\n[fetch]\ntimeout-secs = 5\nmax-pages-per-window = 3\n\n[crawl]\nstart-min-price = 400000\nstart-max-price = 420000\n",
            MINIMAL
        );
        let file = create_temp_config(&content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.fetch.timeout_secs, 5);
        assert_eq!(config.fetch.max_pages_per_window, 3);
        assert_eq!(config.fetch.connect_timeout_secs, 10);
        assert_eq!(config.crawl.start_window().low(), 400_000);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = MINIMAL.replace(
            "https://www.immobiliare.it/annunci/\"",
            "https://www.immobiliare.it/annunci\"",
        );
        let file = create_temp_config(&content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
