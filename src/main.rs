//! Immo-Harvest main entry point
//!
//! This is the command-line interface for the Immo-Harvest listing crawler.

use anyhow::Context;
use clap::Parser;
use immo_harvest::config::{load_config_with_hash, Config};
use immo_harvest::crawler::Harvester;
use immo_harvest::state::{advance, WindowCursor};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Immo-Harvest: a resumable real-estate listing crawler
///
/// With no phase flag, runs discovery, dedupe, extraction and normalization
/// in order. Each phase resumes from the checkpoint file.
#[derive(Parser, Debug)]
#[command(name = "immo-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A resumable real-estate listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the planned price windows without crawling
    #[arg(long, group = "phase")]
    dry_run: bool,

    /// Only crawl price windows and collect listing URLs
    #[arg(long, group = "phase")]
    discover: bool,

    /// Only deduplicate the collected listing URLs
    #[arg(long, group = "phase")]
    dedupe: bool,

    /// Only extract features from the deduplicated listings
    #[arg(long, group = "phase")]
    extract: bool,

    /// Only rewrite the raw dataset as a formatted JSON array
    #[arg(long, group = "phase")]
    normalize: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let mut harvester = Harvester::new(config).context("failed to initialize harvester")?;

    if cli.discover {
        harvester.discover().await?;
    } else if cli.dedupe {
        harvester.dedupe()?;
    } else if cli.extract {
        harvester.extract().await?;
    } else if cli.normalize {
        harvester.normalize()?;
    } else {
        let summary = harvester.run().await?;
        if summary.discovery.as_ref().is_some_and(|d| d.is_interrupted()) {
            tracing::warn!("Discovery was interrupted; rerun to resume before dedupe and extraction");
        }
        if let Some(count) = summary.normalized_records {
            tracing::info!("Harvest complete: {} records in the formatted dataset", count);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("immo_harvest=info,warn"),
            1 => EnvFilter::new("immo_harvest=debug,info"),
            2 => EnvFilter::new("immo_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows what a run would do
fn handle_dry_run(config: &Config) {
    println!("=== Immo-Harvest Dry Run ===\n");

    println!("Site:");
    println!("  Search URL: {}", config.site.search_url);
    println!("  Listing prefix: {}", config.site.listing_prefix);

    println!("\nFetch:");
    println!("  Timeout: {}s", config.fetch.timeout_secs);
    println!("  Request delay: {}ms", config.fetch.request_delay_ms);
    println!("  Max pages per window: {}", config.fetch.max_pages_per_window);

    let mut cursor = WindowCursor::Open(config.crawl.start_window());
    let mut windows = Vec::new();
    while let WindowCursor::Open(window) = cursor {
        windows.push(window);
        cursor = advance(&window);
    }
    println!("\nPrice windows from a fresh start ({}):", windows.len());
    if let (Some(first), Some(last)) = (windows.first(), windows.last()) {
        println!("  First: {}", first);
        println!("  Last:  {}", last);
    }

    println!("\nOutput:");
    println!("  Checkpoint: {}", config.output.checkpoint_path);
    println!("  URLs: {}", config.output.urls_path);
    println!("  Deduplicated URLs: {}", config.output.deduplicated_urls_path);
    println!("  Dataset: {}", config.output.dataset_path);
    println!("  Formatted dataset: {}", config.output.formatted_dataset_path);

    println!("\n✓ Configuration is valid");
}
