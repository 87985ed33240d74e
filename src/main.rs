//! Catalog-Crawler main entry point
//!
//! This is the command-line interface for the Catalog-Crawler listing crawler.

use anyhow::Context;
use catalog_crawler::config::{load_config_with_hash, validate, Config};
use catalog_crawler::crawler::Coordinator;
use catalog_crawler::output::{print_statistics, write_json_summary, CrawlStatistics};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Catalog-Crawler: a polite crawler for paginated catalog listings
///
/// Catalog-Crawler walks a stateful, token-paginated listing, visits every
/// item it finds exactly once at a polite pace, and writes the extracted
/// records as JSON for downstream feed generation.
#[derive(Parser, Debug)]
#[command(name = "catalog-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A polite crawler for paginated catalog listings", long_about = None)]
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

    /// Override the maximum number of records to produce
    #[arg(long, value_name = "N")]
    max_items: Option<u32>,

    /// Override the output file path
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context(format!("loading {}", cli.config.display()));
        }
    };

    if let Some(max_items) = cli.max_items {
        config.crawler.max_items = max_items;
    }
    if let Some(output) = &cli.output {
        config.output.path = output.display().to_string();
    }
    validate(&config).context("invalid command-line override")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_crawler=info,warn"),
            1 => EnvFilter::new("catalog_crawler=debug,info"),
            2 => EnvFilter::new("catalog_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Catalog-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max items: {}", config.crawler.max_items);
    println!("  Page size: {}", config.crawler.page_size);
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!(
        "  Retries: {} (backoff base {}ms)",
        config.crawler.max_retries, config.crawler.backoff_base_ms
    );
    println!(
        "  Delays: {}ms between items, {}ms between pages",
        config.crawler.inter_request_delay_ms, config.crawler.page_delay_ms
    );
    println!(
        "  Concurrent items: {}",
        config.crawler.max_concurrent_items
    );
    println!("  Price floor: {}", config.crawler.price_floor);

    println!("\nSite:");
    println!("  Listing: {}", config.site.listing_url());
    println!("  Item pattern: {}", config.site.item_pattern);
    println!(
        "  Widget: {} in form {}",
        config.site.component_id, config.site.form_id
    );
    for (name, value) in &config.site.filters {
        println!("    {} = {:?}", name, value);
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);
    println!("  Accept-Language: {}", config.user_agent.accept_language);

    println!("\nOutput:");
    println!("  JSON: {}", config.output.path);

    if config.region.is_empty() {
        println!("\nRegions: built-in table");
    } else {
        println!("\nRegions ({} rules, first match wins):", config.region.len());
        for entry in &config.region {
            println!("  - {} -> {}", entry.keyword, entry.region);
        }
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> anyhow::Result<()> {
    let output_path = PathBuf::from(&config.output.path);

    let cancel = CancellationToken::new();
    let coordinator = Coordinator::new(config)?.with_cancellation(cancel.clone());

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current request");
            cancel.cancel();
        }
    });

    // Run the crawler
    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    let summary = write_json_summary(&report, Some(config_hash), Path::new(&output_path))
        .with_context(|| format!("writing {}", output_path.display()))?;

    let stats = CrawlStatistics::from_records(&report.records);
    print_statistics(&summary, &stats);
    println!("\n✓ {} records written to: {}", summary.count, output_path.display());

    Ok(())
}
