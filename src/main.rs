//! Registry Crawler main entry point
//!
//! This is the command-line interface for the commercial registry crawler.

use anyhow::Context;
use clap::Parser;
use registry_crawler::config::{load_config_with_hash, Config};
use registry_crawler::crawler::{configured_regions, crawl, plan_region};
use registry_crawler::output::{load_errors, load_statistics, print_errors, print_statistics};
use registry_crawler::storage::open_storage;
use registry_crawler::{ErrorStage, Region};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Registry Crawler: incremental commercial registry scraper
///
/// Walks each configured region's identifier space from where the last crawl
/// stopped, storing companies and their personnel and recording every record
/// that could not be scraped.
#[derive(Parser, Debug)]
#[command(name = "registry-crawler")]
#[command(version)]
#[command(about = "An incremental commercial registry scraper", long_about = None)]
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

    /// Only crawl the region with this code (1-6)
    #[arg(long, value_name = "N", value_parser = parse_region)]
    region: Option<Region>,

    /// Validate config and show what would be dispatched without crawling
    #[arg(long, conflicts_with_all = ["stats", "errors"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "errors"])]
    stats: bool,

    /// List recorded scrape errors and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    errors: bool,

    /// Only list errors of this stage (company, personnel, unknown)
    #[arg(long, value_name = "S", requires = "errors", value_parser = parse_stage)]
    stage: Option<ErrorStage>,
}

fn parse_region(s: &str) -> Result<Region, String> {
    s.parse::<Region>().map_err(|e| e.to_string())
}

fn parse_stage(s: &str) -> Result<ErrorStage, String> {
    ErrorStage::from_db_string(s)
        .ok_or_else(|| format!("unknown stage '{}' (expected company, personnel or unknown)", s))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config, cli.region)
    } else if cli.stats {
        handle_stats(&config)
    } else if cli.errors {
        handle_errors(&config, cli.stage)
    } else {
        handle_crawl(config, &config_hash, cli.region).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("registry_crawler=info,warn"),
            1 => EnvFilter::new("registry_crawler=debug,info"),
            2 => EnvFilter::new("registry_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows each region's resume point and ceiling
fn handle_dry_run(config: &Config, only: Option<Region>) -> anyhow::Result<()> {
    println!("=== Registry Crawler Dry Run ===\n");

    println!("Registry:");
    println!("  Base URL: {}", config.registry.base_url);
    println!("  Timezone: {}", config.registry.timezone);

    println!("\nCrawler Configuration:");
    println!("  Request limit: {}", config.crawler.request_limit);
    println!("  Pause: {}ms", config.crawler.pause_ms);
    println!(
        "  Max concurrent units: {}",
        config.crawler.max_concurrent_units
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let regions = match only {
        Some(region) => vec![region],
        None => configured_regions(config),
    };

    println!("\nRegions ({}):", regions.len());
    let mut total = 0;
    for region in regions {
        let plan = plan_region(&storage, config, region)?;
        println!(
            "  - {}: resume at {}, ceiling {}, {} to dispatch",
            region,
            plan.start,
            plan.ceiling,
            plan.pending()
        );
        total += plan.pending();
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would dispatch {} scrape units", total);

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --errors mode: lists recorded scrape errors
fn handle_errors(config: &Config, stage: Option<ErrorStage>) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.output.database_path))?;
    let errors = load_errors(&storage, stage)?;
    print_errors(&errors);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: &str,
    only: Option<Region>,
) -> anyhow::Result<()> {
    match only {
        Some(region) => tracing::info!("Crawling {} only", region),
        None => tracing::info!("Crawling {} configured regions", config.regions.len()),
    }

    let report = crawl(config, config_hash, only)
        .await
        .context("Crawl failed")?;

    for region in &report.regions {
        tracing::info!(
            "{}: sequences {}..={}, {} dispatched",
            region.region,
            region.start,
            region.ceiling,
            region.dispatched
        );
    }

    Ok(())
}
