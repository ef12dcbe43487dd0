//! Listing-Harvest main entry point
//!
//! This is the command-line interface for the Listing-Harvest directory harvester.

use anyhow::Context;
use clap::Parser;
use listing_harvest::config::{load_config_with_hash, validate, Config};
use listing_harvest::harvester::{page_url, Harvester};
use listing_harvest::output::print_report;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Listing-Harvest: a polite directory listing harvester
///
/// Walks the paginated listing pages of one directory site, extracts a record
/// from every listing card, and writes the collection to a JSON file.
#[derive(Parser, Debug)]
#[command(name = "listing-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite directory listing harvester", long_about = None)]
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

    /// Override the configured maximum page count
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Override the configured output file
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Validate config and show which pages would be requested, without fetching
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
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli)?;

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_harvest(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvest=info,warn"),
            1 => EnvFilter::new("listing_harvest=debug,info"),
            2 => EnvFilter::new("listing_harvest=trace,debug"),
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

/// Applies command-line overrides and re-validates the result
fn apply_overrides(config: &mut Config, cli: &Cli) -> anyhow::Result<()> {
    if let Some(max_pages) = cli.max_pages {
        tracing::info!("Overriding max pages: {}", max_pages);
        config.harvest.max_pages = max_pages;
    }

    if let Some(output) = &cli.output {
        tracing::info!("Overriding output path: {}", output.display());
        config.output.path = output.display().to_string();
    }

    validate(config).context("Invalid configuration after command-line overrides")?;
    Ok(())
}

/// Number of page URLs listed by --dry-run before summarizing the rest
const DRY_RUN_PREVIEW_PAGES: u32 = 5;

/// Splits the page limit into pages listed and pages summarized
fn page_preview(max_pages: u32) -> (u32, u32) {
    let shown = max_pages.min(DRY_RUN_PREVIEW_PAGES);
    (shown, max_pages - shown)
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let base_url = Url::parse(&config.harvest.base_url).context("Invalid base URL")?;

    println!("=== Listing-Harvest Dry Run ===\n");

    println!("Harvest:");
    println!("  Base URL: {}", config.harvest.base_url);
    println!("  Jurisdiction: {}", config.harvest.jurisdiction);
    println!("  Source: {}", config.harvest.source);
    println!("  Max pages: {}", config.harvest.max_pages);
    println!("  Request timeout: {}s", config.harvest.request_timeout_secs);
    match config.harvest.max_run_secs {
        Some(secs) => println!("  Run budget: {}s", secs),
        None => println!("  Run budget: none"),
    }

    println!("\nPacing:");
    println!(
        "  Delay between pages: {}ms - {}ms",
        config.pacing.min_delay_ms, config.pacing.max_delay_ms
    );

    println!("\nSelectors:");
    println!("  Card: {}", config.selectors.card);
    println!("  Name: {}", config.selectors.name);
    println!("  Organization: {}", config.selectors.organization);
    println!("  Phone: {}", config.selectors.phone);
    println!("  Address: {}", config.selectors.address);
    println!("  Tags: {}", config.selectors.tags);

    println!("\nOutput:");
    println!("  File: {}", config.output.path);

    let (shown, remaining) = page_preview(config.harvest.max_pages);
    println!("\nPages ({}):", config.harvest.max_pages);
    for page in 1..=shown {
        println!("  {:>3}. {}", page, page_url(&base_url, page));
    }
    if remaining > 0 {
        println!("  ... {} more", remaining);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Harvesting {} for {} (source: {})",
        config.harvest.base_url,
        config.harvest.jurisdiction,
        config.harvest.source
    );

    let harvester = Harvester::new(config).context("Failed to set up harvester")?;
    let report = harvester
        .run()
        .await
        .context("Harvest finished but its output could not be written")?;

    print_report(&report);

    Ok(())
}
