//! Meeple-Harvest main entry point
//!
//! This is the command-line interface for the Meeple-Harvest ratings
//! harvester.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use meeple_harvest::config::load_config_with_hash;
use meeple_harvest::crawler::Coordinator;
use meeple_harvest::output::{print_summary, summarize, write_ratings_csv};
use tracing_subscriber::EnvFilter;

/// Meeple-Harvest: a BoardGameGeek ratings harvester
///
/// Meeple-Harvest discovers users from the per-country directory listing
/// and collects every discovered user's rated board games from the XML
/// API, writing the merged dataset to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "meeple-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A BoardGameGeek ratings harvester", long_about = None)]
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

    /// Validate config and show what would be crawled without fetching
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
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_harvest(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("meeple_harvest=info,warn"),
            1 => EnvFilter::new("meeple_harvest=debug,info"),
            2 => EnvFilter::new("meeple_harvest=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &meeple_harvest::config::Config) {
    println!("=== Meeple-Harvest Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Max fetch attempts: {}", config.crawler.max_fetch_attempts);
    println!(
        "  Max concurrent fetches: {}",
        config.crawler.max_concurrent_fetches
    );
    if config.crawler.country_limit > 0 {
        println!("  Country limit: {}", config.crawler.country_limit);
    } else {
        println!("  Country limit: none (all countries)");
    }

    println!("\nRemote Endpoints:");
    println!("  Users directory: {}", config.site.users_url);
    println!("  Collection API: {}", config.site.collection_url);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Ratings CSV: {}", config.output.ratings_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: meeple_harvest::config::Config) -> anyhow::Result<()> {
    let ratings_path = config.output.ratings_path.clone();

    let coordinator = Coordinator::new(config).context("failed to initialize the crawler")?;

    // First Ctrl-C stops dispatching new fetches; in-flight ones finish
    let cancel = coordinator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight fetches");
            cancel.store(true, Ordering::Relaxed);
        }
    });

    let started_at = chrono::Utc::now();
    let result = coordinator.run().await?;
    let finished_at = chrono::Utc::now();

    if result.is_empty() {
        tracing::warn!("The harvest produced no data; not writing {}", ratings_path);
        return Ok(());
    }

    write_ratings_csv(&result, std::path::Path::new(&ratings_path))
        .with_context(|| format!("failed to write {}", ratings_path))?;
    tracing::info!("Wrote {} rated items to {}", result.items.len(), ratings_path);

    let summary = summarize(&result, started_at, finished_at);
    print_summary(&summary);

    Ok(())
}
