//! Review-Sweep main entry point
//!
//! This is the command-line interface for the Review-Sweep crawler.

use clap::Parser;
use review_sweep::config::{load_config_with_hash, Config};
use review_sweep::crawler::{load_url_list, sweep, DispatchPlan};
use review_sweep::extract::SelectorExtractor;
use review_sweep::storage::FileHistoryStore;
use review_sweep::RegionClassifier;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Review-Sweep: a resumable, partitioned review crawler
///
/// Review-Sweep visits every listing page in a URL list, collects its
/// reviews into one JSONL file per region and records each page in a
/// history log, so an interrupted run picks up where it stopped.
#[derive(Parser, Debug)]
#[command(name = "review-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A resumable, partitioned review crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// URL list to crawl, overriding `[input] url-list`
    #[arg(long, value_name = "PATH")]
    urls: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Delete the history log and crawl every URL again (the URL list must exist)
    #[arg(long, conflicts_with = "stats")]
    fresh: bool,

    /// Validate config and show how the URL list would be split without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the history log and dataset and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,

    /// Write the run report as JSON to this path
    #[arg(long, value_name = "PATH", conflicts_with_all = ["dry_run", "stats"])]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let url_list = cli
        .urls
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.input.url_list));

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config, &url_list)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(&config, &url_list, cli.fresh, cli.report.as_deref()).await?;
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
            0 => EnvFilter::new("review_sweep=info,warn"),
            1 => EnvFilter::new("review_sweep=debug,info"),
            2 => EnvFilter::new("review_sweep=trace,debug"),
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
fn handle_dry_run(config: &Config, url_list: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Review-Sweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Target reviews per page: {}", config.crawler.target_reviews);
    println!(
        "  Max scroll attempts: {}",
        config.crawler.max_scroll_attempts
    );
    println!(
        "  Settle delay: {}-{}ms",
        config.crawler.settle_delay.min_ms, config.crawler.settle_delay.max_ms
    );
    println!(
        "  Scroll pause: {}-{}ms",
        config.crawler.scroll_pause.min_ms, config.crawler.scroll_pause.max_ms
    );
    println!(
        "  Politeness pause: {}-{}ms",
        config.crawler.politeness_pause.min_ms, config.crawler.politeness_pause.max_ms
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Dataset: {}", config.output.dataset_dir);
    println!("  History: {}", config.output.history_path);

    let classifier = RegionClassifier::from_config(config);
    println!("\nRegions:");
    for region in classifier.region_names() {
        println!("  - {}", region);
    }

    // Selectors must compile before anything would be crawled
    SelectorExtractor::new(&config.selectors)?;

    let history = FileHistoryStore::new(&config.output.history_path);
    let plan = DispatchPlan::build(
        load_url_list(url_list)?,
        &history,
        config.crawler.workers as usize,
    )?;

    println!("\nURL List: {}", url_list.display());
    println!("  Distinct URLs: {}", plan.universe);
    println!("  Already crawled: {}", plan.already_done);
    println!("  To crawl: {}", plan.scheduled());
    for (index, partition) in plan.partitions.iter().enumerate() {
        println!("  Worker {}: {} URLs", index + 1, partition.len());
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the history log and dataset
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use review_sweep::output::{load_statistics, print_statistics};

    println!("History: {}", config.output.history_path);
    println!("Dataset: {}\n", config.output.dataset_dir);

    let stats = load_statistics(config)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    url_list: &Path,
    fresh: bool,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if fresh {
        // A missing URL list must not cost the user their history
        load_url_list(url_list)?;

        let history = FileHistoryStore::new(&config.output.history_path);
        if history.reset()? {
            tracing::info!("Starting fresh crawl (history log removed)");
        }
    } else {
        tracing::info!("Starting crawl (URLs in the history log are skipped)");
    }

    tracing::info!(
        "Workers: {}, target reviews per page: {}",
        config.crawler.workers,
        config.crawler.target_reviews
    );

    // Run the crawler
    let report = match sweep(config, url_list).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if report.aborted_workers() > 0 {
        tracing::warn!(
            "{} worker(s) could not start; their URLs stay pending",
            report.aborted_workers()
        );
    }

    if let Some(path) = report_path {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        tracing::info!("Run report written to: {}", path.display());
    }

    tracing::info!("Crawl completed successfully");
    Ok(())
}
