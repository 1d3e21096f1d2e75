//! Seller-Sweep main entry point
//!
//! This is the command-line interface for the Seller-Sweep listing harvester.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use seller_sweep::config::{load_config_with_hash, Config, NotifyTransport};
use seller_sweep::crawler::{run_scheduled, schedule_interval, Coordinator, CrawlMode, CrawlResult};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Seller-Sweep: a merchant listing harvester
///
/// Seller-Sweep crawls a merchant's product pages for third-party offers, or
/// walks a category's listing pages collecting one listing per seller, and
/// remembers which sellers it has already recorded.
#[derive(Parser, Debug)]
#[command(name = "seller-sweep")]
#[command(version = "1.0.0")]
#[command(about = "A merchant listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the merchant listing's detail pages once and print third-party products
    Detail,

    /// Walk a category's listing pages and print one listing per seller
    Listing {
        /// Category substituted into the seed URL
        #[arg(long)]
        category: String,

        /// Stop once this many unique sellers are collected
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run the detail crawl on the configured schedule until Ctrl-C
    Watch,

    /// Validate config and show the resolved settings without crawling
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    match cli.command {
        Command::Detail => handle_crawl(&config, CrawlMode::Detail).await,
        Command::Listing { category, limit } => {
            if limit == Some(0) {
                bail!("--limit must be at least 1");
            }
            handle_crawl(&config, CrawlMode::Listing { category, limit }).await
        }
        Command::Watch => handle_watch(&config).await,
        Command::Check => {
            handle_check(&config, &hash);
            Ok(())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seller_sweep=info,warn"),
            1 => EnvFilter::new("seller_sweep=debug,info"),
            2 => EnvFilter::new("seller_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    // Logs go to stderr so stdout carries only the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Runs one crawl and prints its records as JSON
///
/// A crawl failure is logged and printed as an empty array; the process
/// still exits successfully.
async fn handle_crawl(config: &Config, mode: CrawlMode) -> anyhow::Result<()> {
    let mut coordinator = Coordinator::from_config(config)?;
    let result = coordinator.run_or_empty(&mode).await;
    tracing::info!("{} crawl returned {} records", mode.as_str(), result.len());
    print_json(&result)
}

/// Handles the watch mode: scheduled detail crawls until Ctrl-C
async fn handle_watch(config: &Config) -> anyhow::Result<()> {
    let period = schedule_interval(&config.schedule)?;
    let mut coordinator = Coordinator::from_config(config)?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let runs = run_scheduled(&mut coordinator, period, shutdown).await;
    tracing::info!("Scheduler stopped after {} runs", runs);
    Ok(())
}

/// Handles the check mode: shows what the configuration resolves to
fn handle_check(config: &Config, hash: &str) {
    println!("=== Seller-Sweep Configuration ===\n");
    println!("Config hash: {}", hash);

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!(
        "  Timeouts: {}s total, {}s connect",
        config.fetcher.timeout_secs, config.fetcher.connect_timeout_secs
    );
    match &config.fetcher.proxy {
        Some(proxy) => println!(
            "  Proxy: {} (key from ${})",
            proxy.endpoint, proxy.api_key_env
        ),
        None => println!("  Proxy: none"),
    }

    println!("\nDetail crawl:");
    println!("  Merchant URL: {}", config.detail.merchant_url);
    println!("  Price rule: {}", config.detail.price_rule.as_str());
    match config.detail.max_concurrent {
        Some(cap) => println!("  Max concurrent: {}", cap),
        None => println!("  Max concurrent: unbounded"),
    }

    println!("\nListing crawl:");
    println!("  Seed URL: {}", config.listing.seed_url);
    println!("  Default limit: {}", config.listing.default_limit);

    println!("\nStore:");
    println!("  Backend: {:?}", config.store.backend);
    println!("  Path: {}", config.store.path);

    println!("\nNotify:");
    match &config.notify.recipient {
        Some(recipient) => println!("  Recipient: {}", recipient),
        None => println!("  Recipient: none"),
    }
    println!("  Sender: {}", config.notify.sender);
    match (&config.notify.transport, &config.notify.smtp) {
        (NotifyTransport::Smtp, Some(smtp)) => println!(
            "  Transport: SMTP via {}{} (credentials from {} / {})",
            smtp.host,
            smtp.port.map(|port| format!(":{}", port)).unwrap_or_default(),
            smtp.username_env,
            smtp.password_env
        ),
        _ => println!("  Transport: outbox {}", config.notify.outbox_dir),
    }

    println!("\nSchedule:");
    if config.schedule.enabled {
        println!("  Every {}s", config.schedule.interval_secs);
    } else {
        println!("  Disabled");
    }

    println!("\n✓ Configuration is valid");
}

fn print_json(result: &CrawlResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize results")?;
    println!("{}", json);
    Ok(())
}
