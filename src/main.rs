//! site-mapper main entry point
//!
//! This is the command-line interface for the site-mapper crawler.

use anyhow::{Context, Result};
use clap::Parser;
use site_mapper::config::{load_config_with_hash, validate, Config};
use site_mapper::crawler::Coordinator;
use site_mapper::output::{
    export_targets, print_site_tree, print_statistics, publish_site_map, CrawlStatistics,
};
use site_mapper::state::DroppedLink;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// site-mapper: a concurrent same-host site crawler
///
/// Crawls a website breadth-first from a seed URL, following links on the
/// seed's host up to a depth limit, and prints the resulting site tree.
/// The tree can also be exported as JSON and XML.
#[derive(Parser, Debug)]
#[command(name = "site-mapper")]
#[command(version)]
#[command(about = "A concurrent same-host site mapper", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum link depth from the seed
    #[arg(long, visible_alias = "max_depth", value_name = "N")]
    max_depth: Option<u32>,

    /// Write the site map as JSON to this file
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Write the site map as XML to this file
    #[arg(long, value_name = "PATH")]
    xml: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Maximum same-host links followed per page
    #[arg(long, value_name = "N")]
    max_links: Option<usize>,

    /// Order children by URL instead of fetch-completion order
    #[arg(long)]
    sorted: bool,

    /// Path to TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    /// Applies command-line overrides on top of the file configuration
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(depth) = self.max_depth {
            config.crawler.max_depth = depth;
        }
        if let Some(workers) = self.workers {
            config.crawler.workers = workers;
        }
        if let Some(timeout) = self.timeout {
            config.crawler.request_timeout_secs = timeout;
        }
        if let Some(max_links) = self.max_links {
            config.crawler.max_links_per_page = max_links;
        }
        if let Some(path) = &self.json {
            config.output.json_path = Some(path.clone());
        }
        if let Some(path) = &self.xml {
            config.output.xml_path = Some(path.clone());
        }
        if self.sorted {
            config.output.sort_children = true;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };
    cli.apply_overrides(&mut config);
    validate(&config).context("invalid configuration")?;

    handle_crawl(&cli.url, config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mapper=info,warn"),
            1 => EnvFilter::new("site_mapper=debug,info"),
            2 => EnvFilter::new("site_mapper=trace,debug"),
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

/// Cancels the returned token on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            trigger.cancel();
        }
    });
    token
}

/// Handles the main crawl operation
async fn handle_crawl(seed: &str, config: Config) -> Result<()> {
    let output = config.output.clone();

    let coordinator = Coordinator::new(seed, config)
        .context("cannot start crawl")?
        .with_dropped_link_callback(Arc::new(|link: &DroppedLink| {
            tracing::debug!("Dropped {} (depth {}): {}", link.url, link.depth, link.reason);
        }));

    let outcome = match coordinator.run_with_cancellation(cancel_on_ctrl_c()).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e).context("no site map produced");
        }
    };

    if outcome.cancelled && outcome.store.is_empty() {
        println!("Crawl cancelled before the seed page was recorded.");
        print_statistics(&CrawlStatistics::from_outcome(&outcome));
        return Ok(());
    }

    let tree = publish_site_map(&outcome, &output).context("failed to publish the site map")?;

    print_site_tree(&tree);
    println!();
    print_statistics(&CrawlStatistics::from_outcome(&outcome));

    for (format, path) in export_targets(&output) {
        println!("✓ {} site map written to: {}", format, path.display());
    }

    Ok(())
}
