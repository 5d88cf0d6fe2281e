//! siteprint CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use siteprint::{
    error::Result,
    models::Config,
    pipeline,
    services::{ClusterAnalyzer, HeuristicAnalyzer, HttpRenderer, NoopAnalyzer},
    storage::{BlueprintStorage, LocalStorage},
};
use tokio::sync::watch;
use url::Url;

/// siteprint - Website Template Blueprint Generator
#[derive(Parser, Debug)]
#[command(
    name = "siteprint",
    version,
    about = "Crawls a website and clusters pages by structural template"
)]
struct Cli {
    /// Path to storage directory containing config and outputs
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a site and write its blueprint
    Crawl {
        /// Seed URL to start from
        url: String,

        /// Override the configured page budget
        #[arg(long)]
        max_pages: Option<usize>,

        /// Override the configured depth limit
        #[arg(long)]
        max_depth: Option<usize>,

        /// Classify page types with the offline analyzer
        #[arg(long)]
        analyze: bool,
    },

    /// Validate configuration files
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);

    match cli.command {
        Command::Crawl {
            url,
            max_pages,
            max_depth,
            analyze,
        } => {
            let url = if url.starts_with("http://") || url.starts_with("https://") {
                url
            } else {
                format!("https://{url}")
            };
            let seed = Url::parse(&url)?;

            if let Some(pages) = max_pages {
                config.crawler.max_pages = pages;
            }
            if let Some(depth) = max_depth {
                config.crawler.max_depth = depth;
            }
            if analyze {
                config.analyzer.enabled = true;
            }

            let config = Arc::new(config);
            let renderer = Arc::new(HttpRenderer::new(&config.crawler)?);
            let analyzer: Arc<dyn ClusterAnalyzer> = if config.analyzer.enabled {
                Arc::new(HeuristicAnalyzer)
            } else {
                Arc::new(NoopAnalyzer)
            };

            // Ctrl-C cancels the run; the partial blueprint is still written
            let (cancel_tx, cancel_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("interrupt received, finishing with partial results...");
                    let _ = cancel_tx.send(true);
                }
            });

            let blueprint =
                pipeline::run_crawl(Arc::clone(&config), seed, renderer, analyzer, cancel_rx)
                    .await?;

            log::info!(
                "{} pages crawled, {} unique templates, ~{} analysis tokens saved",
                blueprint.total_pages_crawled,
                blueprint.unique_clusters_found,
                blueprint.total_tokens_saved
            );

            let storage = LocalStorage::new(&cli.storage_dir);
            let location = storage.write_blueprint(&blueprint).await?;
            log::info!("Blueprint saved to {location}");
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!("✓ Config OK");
        }
    }

    Ok(())
}
