//! Shiori-Reader main entry point
//!
//! Command-line interface: loads configuration, builds the long-lived
//! services (cache backend, browser engine, worker pool, orchestrator),
//! and serves the HTTP boundary.

use clap::Parser;
use shiori_reader::browser::{BrowserEngine, WorkerPool};
use shiori_reader::cache::build_cache;
use shiori_reader::config::{load_config_with_hash, Config};
use shiori_reader::crawl::Crawler;
use shiori_reader::server;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Shiori-Reader: a rendering web page reader
///
/// Fetches a URL through a pooled headless browser, extracts its readable
/// content, and serves it as markdown or a structured snapshot.
#[derive(Parser, Debug)]
#[command(name = "shiori-reader")]
#[command(version = "1.0.0")]
#[command(about = "A rendering web page reader", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((config, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    config
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

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Cache backend: misconfiguration is fatal here, never at first use
    let cache = build_cache(&config.cache)?;
    match &cache {
        Some(_) => tracing::info!("Cache enabled (provider: {:?})", config.cache.provider),
        None => tracing::info!("Cache disabled"),
    }

    // Rendering engine: launch failure is fatal to startup
    let engine = Arc::new(BrowserEngine::launch(config.browser.clone()).await?);

    let pool = Arc::new(WorkerPool::new(Arc::clone(&engine), &config.browser));
    if let Err(e) = pool.warm_up().await {
        tracing::warn!("Failed to warm up worker pool: {}", e);
    }

    let crawler = Arc::new(Crawler::new(pool, cache, &config));

    let app = server::router(crawler);
    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    tracing::info!("Server is running on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shiori_reader=info,warn"),
            1 => EnvFilter::new("shiori_reader=debug,info"),
            2 => EnvFilter::new("shiori_reader=trace,debug"),
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
