//! Sumi-Lens main entry point
//!
//! This is the command-line interface for the Sumi-Lens link preview resolver.

use clap::Parser;
use std::path::PathBuf;
use sumi_lens::config::{load_config_with_hash, Config};
use sumi_lens::output::{render, OutputFormat};
use sumi_lens::Scraper;
use tracing_subscriber::EnvFilter;

/// Sumi-Lens: link preview resolver
///
/// Fetches a page and prints its preview: title, description, images,
/// canonical link, site name and icon. Canonical links and AJAX escaped
/// fragments are followed within the redirect budget.
#[derive(Parser, Debug)]
#[command(name = "sumi-lens")]
#[command(version = "1.0.0")]
#[command(about = "A link preview resolver", long_about = None)]
struct Cli {
    /// URL to resolve
    #[arg(value_name = "URL")]
    url: String,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fetch budget for canonical and escaped-fragment redirects
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    max_redirect: Option<i32>,

    /// Accept-Language value sent with every request
    #[arg(long, value_name = "LANG")]
    language: Option<String>,

    /// Authorization credential (e.g. "Bearer <token>")
    #[arg(long, value_name = "CREDENTIAL")]
    authorization: Option<String>,

    /// Print the preview as JSON
    #[arg(long)]
    json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

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
        None => Config::default(),
    };

    let max_redirect = cli.max_redirect.unwrap_or(config.scraper.max_redirect);
    let language = cli
        .language
        .clone()
        .unwrap_or_else(|| config.scraper.language.clone());
    let authorization = cli.authorization.clone().unwrap_or_default();

    let scraper = Scraper::new(&config)?;
    let document = match scraper
        .scrape(&cli.url, max_redirect, &language, &authorization)
        .await
    {
        Ok(document) => document,
        Err(e) => {
            tracing::error!("Failed to resolve {}: {}", cli.url, e);
            return Err(e.into());
        }
    };

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    print!("{}", render(&document.preview, format)?);
    if cli.json {
        println!();
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
            0 => EnvFilter::new("sumi_lens=warn,warn"),
            1 => EnvFilter::new("sumi_lens=info,warn"),
            2 => EnvFilter::new("sumi_lens=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
