//! Sumi-Lens: link preview resolution
//!
//! This crate resolves a URI into link preview metadata (title, description,
//! images, canonical link, site name and icon). It fetches the document,
//! decodes it to UTF-8 and scans its tokens for Open Graph tags and the usual
//! HTML fallbacks, following canonical links and AJAX escaped fragments
//! within a bounded redirect budget.
//!
//! # Example
//!
//! ```no_run
//! # async fn example() -> sumi_lens::Result<()> {
//! let document = sumi_lens::scrape("https://example.com/", 3, "en", "").await?;
//! println!("{}", document.preview.title);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod output;
pub mod preview;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Lens operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Charset error for {url}: {source}")]
    Charset { url: String, source: CharsetError },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL '{url}': {source}")]
    Parse {
        url: String,
        source: ::url::ParseError,
    },

    #[error("Invalid escape sequence in URL: {0}")]
    InvalidEscape(String),

    #[error("URL is not valid UTF-8 after unescaping")]
    InvalidUtf8,

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Body decoding errors
#[derive(Debug, Error)]
pub enum CharsetError {
    #[error("Failed to read response body: {0}")]
    Read(#[from] reqwest::Error),

    #[error("Unsupported character encoding: {0}")]
    Unsupported(String),
}

/// Result type alias for Sumi-Lens operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use preview::{scrape, Document, PreviewRecord, Scraper};
pub use state::{Phase, ResolutionState};
