//! Preview module for resolving link previews
//!
//! This module contains the core resolution logic, including:
//! - HTTP fetching with escaped-fragment handling
//! - Charset conversion and tokenization of the fetched body
//! - Scanning tokens for Open Graph and HTML preview metadata
//! - The bounded canonical/fragment redirect loop

pub mod charset;
mod controller;
pub mod credentials;
mod document;
mod fetcher;
pub mod scanner;
pub mod tokenizer;

pub use controller::ResolutionController;
pub use credentials::{materializer_for, CredentialMaterializer};
pub use document::{Document, PreviewRecord};
pub use fetcher::{build_http_client, fetch_document};
pub use scanner::{scan, ScanOutcome};

use crate::config::Config;
use crate::state::ResolutionState;
use crate::url::parse_url;
use crate::{ConfigError, ScrapeError, UrlError};
use reqwest::Client;
use std::sync::Arc;
use tracing::info;

/// Reusable entry point holding the HTTP client and credential handling
#[derive(Debug, Clone)]
pub struct Scraper {
    client: Client,
    credentials: Arc<dyn CredentialMaterializer>,
}

impl Scraper {
    /// Creates a scraper from configuration
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let client = build_http_client(config).map_err(ConfigError::Client)?;
        Ok(Self::with_client(client, materializer_for(&config.credentials)))
    }

    /// Creates a scraper around an existing client
    pub fn with_client(client: Client, credentials: Arc<dyn CredentialMaterializer>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Resolves the preview of `uri`
    ///
    /// # Arguments
    ///
    /// * `uri` - Absolute URL to resolve
    /// * `max_redirect` - Fetch budget; values of 1 or less mean a single
    ///   fetch with no canonical or fragment redirects
    /// * `language` - `Accept-Language` value; empty means `"en"`
    /// * `authorization` - Opaque credential; empty means none
    pub async fn scrape(
        &self,
        uri: &str,
        max_redirect: i32,
        language: &str,
        authorization: &str,
    ) -> Result<Document, ScrapeError> {
        let target = parse_url(uri)?;
        if target.host_str().is_none() {
            return Err(UrlError::MissingHost(uri.to_string()).into());
        }

        info!(url = %target, max_redirect, "Resolving preview");
        let state = ResolutionState::new(target, max_redirect, language, authorization);
        self.controller(state).run().await
    }

    /// Creates a controller for a prepared state
    pub fn controller(&self, state: ResolutionState) -> ResolutionController<'_> {
        ResolutionController::new(self, state)
    }
}

/// Resolves the preview of `uri` with the default configuration
///
/// # Example
///
/// ```no_run
/// # async fn example() -> sumi_lens::Result<()> {
/// let document = sumi_lens::scrape("https://example.com/#!/home", 3, "fr", "").await?;
/// for image in &document.preview.images {
///     println!("{}", image);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn scrape(
    uri: &str,
    max_redirect: i32,
    language: &str,
    authorization: &str,
) -> Result<Document, ScrapeError> {
    Scraper::new(&Config::default())?
        .scrape(uri, max_redirect, language, authorization)
        .await
}
