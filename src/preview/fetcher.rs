//! HTTP fetcher implementation
//!
//! This module handles the HTTP side of a resolution:
//! - Building the HTTP client with the configured user agent and timeouts
//! - Choosing between the current URL and its escaped-fragment form
//! - Sending the language and credential headers
//! - Tracking the address that actually served the document
//! - Converting the body to UTF-8

use crate::config::Config;
use crate::preview::charset::convert_utf8;
use crate::preview::credentials::CredentialMaterializer;
use crate::preview::Document;
use crate::state::ResolutionState;
use crate::url::{has_escaped_fragment, has_hashbang, to_fragment_url};
use crate::{CharsetError, ScrapeError};
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use tracing::debug;

/// Builds an HTTP client with proper configuration
///
/// Protocol-level redirects are followed by the client itself, up to
/// `max-http-redirects`; a limit of zero returns 3xx responses as they are.
///
/// # Example
///
/// ```no_run
/// use sumi_lens::config::Config;
/// use sumi_lens::preview::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let redirect = match config.scraper.max_http_redirects {
        0 => Policy::none(),
        limit => Policy::limited(limit),
    };

    Client::builder()
        .user_agent(config.user_agent.header_value())
        .timeout(Duration::from_secs(config.scraper.timeout_secs))
        .connect_timeout(Duration::from_secs(config.scraper.connect_timeout_secs))
        .redirect(redirect)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches the document for the current state
///
/// # Request Flow
///
/// 1. Charge one attempt against the redirect budget
/// 2. Pick the request URL: the escaped-fragment override if set; else the
///    escaped form of a `#!` URL; else the URL itself, which becomes its
///    own override when it already carries `_escaped_fragment_=`
/// 3. GET with `Accept-Language` and any credential headers
/// 4. If the client ended on a different address, adopt it as the current
///    URL and drop the override
/// 5. Read the body and convert it to UTF-8
///
/// The HTTP status is not inspected: error pages are previewed like any
/// other document.
///
/// # Errors
///
/// * `ScrapeError::Url` - the escaped-fragment URL could not be built
/// * `ScrapeError::Transport` - the request could not be sent
/// * `ScrapeError::Charset` - the body could not be read or decoded
pub async fn fetch_document(
    client: &Client,
    credentials: &dyn CredentialMaterializer,
    state: &mut ResolutionState,
) -> Result<Document, ScrapeError> {
    state.charge_fetch();

    if state.escaped_fragment().is_none() {
        if has_hashbang(state.url()) {
            let escaped = to_fragment_url(state.url())?;
            state.set_escaped_fragment(escaped);
        } else if has_escaped_fragment(state.url()) {
            let own = state.url().clone();
            state.set_escaped_fragment(own);
        }
    }

    let request_url = state.request_url().clone();
    debug!(
        url = %request_url,
        budget = state.budget(),
        attempt = state.fetches(),
        "Fetching document"
    );

    let mut request = client
        .get(request_url.clone())
        .header(ACCEPT_LANGUAGE, state.accept_language());
    if let Some(credential) = state.authorization() {
        request = request.headers(credentials.materialize(credential));
    }

    let response = request
        .send()
        .await
        .map_err(|source| ScrapeError::Transport {
            url: request_url.to_string(),
            source,
        })?;

    if response.url() != &request_url {
        debug!(from = %request_url, to = %response.url(), "Request was redirected");
        state.adopt_effective_url(response.url().clone());
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let raw = response.bytes().await.map_err(|source| ScrapeError::Charset {
        url: state.url().to_string(),
        source: CharsetError::Read(source),
    })?;

    let body = convert_utf8(&raw, &content_type).map_err(|source| ScrapeError::Charset {
        url: state.url().to_string(),
        source,
    })?;

    debug!(
        url = %state.url(),
        content_type = %content_type,
        bytes = body.len(),
        "Fetched document"
    );

    Ok(Document::new(body, state.url().as_str()))
}
