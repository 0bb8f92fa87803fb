//! Credential materialization
//!
//! Turns the opaque authorization credential handed to a scrape into the
//! request headers a deployment expects.

use crate::config::{CredentialStrategy, CredentialsConfig};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, COOKIE};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::warn;

/// Produces request headers for an authorization credential
pub trait CredentialMaterializer: Debug + Send + Sync {
    /// Returns the headers to add to every request made with `credential`
    fn materialize(&self, credential: &str) -> HeaderMap;
}

/// Ignores credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialMaterializer for NoCredentials {
    fn materialize(&self, _credential: &str) -> HeaderMap {
        HeaderMap::new()
    }
}

/// Forwards the credential verbatim as the `Authorization` header
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthorizationHeader;

impl CredentialMaterializer for AuthorizationHeader {
    fn materialize(&self, credential: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(credential) {
            Ok(value) => {
                headers.insert(AUTHORIZATION, value);
            }
            Err(_) => warn!("Authorization credential is not a valid header value; not sent"),
        }
        headers
    }
}

/// Replays a bearer-style credential as a set of session cookies
///
/// The scheme prefix (`"Bearer "` by default) is stripped and the remaining
/// token is written into every token cookie, followed by the static cookies
/// and the expiry cookies.
#[derive(Debug, Clone)]
pub struct SessionCookies {
    prefix_length: usize,
    token_cookies: Vec<String>,
    expiry_cookies: Vec<String>,
    expires_at: u64,
    static_cookies: Vec<String>,
}

impl SessionCookies {
    pub fn new(config: &CredentialsConfig) -> Self {
        Self {
            prefix_length: config.prefix_length,
            token_cookies: config.token_cookies.clone(),
            expiry_cookies: config.expiry_cookies.clone(),
            expires_at: config.expires_at,
            static_cookies: config.static_cookies.clone(),
        }
    }

    /// Builds the `Cookie` header value, or `None` if the credential is
    /// shorter than its prefix
    pub fn cookie_header(&self, credential: &str) -> Option<String> {
        let token = credential.get(self.prefix_length..)?;

        let pairs: Vec<String> = self
            .token_cookies
            .iter()
            .map(|name| format!("{}={}", name, token))
            .chain(self.static_cookies.iter().cloned())
            .chain(
                self.expiry_cookies
                    .iter()
                    .map(|name| format!("{}={}", name, self.expires_at)),
            )
            .collect();

        Some(pairs.join("; "))
    }
}

impl CredentialMaterializer for SessionCookies {
    fn materialize(&self, credential: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();

        let Some(cookie) = self.cookie_header(credential) else {
            warn!(
                prefix_length = self.prefix_length,
                "Authorization credential is shorter than its prefix; no cookies sent"
            );
            return headers;
        };

        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                headers.insert(COOKIE, value);
            }
            Err(_) => warn!("Session cookie is not a valid header value; not sent"),
        }
        headers
    }
}

/// Builds the materializer selected by the configuration
pub fn materializer_for(config: &CredentialsConfig) -> Arc<dyn CredentialMaterializer> {
    match config.strategy {
        CredentialStrategy::None => Arc::new(NoCredentials),
        CredentialStrategy::SessionCookie => Arc::new(SessionCookies::new(config)),
        CredentialStrategy::AuthorizationHeader => Arc::new(AuthorizationHeader),
    }
}
