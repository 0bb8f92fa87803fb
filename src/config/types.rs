use serde::Deserialize;

/// Main configuration structure for Sumi-Lens
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scraper: ScraperConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub credentials: CredentialsConfig,
}

/// Resolution and transport behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Fetch budget for canonical and escaped-fragment redirects
    pub max_redirect: i32,

    /// Value sent as `Accept-Language`
    pub language: String,

    /// Protocol-level redirects followed by the HTTP client per fetch
    pub max_http_redirects: usize,

    /// Whole-request timeout (seconds)
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    pub connect_timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            max_redirect: 3,
            language: "en".to_string(),
            max_http_redirects: 10,
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Product name sent in the `User-Agent` header
    pub name: String,

    /// Product version, appended as `name/version` when present
    pub version: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            name: "SumiLens".to_string(),
            version: Some("1.0".to_string()),
        }
    }
}

impl UserAgentConfig {
    /// Renders the `User-Agent` header value
    pub fn header_value(&self) -> String {
        match &self.version {
            Some(version) if !version.is_empty() => format!("{}/{}", self.name, version),
            _ => self.name.clone(),
        }
    }
}

/// How an authorization credential is turned into request headers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CredentialStrategy {
    /// Credentials are ignored
    None,
    /// Credential is stripped of its scheme prefix and replayed as session cookies
    SessionCookie,
    /// Credential is forwarded verbatim as the `Authorization` header
    AuthorizationHeader,
}

/// Credential materialization settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CredentialsConfig {
    pub strategy: CredentialStrategy,

    /// Length of the scheme prefix stripped from the credential (`"Bearer "`)
    pub prefix_length: usize,

    /// Cookies that receive the stripped token
    pub token_cookies: Vec<String>,

    /// Cookies that receive `expires_at`
    pub expiry_cookies: Vec<String>,

    /// Expiry timestamp (milliseconds since the epoch)
    pub expires_at: u64,

    /// Literal `name=value` cookies sent alongside the token
    pub static_cookies: Vec<String>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            strategy: CredentialStrategy::SessionCookie,
            prefix_length: 7,
            token_cookies: vec![
                "access_token".to_string(),
                "refresh_token".to_string(),
                "main_access_token".to_string(),
                "main_refresh_token".to_string(),
            ],
            expiry_cookies: vec!["expires_at".to_string(), "main_expires_at".to_string()],
            expires_at: 1_947_832_244_556,
            static_cookies: vec!["brainer_v4=true".to_string()],
        }
    }
}
