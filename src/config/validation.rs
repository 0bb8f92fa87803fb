use crate::config::types::{Config, CredentialsConfig, ScraperConfig, UserAgentConfig};
use crate::ConfigError;

/// Upper bound on protocol-level redirects per fetch
const MAX_HTTP_REDIRECTS: usize = 30;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_credentials_config(&config.credentials)?;
    Ok(())
}

/// Validates resolution and transport settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    // A non-positive max_redirect is allowed: it means a single fetch, no redirects

    if config.max_http_redirects > MAX_HTTP_REDIRECTS {
        return Err(ConfigError::Validation(format!(
            "max_http_redirects must be <= {}, got {}",
            MAX_HTTP_REDIRECTS, config.max_http_redirects
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 || config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and timeout_secs ({}), got {}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    if !config
        .language
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ',' | ';' | '=' | '.' | '*' | ' '))
    {
        return Err(ConfigError::Validation(format!(
            "language is not a valid Accept-Language value: '{}'",
            config.language
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Name: non-empty, alphanumeric + hyphens only
    if config.name.is_empty() {
        return Err(ConfigError::Validation(
            "user agent name cannot be empty".to_string(),
        ));
    }

    if !config.name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "user agent name must contain only alphanumeric characters and hyphens, got '{}'",
            config.name
        )));
    }

    if let Some(version) = &config.version {
        if version.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ConfigError::Validation(format!(
                "user agent version cannot contain whitespace, got '{}'",
                version
            )));
        }
    }

    Ok(())
}

/// Validates credential materialization settings
fn validate_credentials_config(config: &CredentialsConfig) -> Result<(), ConfigError> {
    for name in config.token_cookies.iter().chain(&config.expiry_cookies) {
        validate_cookie_name(name)?;
    }

    for cookie in &config.static_cookies {
        let Some((name, value)) = cookie.split_once('=') else {
            return Err(ConfigError::Validation(format!(
                "static cookie must be of the form name=value, got '{}'",
                cookie
            )));
        };
        validate_cookie_name(name)?;
        if value.contains(';') {
            return Err(ConfigError::Validation(format!(
                "static cookie value cannot contain ';', got '{}'",
                cookie
            )));
        }
    }

    Ok(())
}

/// Validates a cookie name (RFC 6265 token)
fn validate_cookie_name(name: &str) -> Result<(), ConfigError> {
    let is_token = !name.is_empty()
        && name.chars().all(|c| {
            c.is_ascii_graphic() && !matches!(c, '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?' | '=' | '{' | '}')
        });

    if !is_token {
        return Err(ConfigError::Validation(format!(
            "invalid cookie name: '{}'",
            name
        )));
    }

    Ok(())
}
