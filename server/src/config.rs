//! Configuration management for the server.

use std::env;
use std::time::Duration;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Base URL of the access-control REST backend
    pub upstream_url: String,
    /// Bearer token used when a session has none of its own
    pub upstream_token: Option<String>,
    /// Timeout for each upstream request
    pub upstream_timeout: Duration,
    /// Page size for newly opened lists
    pub default_page_size: usize,
    /// Reject requests without a bearer token
    pub require_auth: bool,
    /// Sessions unused for this long are dropped
    pub session_idle: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let upstream_url = lookup("UPSTREAM_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingUpstreamUrl)?
            .trim_end_matches('/')
            .to_string();

        let upstream_token = lookup("UPSTREAM_TOKEN").filter(|t| !t.is_empty());

        let timeout_secs: u64 = lookup("UPSTREAM_TIMEOUT_SECS")
            .unwrap_or_else(|| "15".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidTimeout)?;

        let default_page_size: usize = lookup("DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|| console_engine::DEFAULT_ITEMS_PER_PAGE.to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPageSize)?;
        if default_page_size == 0 {
            return Err(ConfigError::InvalidPageSize);
        }

        let idle_secs: u64 = lookup("SESSION_IDLE_SECS")
            .unwrap_or_else(|| "1800".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidSessionIdle)?;
        if idle_secs == 0 {
            return Err(ConfigError::InvalidSessionIdle);
        }

        let require_auth = matches!(
            lookup("REQUIRE_AUTH").as_deref(),
            Some("1") | Some("true") | Some("yes")
        );

        Ok(Self {
            host,
            port,
            upstream_url,
            upstream_token,
            upstream_timeout: Duration::from_secs(timeout_secs),
            default_page_size,
            require_auth,
            session_idle: Duration::from_secs(idle_secs),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("UPSTREAM_URL environment variable is required")]
    MissingUpstreamUrl,

    #[error("Invalid PORT value")]
    InvalidPort,

    #[error("Invalid UPSTREAM_TIMEOUT_SECS value")]
    InvalidTimeout,

    #[error("DEFAULT_PAGE_SIZE must be a positive integer")]
    InvalidPageSize,

    #[error("SESSION_IDLE_SECS must be a positive integer")]
    InvalidSessionIdle,
}
