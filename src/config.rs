//! Runtime configuration from `DIETDASH_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use crate::application::RetryPolicy;
use crate::domain::Role;
use crate::DashError;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Dashboard configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Backend base URL
    pub api_url: String,
    /// Role the dashboard serves
    pub role: Role,
    pub retry: RetryPolicy,
    /// Per-request timeout
    pub http_timeout: Duration,
    /// Directory for exported reports
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            role: Role::Patient,
            retry: RetryPolicy::default(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            export_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Load from the process environment.
    ///
    /// # Errors
    /// Returns `DashError::Config` naming the first invalid variable.
    pub fn from_env() -> Result<Self, DashError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset or blank keys keep their defaults.
    ///
    /// # Errors
    /// Returns `DashError::Config` naming the first invalid variable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DashError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(url) = get("DIETDASH_API_URL") {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid("DIETDASH_API_URL", &url, "expected an http(s) URL"));
            }
            config.api_url = url;
        }

        if let Some(role) = get("DIETDASH_ROLE") {
            config.role = role
                .parse()
                .map_err(|e: String| invalid("DIETDASH_ROLE", &role, &e))?;
        }

        if let Some(raw) = get("DIETDASH_FETCH_ATTEMPTS") {
            let attempts: u32 = parse("DIETDASH_FETCH_ATTEMPTS", &raw)?;
            if attempts == 0 {
                return Err(invalid("DIETDASH_FETCH_ATTEMPTS", &raw, "must be at least 1"));
            }
            config.retry.max_attempts = attempts;
        }

        if let Some(raw) = get("DIETDASH_RETRY_BASE_MS") {
            config.retry.base_delay = Duration::from_millis(parse("DIETDASH_RETRY_BASE_MS", &raw)?);
        }

        if let Some(raw) = get("DIETDASH_HTTP_TIMEOUT_SECS") {
            let secs: u64 = parse("DIETDASH_HTTP_TIMEOUT_SECS", &raw)?;
            if secs == 0 {
                return Err(invalid("DIETDASH_HTTP_TIMEOUT_SECS", &raw, "must be at least 1"));
            }
            config.http_timeout = Duration::from_secs(secs);
        }

        if let Some(dir) = get("DIETDASH_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }

        tracing::info!(
            "Config: api={} role={} attempts={} base_delay={}ms timeout={}s export_dir={}",
            config.api_url,
            config.role.as_str(),
            config.retry.max_attempts,
            config.retry.base_delay.as_millis(),
            config.http_timeout.as_secs(),
            config.export_dir.display()
        );
        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, DashError> {
    raw.parse()
        .map_err(|_| invalid(key, raw, "expected a non-negative integer"))
}

fn invalid(key: &str, value: &str, reason: &str) -> DashError {
    DashError::Config(format!("{key}={value:?}: {reason}"))
}
