use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::api_client::DEFAULT_API_PREFIX;
use crate::roster::controller::{
    RosterConfig, DEFAULT_PAGE_SIZE, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SEARCH_DEBOUNCE,
};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_token: String,
    /// Role-specific path prefix, e.g. `/api/hr`.
    pub api_prefix: String,
    pub page_size: u32,
    pub search_debounce_ms: u64,
    pub request_timeout_secs: u64,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Config {
            api_url: require_env(&lookup, "TALENTDESK_API_URL")?,
            api_token: require_env(&lookup, "TALENTDESK_API_TOKEN")?,
            api_prefix: lookup("TALENTDESK_API_PREFIX")
                .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string()),
            page_size: parse_or(&lookup, "TALENTDESK_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            search_debounce_ms: parse_or(
                &lookup,
                "TALENTDESK_SEARCH_DEBOUNCE_MS",
                DEFAULT_SEARCH_DEBOUNCE.as_millis() as u64,
            )?,
            request_timeout_secs: parse_or(
                &lookup,
                "TALENTDESK_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT.as_secs(),
            )?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        if config.page_size == 0 {
            bail!("TALENTDESK_PAGE_SIZE must be at least 1");
        }
        if config.request_timeout_secs == 0 {
            bail!("TALENTDESK_REQUEST_TIMEOUT_SECS must be at least 1");
        }
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn roster_config(&self) -> RosterConfig {
        RosterConfig {
            page_size: self.page_size,
            debounce: Duration::from_millis(self.search_debounce_ms),
            request_timeout: self.request_timeout(),
        }
    }
}

fn require_env<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number")),
        None => Ok(default),
    }
}
