use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::portfolio::api::{PortfolioApi, ITEMS_PATH};
use crate::retrieve::backoff::RetryPolicy;
use crate::retrieve::error::FetchError;
use crate::retrieve::ky_http::{ApiClient, DEFAULT_TIMEOUT};

/// Base URL of the portfolio API. Required.
pub const ENV_BASE_URL: &str = "PORTFOLIO_API_BASE_URL";
/// Collection path relative to the base URL.
pub const ENV_ITEMS_PATH: &str = "PORTFOLIO_API_ITEMS_PATH";
/// Per-attempt timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "PORTFOLIO_API_TIMEOUT_SECS";
/// Retries after the first failed attempt.
pub const ENV_MAX_RETRIES: &str = "PORTFOLIO_API_MAX_RETRIES";
/// Delay before the first retry, in milliseconds.
pub const ENV_BASE_DELAY_MS: &str = "PORTFOLIO_API_BASE_DELAY_MS";
/// Backoff growth factor.
pub const ENV_BACKOFF_MULTIPLIER: &str = "PORTFOLIO_API_BACKOFF_MULTIPLIER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Environment variable {0} is not present")]
    MissingEnvVar(String),

    #[error("Environment variable {name} has invalid value {value:?}: {reason}")]
    InvalidEnvVar {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid base URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(FetchError),
}

/// Loads `.env`, then the platform file (`.env.windows` or `.env.linux`).
/// Missing files are ignored; variables already set are kept.
pub fn load_dotenv() {
    let dotenv_os: &str = if cfg!(target_os = "windows") {
        ".env.windows"
    } else {
        ".env.linux"
    };
    dotenvy::dotenv().ok();
    dotenvy::from_filename(dotenv_os).ok();
}

fn default_items_path() -> String {
    ITEMS_PATH.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioConfig {
    pub base_url: String,
    #[serde(default = "default_items_path")]
    pub items_path: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl PortfolioConfig {
    /// Defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            items_path: default_items_path(),
            timeout_secs: default_timeout_secs(),
            retry: RetryPolicy::default(),
        }
    }

    /// Reads the `PORTFOLIO_API_*` variables after loading `.env` files.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`PortfolioConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url =
            lookup(ENV_BASE_URL).ok_or_else(|| ConfigError::MissingEnvVar(ENV_BASE_URL.to_string()))?;
        let mut config = Self::new(base_url);

        if let Some(path) = lookup(ENV_ITEMS_PATH) {
            config.items_path = path;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = parse_var(ENV_TIMEOUT_SECS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_RETRIES) {
            config.retry.max_retries = parse_var(ENV_MAX_RETRIES, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BASE_DELAY_MS) {
            config.retry.base_delay_ms = parse_var(ENV_BASE_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BACKOFF_MULTIPLIER) {
            config.retry.multiplier = parse_var(ENV_BACKOFF_MULTIPLIER, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reads a camelCase JSON document, e.g.
    /// `{"baseUrl": "https://api.example.com", "retry": {"maxRetries": 5}}`.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the base URL is absolute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url)
            .map(|_| ())
            .map_err(|source| ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                source,
            })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the HTTP client this configuration describes.
    pub fn client(&self) -> Result<ApiClient, ConfigError> {
        ApiClient::new(&self.base_url, self.timeout(), self.retry).map_err(|err| match err {
            FetchError::InvalidUrl(source) => ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                source,
            },
            other => ConfigError::Client(other),
        })
    }

    /// Builds the portfolio service this configuration describes.
    pub fn api(&self) -> Result<PortfolioApi, ConfigError> {
        Ok(PortfolioApi::with_items_path(
            self.client()?,
            self.items_path.clone(),
        ))
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar {
        name: name.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
