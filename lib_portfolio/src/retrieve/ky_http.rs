//! # HTTP Retrieval Utilities
//!
//! This module provides a resilient, asynchronous JSON client wrapper around `reqwest`.
//! Every GET is retried with exponential backoff on network failures and non-2xx
//! statuses, and every failure mode is normalized into [`FetchError`].

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tracing::{debug, error};

use super::backoff::{retry_with_backoff, RetryPolicy};
use super::error::FetchError;

/// Per-attempt timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Per-call overrides for a request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Extra headers. They extend the client's defaults; a header with the same
    /// name as a default replaces it.
    pub headers: HeaderMap,
    /// Per-attempt timeout for this call only.
    pub timeout: Option<Duration>,
}

/// Why a single attempt failed. Both kinds are transient and retried.
#[derive(Debug)]
enum AttemptFailure {
    /// Connection refused, timeout, body read failure and the like.
    Network(reqwest::Error),
    /// The server answered with a non-2xx status.
    Status(StatusCode),
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Network(e) => write!(f, "network error: {}", e),
            AttemptFailure::Status(s) => write!(f, "HTTP status {}", s),
        }
    }
}

/// A JSON-over-HTTP client bound to one base URL.
///
/// The base URL is injected, never global, so the same client type serves
/// production and a local mock server alike.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// The underlying HTTP client.
    inner: reqwest::Client,
    /// The base URL to which all relative paths are joined. Always ends in `/`.
    base_url: Url,
    /// Headers sent with every request unless a caller overrides them by name.
    default_headers: HeaderMap,
    /// Per-attempt timeout.
    timeout: Duration,
    /// Retry schedule for `get_json`.
    retry_policy: RetryPolicy,
}

impl ApiClient {
    /// Creates a new `ApiClient` for `base_url`.
    ///
    /// # Arguments
    /// * `base_url` - Absolute base URL (e.g. "https://api.example.com/v1").
    ///   A trailing slash is added if missing so that paths append instead of
    ///   replacing the last segment.
    /// * `timeout` - Per-attempt timeout; a timed-out attempt is retried.
    /// * `retry_policy` - Backoff schedule applied by [`ApiClient::get_json`].
    ///
    /// # Errors
    /// Returns [`FetchError::InvalidUrl`] if `base_url` is not an absolute URL.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        retry_policy: RetryPolicy,
    ) -> Result<Self, FetchError> {
        let mut url = Url::parse(base_url)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(Self {
            inner: reqwest::Client::new(),
            base_url: url,
            default_headers,
            timeout,
            retry_policy,
        })
    }

    /// The normalized base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The retry schedule used by `get_json`.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Resolves `path` against the base URL. A leading `/` is ignored so that
    /// base URLs carrying a path prefix keep it.
    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Default headers merged with the caller's. Caller values win only for
    /// names they set; multi-valued caller headers are kept whole.
    fn merged_headers(&self, extra: &HeaderMap) -> HeaderMap {
        let mut merged = self.default_headers.clone();
        for name in extra.keys() {
            merged.remove(name);
        }
        for (name, value) in extra.iter() {
            merged.append(name.clone(), value.clone());
        }
        merged
    }

    /// One GET attempt. Returns the body text of a 2xx response.
    async fn attempt(
        &self,
        url: &Url,
        headers: &HeaderMap,
        timeout: Duration,
    ) -> Result<String, AttemptFailure> {
        let response = self
            .inner
            .get(url.clone())
            .headers(headers.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(AttemptFailure::Network)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptFailure::Status(status));
        }

        response.text().await.map_err(AttemptFailure::Network)
    }

    /// Performs a GET against `path` and decodes the body as untyped JSON.
    ///
    /// Network failures and non-2xx statuses are retried according to the
    /// client's [`RetryPolicy`]. The body is only decoded once an attempt
    /// succeeds; a decode failure is not retried.
    ///
    /// # Errors
    /// * [`FetchError::Api`] once every attempt has failed (classified).
    /// * [`FetchError::Decode`] if the body is not JSON.
    /// * [`FetchError::InvalidUrl`] if `path` cannot be joined to the base URL.
    pub async fn get_json(
        &self,
        path: &str,
        options: Option<RequestOptions>,
    ) -> Result<Value, FetchError> {
        let url = self.endpoint(path)?;
        let options = options.unwrap_or_default();
        let headers = self.merged_headers(&options.headers);
        let timeout = options.timeout.unwrap_or(self.timeout);
        let max_attempts = self.retry_policy.max_attempts();
        let operation = format!("GET {}", url);

        let outcome = retry_with_backoff(&self.retry_policy, &operation, |_| {
            self.attempt(&url, &headers, timeout)
        })
        .await;

        let body = match outcome {
            Ok(body) => body,
            Err(failure) => {
                let err = exhausted(&url, max_attempts, failure);
                error!("{}", err);
                return Err(err);
            }
        };

        let value = serde_json::from_str::<Value>(&body)?;
        debug!("GET {} succeeded ({} bytes)", url, body.len());
        Ok(value)
    }

    /// Single unretried GET against `path`; `true` iff the server answers 2xx.
    pub async fn probe(&self, path: &str) -> bool {
        let url = match self.endpoint(path) {
            Ok(url) => url,
            Err(e) => {
                debug!("Probe skipped, invalid path {:?}: {}", path, e);
                return false;
            }
        };

        match self.attempt(&url, &self.default_headers, self.timeout).await {
            Ok(_) => true,
            Err(failure) => {
                debug!("Probe of {} failed: {}", url, failure);
                false
            }
        }
    }
}

/// Turns the last attempt's failure into the classified error.
fn exhausted(url: &Url, attempts: u32, failure: AttemptFailure) -> FetchError {
    match failure {
        AttemptFailure::Status(status) => FetchError::Api {
            message: format!(
                "HTTP {} from {} after {} attempt(s)",
                status, url, attempts
            ),
            status: Some(status.as_u16()),
            source: None,
        },
        AttemptFailure::Network(e) => FetchError::Api {
            message: format!(
                "Network request to {} failed after {} attempt(s): {}",
                url, attempts, e
            ),
            status: e.status().map(|s| s.as_u16()),
            source: Some(e),
        },
    }
}
