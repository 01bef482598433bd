//! # Portfolio API Client
//!
//! The fetch-and-validate cycle: transport completes (success or exhausted
//! retries) before the body is handed to the validation layer, and the two
//! layers' failures come back as one [`FetchError`].

use std::future::Future;

use tracing::{debug, info};

use super::model::PortfolioItem;
use super::validate::validate_portfolio_items;
use crate::retrieve::error::FetchError;
use crate::retrieve::ky_http::{ApiClient, RequestOptions};

/// Path of the collection endpoint, relative to the base URL.
pub const ITEMS_PATH: &str = "items";
/// Path of the health endpoint, relative to the base URL.
pub const HEALTH_PATH: &str = "health";

/// Anything that can produce a validated batch of portfolio items.
///
/// [`PortfolioApi`] is the production implementation; the feed adapter is
/// written against this trait so tests can script outcomes.
pub trait PortfolioSource: Send + Sync + 'static {
    /// Runs one complete fetch-and-validate cycle.
    fn load(&self) -> impl Future<Output = Result<Vec<PortfolioItem>, FetchError>> + Send;
}

/// # Portfolio API
///
/// Fetches the item collection from a configured endpoint and validates it.
#[derive(Debug, Clone)]
pub struct PortfolioApi {
    /// HTTP client bound to the API base URL.
    client: ApiClient,
    /// Collection path, `items` unless configured otherwise.
    items_path: String,
}

impl PortfolioApi {
    /// Wraps an already-configured client, using the default `items` path.
    pub fn new(client: ApiClient) -> Self {
        Self::with_items_path(client, ITEMS_PATH)
    }

    /// Wraps a client, fetching the collection from `items_path`.
    pub fn with_items_path(client: ApiClient, items_path: impl Into<String>) -> Self {
        Self {
            client,
            items_path: items_path.into(),
        }
    }

    /// The underlying HTTP client.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// # Fetch Portfolio Items
    ///
    /// 1.  GETs the collection with retries (see [`ApiClient::get_json`]).
    /// 2.  Validates the decoded body as a whole batch.
    ///
    /// # Errors
    /// Classified [`FetchError::Api`] for network and status failures;
    /// [`FetchError::Validation`] and [`FetchError::Decode`] otherwise.
    pub async fn fetch_portfolio_items(
        &self,
        options: Option<RequestOptions>,
    ) -> Result<Vec<PortfolioItem>, FetchError> {
        let raw = self.client.get_json(&self.items_path, options).await?;
        let items = validate_portfolio_items(&raw)?;
        info!("Loaded {} portfolio item(s)", items.len());
        Ok(items)
    }

    /// `true` if the health endpoint answers 2xx. Never errors, never retries.
    pub async fn check_api_health(&self) -> bool {
        let healthy = self.client.probe(HEALTH_PATH).await;
        debug!("API health check: {}", if healthy { "up" } else { "down" });
        healthy
    }
}

impl PortfolioSource for PortfolioApi {
    fn load(&self) -> impl Future<Output = Result<Vec<PortfolioItem>, FetchError>> + Send {
        self.fetch_portfolio_items(None)
    }
}
