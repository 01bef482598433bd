//! # Portfolio Module
//!
//! Everything above the transport layer: the item model, the schema
//! validation that guards it, the API service combining fetch and
//! validation, and the feed adapter that exposes the result to consumers.

/// Fetch-and-validate service and the `PortfolioSource` seam.
pub mod api;
/// State adapter driving the service on mount and on retry.
pub mod feed;
/// Validated record types and known categories.
pub mod model;
/// Schema validation of untrusted JSON.
pub mod validate;

pub use api::{PortfolioApi, PortfolioSource, HEALTH_PATH, ITEMS_PATH};
pub use feed::{FeedState, PortfolioFeed};
pub use model::{
    is_valid_category, NewPortfolioItem, PortfolioCategory, PortfolioItem, UnknownCategory,
    PORTFOLIO_CATEGORIES,
};
pub use validate::{validate_new_portfolio_item, validate_portfolio_item, validate_portfolio_items};
