//! # lib_portfolio
//!
//! Fetches a portfolio collection from a remote JSON endpoint, retrying
//! transient failures with exponential backoff, and validates the untrusted
//! body into strict [`PortfolioItem`] records before anything downstream sees
//! it. Modules are gated by folder-level features; `full` (the default)
//! enables all of them.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms, unused_qualifications)]

// Declare the modules to re-export
#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "portfolio")]
pub mod portfolio;
#[cfg(feature = "retrieve")]
pub mod retrieve;

// Re-export the everyday surface
#[cfg(feature = "configs")]
pub use configs::{ConfigError, PortfolioConfig};
#[cfg(feature = "loggers")]
pub use loggers::{init_logging, LoggingError, LoggingOptions};
#[cfg(feature = "portfolio")]
pub use portfolio::{
    is_valid_category, validate_new_portfolio_item, validate_portfolio_item,
    validate_portfolio_items, FeedState, NewPortfolioItem, PortfolioApi, PortfolioCategory,
    PortfolioFeed, PortfolioItem, PortfolioSource, ITEMS_PATH, PORTFOLIO_CATEGORIES,
};
#[cfg(feature = "retrieve")]
pub use retrieve::{ApiClient, FetchError, RequestOptions, RetryPolicy, ValidationError, Violation};
