//! # Configuration Modules
//!
//! Endpoint configuration for the portfolio pipeline. Nothing in the library
//! reads a global base URL; callers build a `PortfolioConfig` (from the
//! environment, a JSON file, or by hand) and inject it.

/// Portfolio API endpoint, timeout and retry settings.
pub mod config_portfolio;

pub use config_portfolio::{load_dotenv, ConfigError, PortfolioConfig};
