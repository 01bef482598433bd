//! # Data Retrieval Module
//!
//! This module provides the transport half of the portfolio pipeline: a JSON
//! HTTP client with bounded exponential backoff, and the error taxonomy every
//! layer above it reports through.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: `ApiClient`, a `reqwest` wrapper bound to an injected base
//!   URL. GETs are retried on network failures and non-2xx statuses.
//! - **`backoff`**: `RetryPolicy` and the generic `retry_with_backoff` loop.
//! - **`error`**: `FetchError`, `ValidationError` and `Violation`.
//!
//! Callers above this layer deal only with decoded JSON and typed errors; the
//! retry schedule, header defaults and timeouts stay in here.

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

/// Retry policy and the backoff loop.
pub mod backoff;
/// Error taxonomy shared by transport and validation.
pub mod error;
/// Generic HTTP JSON client with retries for resilient network requests.
pub mod ky_http;

pub use backoff::{retry_with_backoff, RetryPolicy};
pub use error::{FetchError, ValidationError, Violation};
pub use ky_http::{ApiClient, RequestOptions, DEFAULT_TIMEOUT};
