//! # Retrieval Error Taxonomy
//!
//! Every failure the fetch-and-validate pipeline can produce is normalized into
//! [`FetchError`]. The enum separates *classified* failures (the network or the
//! server let us down) from payload problems (the server answered, but with
//! something we cannot accept), so callers can branch on
//! [`FetchError::is_classified`] instead of matching on message text.

use std::fmt;

use thiserror::Error;

/// A single schema violation found while validating an untrusted payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Location of the offending value, e.g. `[2].githubUrl` or `data`.
    pub path: String,
    /// Human-readable description of the constraint that failed.
    pub constraint: String,
}

impl Violation {
    /// Creates a violation for `path` failing `constraint`.
    pub fn new(path: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            constraint: constraint.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.constraint)
        } else {
            write!(f, "{}: {}", self.path, self.constraint)
        }
    }
}

/// The payload did not match the expected schema.
///
/// Holds every violation found, items in array order and fields in schema
/// order. `Display` reports the first one, which is what gets surfaced to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl ValidationError {
    /// Builds an error from a non-empty list of violations.
    pub fn new(violations: Vec<Violation>) -> Self {
        Self { violations }
    }

    /// Shorthand for an error holding exactly one violation.
    pub fn single(path: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::new(vec![Violation::new(path, constraint)])
    }

    /// The first violation, if any.
    pub fn first(&self) -> Option<&Violation> {
        self.violations.first()
    }

    /// All violations, items in array order, fields in schema order.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.violations.first() {
            Some(first) if self.violations.len() > 1 => write!(
                f,
                "{} (and {} more violation(s))",
                first,
                self.violations.len() - 1
            ),
            Some(first) => write!(f, "{}", first),
            None => write!(f, "payload rejected"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failure of a fetch-and-validate cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Classified transport failure: a non-2xx status or a network error that
    /// survived every retry attempt.
    #[error("{message}")]
    Api {
        /// Human-readable summary, including the attempt count.
        message: String,
        /// HTTP status of the last attempt, when the server answered.
        status: Option<u16>,
        /// Lower-level network error of the last attempt, when there was one.
        #[source]
        source: Option<reqwest::Error>,
    },

    /// The response body was received but is not valid JSON.
    #[error("Failed to decode response body as JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The JSON body does not match the portfolio schema.
    #[error("Invalid data format: {0}")]
    Validation(#[from] ValidationError),

    /// The configured base URL and the requested path do not form a valid URL.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    /// `true` when the failure is attributed to the network or the server's
    /// HTTP status, `false` for payload and configuration problems.
    pub fn is_classified(&self) -> bool {
        matches!(self, FetchError::Api { .. })
    }

    /// HTTP status code carried by a classified failure, if known.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Api { status, .. } => *status,
            _ => None,
        }
    }
}
