//! # Exponential Backoff
//!
//! Bounded retry with exponentially growing, awaited delays. The delay before
//! retry *n* (1-indexed) is `base_delay_ms * multiplier^(n-1)`, so the default
//! policy waits 1s, 2s and 4s across its three retries.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::warn;

/// Retries after the first failed attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Delay before the first retry, in milliseconds.
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
/// Growth factor applied to the delay after each retry.
pub const DEFAULT_MULTIPLIER: u32 = 2;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt; total attempts is this plus one.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Factor by which the delay grows after each retry.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// A policy that gives up after the first failure.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Total attempts, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait before retry number `retry` (1-indexed).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = u64::from(self.multiplier).saturating_pow(retry.saturating_sub(1));
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Runs `action` until it succeeds or the policy's attempts are used up.
///
/// `action` receives the 1-indexed attempt number. Each failure except the
/// last is logged at `warn` and followed by an awaited sleep; the last failure
/// is returned unchanged. Callers decide what is worth retrying by only
/// returning `Err` for transient failures from `action`.
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut action: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 1;

    loop {
        match action(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts => {
                let delay = policy.delay_for_retry(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {}ms...",
                    operation,
                    attempt,
                    max_attempts,
                    err,
                    delay.as_millis()
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
