//! # Portfolio Feed
//!
//! The consumption adapter between the fetch-and-validate pipeline and
//! presentation code. It runs a cycle when mounted and on every `retry()`, and
//! publishes a [`FeedState`] snapshot through a `tokio::sync::watch` channel.
//!
//! Only the most recent cycle may update the state. Results of superseded
//! cycles, and of any cycle still in flight when the feed is dropped, are
//! discarded. The transport itself is never cancelled.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::api::PortfolioSource;
use super::model::PortfolioItem;
use crate::retrieve::error::FetchError;

/// What presentation code gets to see.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeedState {
    /// The latest validated batch; empty until the first success.
    pub items: Vec<PortfolioItem>,
    /// A cycle is in flight.
    pub loading: bool,
    /// Message of the latest cycle's failure.
    pub error: Option<String>,
    /// The failure was a classified transport error (network or HTTP status),
    /// as opposed to a payload or other error.
    pub is_classified_error: bool,
}

struct Shared<S> {
    source: S,
    state: watch::Sender<FeedState>,
    /// Bumped by every cycle; a result is applied only if its cycle is current.
    generation: AtomicU64,
    mounted: AtomicBool,
}

impl<S: PortfolioSource> Shared<S> {
    fn apply(&self, generation: u64, outcome: Result<Vec<PortfolioItem>, FetchError>) {
        let failure = outcome.as_ref().err().map(ToString::to_string);

        let applied = self.state.send_if_modified(|state| {
            if !self.mounted.load(Ordering::Acquire)
                || self.generation.load(Ordering::Acquire) != generation
            {
                return false;
            }
            state.loading = false;
            match outcome {
                Ok(items) => {
                    state.items = items;
                    state.error = None;
                    state.is_classified_error = false;
                }
                Err(err) => {
                    state.error = Some(err.to_string());
                    state.is_classified_error = err.is_classified();
                }
            }
            true
        });

        match failure {
            _ if !applied => debug!("Discarding result of superseded feed cycle {}", generation),
            Some(message) => warn!("Portfolio feed cycle {} failed: {}", generation, message),
            None => debug!("Portfolio feed cycle {} applied", generation),
        }
    }
}

/// # Portfolio Feed
///
/// Owns the feed state for one consumer. Dropping it tears the feed down.
pub struct PortfolioFeed<S: PortfolioSource> {
    shared: Arc<Shared<S>>,
}

impl<S: PortfolioSource> PortfolioFeed<S> {
    /// Creates the feed and starts the initial cycle.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime; the cycle is spawned on it.
    pub fn mount(source: S) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        let feed = Self {
            shared: Arc::new(Shared {
                source,
                state,
                generation: AtomicU64::new(0),
                mounted: AtomicBool::new(true),
            }),
        };
        feed.start_cycle();
        feed
    }

    /// Clears any previous error and runs a new cycle. Safe to call repeatedly;
    /// only the last call's outcome is kept.
    pub fn retry(&self) {
        self.start_cycle();
    }

    fn start_cycle(&self) {
        let mut generation = 0;
        self.shared.state.send_modify(|state| {
            generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
            state.loading = true;
            state.error = None;
            state.is_classified_error = false;
        });

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let outcome = shared.source.load().await;
            shared.apply(generation, outcome);
        });
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> FeedState {
        self.shared.state.borrow().clone()
    }

    /// A receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.shared.state.subscribe()
    }

    /// The current validated batch.
    pub fn items(&self) -> Vec<PortfolioItem> {
        self.shared.state.borrow().items.clone()
    }

    /// Whether a cycle is in flight.
    pub fn loading(&self) -> bool {
        self.shared.state.borrow().loading
    }

    /// The latest failure message, if any.
    pub fn error(&self) -> Option<String> {
        self.shared.state.borrow().error.clone()
    }

    /// Whether the latest failure was a classified transport error.
    pub fn is_classified_error(&self) -> bool {
        self.shared.state.borrow().is_classified_error
    }
}

impl<S: PortfolioSource> Drop for PortfolioFeed<S> {
    fn drop(&mut self) {
        self.shared.mounted.store(false, Ordering::Release);
    }
}
