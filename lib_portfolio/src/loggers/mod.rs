//! # Logging Setup
//!
//! Library code only emits `tracing` events. Binaries call [`init_logging`]
//! once at startup to decide where those events go.

/// Global `tracing` subscriber construction.
pub mod subscriber;

pub use subscriber::{init_logging, parse_filter, LoggingError, LoggingOptions};
