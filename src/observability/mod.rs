//! # Observability
//!
//! Structured logging setup on top of `tracing`.

mod logger;

pub use logger::{build_filter, init_logging, LogFormat, LoggingError};
