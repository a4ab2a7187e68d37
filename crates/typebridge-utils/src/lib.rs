//! # typebridge Utilities
//!
//! Shared utilities for the typebridge workspace, chiefly the logging setup
//! built on `tracing`.

pub mod logging;

// Re-export commonly used logging functions for convenience
pub use logging::{default_log_file, init_file_logging, init_logging, init_logging_with_level, LogFormat, LogLevel, LoggingError};
pub use tracing_appender::non_blocking::WorkerGuard;
pub use tracing::{debug, error, info, trace, warn};
