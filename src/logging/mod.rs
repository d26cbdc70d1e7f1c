//! Logging and observability
//!
//! Structured logging for the CLI: a console layer is always active, and
//! an optional daily-rotated JSON file layer can be enabled with a log
//! directory.
//!
//! # Example
//!
//! ```no_run
//! use strata::logging::init_logging;
//!
//! let _guard = init_logging("info", None).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};
