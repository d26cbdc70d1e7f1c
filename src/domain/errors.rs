//! Domain error types
//!
//! All errors are domain-specific and don't expose third-party types.
//! Every failure on the composition path is fatal: a partially-built
//! configuration must never reach a training or inference job.

use thiserror::Error;

/// Main Strata error type
///
/// This is the primary error type used throughout the application.
#[derive(Debug, Error)]
pub enum StrataError {
    /// A required environment variable is missing
    #[error("Missing required environment variable: {0}")]
    Environment(String),

    /// Configuration file reading or parsing errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Parameter validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}
