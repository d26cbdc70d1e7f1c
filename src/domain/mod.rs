//! Domain types for Strata.
//!
//! The domain layer provides:
//! - **Error types** ([`StrataError`])
//! - **Result type alias** ([`Result`])
//!
//! All fallible operations return [`Result<T, StrataError>`]:
//!
//! ```rust,no_run
//! use strata::domain::Result;
//!
//! fn example() -> Result<()> {
//!     let config = strata::config::load("params.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::StrataError;
pub use result::Result;
