// Strata - Segmentation Pipeline Configuration Composer
// Copyright (c) 2026 Strata Contributors
// Licensed under the MIT License

//! # Strata - Segmentation Pipeline Configuration Composer
//!
//! Strata is the single source of truth for the configuration of a
//! multi-stage image-segmentation pipeline. It validates the runtime
//! environment, reads a flat parameter file, and deterministically
//! composes a strongly-typed, stage-grouped configuration tree consumed
//! by every downstream stage (data loading, model training, test-time
//! augmentation, postprocessing, scoring).
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Environment validation, parameter reading, tree composition
//! - [`domain`] - Error types and result alias
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use strata::config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Env check -> CONFIG_PATH -> read -> compose, once at startup
//!     let tree = config::init_from_env()?;
//!
//!     // Pass the immutable tree by reference to every stage
//!     let (h, w) = tree.execution.img_h_w;
//!     println!("training at {h}x{w}");
//!     Ok(())
//! }
//! ```
//!
//! ## Composition guarantees
//!
//! - The tree's top-level keys are exactly [`config::STAGE_KEYS`], every run.
//! - Identical parameters compose to value-equal trees.
//! - A missing environment variable or parameter aborts startup with an
//!   error naming it; there is no partial-pipeline mode.
//! - Derived values (the checkpoint path, `(h, w)` dimension pairs, the
//!   `minimize` flags) are computed inside the composer, never supplied
//!   as flat parameters.
//!
//! Fixed pipeline constants (column lists, the random seed, normalization
//! statistics, category tables) are exported from [`config::constants`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
