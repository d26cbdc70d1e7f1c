//! Configuration composition for the segmentation pipeline.
//!
//! This module is the single source of truth for pipeline configuration:
//! it validates the runtime environment, reads the flat parameter file,
//! and composes the stage-grouped [`SolutionConfig`] tree consumed by
//! every downstream stage.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use strata::config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Startup path: env check -> CONFIG_PATH -> read -> compose
//! let config = config::init_from_env()?;
//!
//! // Each stage reads its own sub-tree
//! let (h, w) = config.execution.img_h_w;
//! println!("training at {}x{}", h, w);
//! println!("checkpoints: {}", config.unet.callbacks_config.model_checkpoint.filepath.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Parameter Files
//!
//! Parameters live in a TOML file with a single `[parameters]` table:
//!
//! ```toml
//! [parameters]
//! experiment_dir = "${SCRATCH}/experiments/unet"
//! data_dir = "/data/ships"
//! image_h = 256
//! image_w = 256
//! # ...
//! ```
//!
//! `${VAR}` references are substituted from the environment before
//! parsing; a missing variable or a missing parameter key aborts startup
//! with an error naming it.
//!
//! # Composition rules
//!
//! - Values are grouped by the stage that consumes them, so each stage's
//!   sub-tree is self-contained; shared parameters are sourced from one
//!   canonical field at every occurrence.
//! - `(image_h, image_w)` is packed into ordered pairs wherever a stage
//!   expects a combined dimension.
//! - The checkpoint path is derived by joining the experiment root with
//!   fixed sub-segments, never supplied directly.
//! - `minimize` flags are the negation of `validate_with_map`.
//! - The tree is composed exactly once at startup and is read-only
//!   thereafter.

pub mod compose;
pub mod constants;
pub mod env;
pub mod params;
pub mod schema;

// Re-export commonly used items
pub use compose::{checkpoint_filepath, init_from_env, load};
pub use constants::{
    CATEGORY_IDS, CATEGORY_LAYERS, MEAN, SEED, SIZE_COLUMNS, STD, X_COLUMNS, Y_COLUMNS,
    Y_COLUMNS_SCORING,
};
pub use env::{check_env_vars, config_path_from_env, CONFIG_PATH_VAR, REQUIRED_ENV_VARS};
pub use params::{read_params, ParameterFile, Parameters};
pub use schema::{SolutionConfig, STAGE_KEYS};
