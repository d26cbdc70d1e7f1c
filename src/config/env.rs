//! Runtime environment validation
//!
//! The pipeline refuses to start unless every required environment variable
//! is set. This check runs before the parameter file is even opened, so a
//! misconfigured shell fails fast with the variable's name instead of a
//! confusing downstream error.

use crate::domain::errors::StrataError;
use crate::domain::result::Result;
use std::path::PathBuf;

/// Environment variable holding the path of the parameter file.
pub const CONFIG_PATH_VAR: &str = "CONFIG_PATH";

/// Environment variables that must be set before composition starts.
pub const REQUIRED_ENV_VARS: &[&str] = &[CONFIG_PATH_VAR];

/// Checks that every required environment variable is present
///
/// # Errors
///
/// Returns [`StrataError::Environment`] naming the first missing variable.
pub fn check_env_vars() -> Result<()> {
    for var in REQUIRED_ENV_VARS {
        if std::env::var(var).is_err() {
            return Err(StrataError::Environment((*var).to_string()));
        }
    }
    Ok(())
}

/// Reads the parameter file path from `CONFIG_PATH`
///
/// # Errors
///
/// Returns [`StrataError::Environment`] if the variable is unset.
pub fn config_path_from_env() -> Result<PathBuf> {
    std::env::var(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .map_err(|_| StrataError::Environment(CONFIG_PATH_VAR.to_string()))
}
