//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Strata using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Strata - segmentation-pipeline configuration composer
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version, about, long_about = None)]
#[command(author = "Strata Contributors")]
pub struct Cli {
    /// Path to the parameter file
    #[arg(short, long, default_value = "params.toml", env = "CONFIG_PATH")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "STRATA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Directory for daily-rotated JSON log files
    #[arg(long, env = "STRATA_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compose the configuration tree and print it as JSON
    ShowConfig(commands::show::ShowArgs),

    /// Validate a parameter file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new parameter file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_show_config() {
        let cli = Cli::parse_from(["strata", "show-config"]);
        assert!(matches!(cli.command, Commands::ShowConfig(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["strata", "--config", "custom.toml", "show-config"]);
        assert_eq!(cli.config, "custom.toml");
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["strata", "--log-level", "debug", "show-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["strata", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["strata", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
