//! Show config command implementation
//!
//! Composes the configuration tree from a parameter file and prints it as
//! pretty JSON, exactly as downstream stages will see it.

use crate::config;
use clap::Args;

/// Arguments for the show-config command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Print the flat parameters instead of the composed tree
    #[arg(long)]
    pub flat: bool,
}

impl ShowArgs {
    /// Execute the show-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Composing configuration");

        if self.flat {
            let params = match config::read_params(config_path) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error: {e}");
                    return Ok(2);
                }
            };
            println!("{}", serde_json::to_string_pretty(&params)?);
            return Ok(0);
        }

        match config::load(config_path) {
            Ok(tree) => {
                println!("{}", serde_json::to_string_pretty(&tree)?);
                Ok(0)
            }
            Err(e) => {
                eprintln!("Error: {e}");
                Ok(2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_args_creation() {
        let args = ShowArgs { flat: false };
        let _ = format!("{args:?}");
    }

    #[test]
    fn test_show_missing_file_is_config_error() {
        let args = ShowArgs { flat: false };
        let code = args.execute("nonexistent.toml").unwrap();
        assert_eq!(code, 2);
    }
}
