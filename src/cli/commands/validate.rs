//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! a parameter file and previewing the composed tree.

use crate::config::{self, SolutionConfig};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating parameter file");

        println!("🔍 Validating parameter file: {config_path}");
        println!();

        // Reading already checks presence, typing and ranges
        let params = match config::read_params(config_path) {
            Ok(p) => {
                println!("✅ Parameter file loaded successfully");
                p
            }
            Err(e) => {
                println!("❌ Failed to load parameter file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let tree = SolutionConfig::compose(&params);

        println!("✅ Configuration composed");
        println!();
        println!("Configuration Summary:");
        println!("  Experiment Root: {}", tree.execution.exp_root.display());
        println!("  Data Directory: {}", params.data_dir.display());
        println!(
            "  Image Size: {}x{}",
            tree.execution.img_h_w.0, tree.execution.img_h_w.1
        );
        println!("  Loader Mode: {}", tree.execution.loader_mode);
        println!(
            "  Batch Sizes: train={} inference={}",
            tree.execution.batch_size_train, tree.execution.batch_size_inference
        );
        println!("  Workers: {}", tree.execution.num_workers);
        println!(
            "  Encoder: {}",
            tree.unet.architecture_config.model_params.encoder
        );
        println!("  Epochs: {}", tree.unet.training_config.epochs);
        println!(
            "  Checkpoint: {}",
            tree.unet
                .callbacks_config
                .model_checkpoint
                .filepath
                .display()
        );
        println!(
            "  Validate with mAP: {}",
            tree.unet
                .callbacks_config
                .validation_monitor
                .validate_with_map
        );
        println!("  TTA Aggregation: {}", tree.tta_aggregator.method);
        println!("  Scoring Model: {}", tree.postprocessor.scoring_model);
        println!();
        Ok(0)
    }
}
