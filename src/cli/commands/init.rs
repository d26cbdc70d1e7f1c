//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! parameter file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the parameter file
    #[arg(short, long, default_value = "params.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing parameter file");

        println!("📝 Initializing Strata parameter file");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Parameter file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, Self::generate_sample_params()) {
            Ok(_) => {
                println!("✅ Parameter file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your experiment settings", self.output);
                println!("  2. Export CONFIG_PATH={}", self.output);
                println!("  3. Validate: strata validate-config");
                println!("  4. Inspect the composed tree: strata show-config");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write parameter file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate a complete sample parameter file
    fn generate_sample_params() -> &'static str {
        r#"# Strata parameter file
# Flat experiment parameters; `strata show-config` prints the composed tree.

[parameters]
# Experiment layout and data loading
experiment_dir = "/tmp/experiments/unet"
data_dir = "/data/ships"
load_in_memory = false
num_workers = 4
num_threads = 8
image_h = 256
image_w = 256
image_channels = 3
batch_size_train = 32
batch_size_inference = 64
loader_mode = "resize"          # resize | crop_and_pad
stream_mode = false
h_pad = 0
w_pad = 0
pad_method = "edge"             # edge | reflect | symmetric | constant
pin_memory = true

# U-Net architecture
n_filters = 16
conv_kernel = 3
pool_kernel = 3
pool_stride = 2
repeat_blocks = 4
use_batch_norm = true
dropout_conv = 0.1
channels_per_output = 1
nr_unet_outputs = 1
encoder = "ResNet101"

# Optimization and losses
lr = 0.0001
l2_reg_conv = 0.0001
bce_mask = 1.0
dice_mask = 1.0
w0 = 50.0
sigma = 10.0
dice_smooth = 1.0
dice_activation = "softmax"     # softmax | sigmoid

# Training schedule and callbacks
epochs_nr = 100
gamma = 0.99
lr_factor = 0.3
lr_patience = 30
patience = 30
validate_with_map = true
small_annotations_size = 14
unet_outputs_to_plot = ["mask"]

# Test-time augmentation and postprocessing
tta_aggregation_method = "mean"
dilate_selem_size = 0
erode_selem_size = 0
crop_image_h = 300
crop_image_w = 300
scoring_model = "lgbm"          # lgbm | random_forest

# LightGBM scoring model
lgbm__learning_rate = 0.001
lgbm__num_leaves = 10
lgbm__min_data = 10
lgbm__max_depth = -1
lgbm__number_of_trees = 500
lgbm__early_stopping = 50
lgbm__train_size = 0.7
lgbm__target = "iou"

# Random-forest scoring model
rf__n_estimators = 500
rf__criterion = "mse"
rf__max_depth = 10
rf__min_samples_split = 2
rf__min_samples_leaf = 1
rf__max_features = 0.5
rf__n_jobs = -1
rf__verbose = 0

# Non-maximum suppression
nms__iou_threshold = 0.5
"#
    }
}
