//! Flat experiment parameters and the parameter-file reader
//!
//! A parameter file is a TOML document with a single `[parameters]` table
//! holding the flat, un-grouped experiment settings. Reading it:
//!
//! 1. Reads the TOML file
//! 2. Performs environment variable substitution (`${VAR}` syntax)
//! 3. Deserializes the `[parameters]` table into [`Parameters`]
//! 4. Validates ranges and enumerated values
//!
//! [`Parameters`] is deliberately strict: required keys carry no serde
//! defaults, so a file missing `image_h` fails deserialization with an
//! error naming `image_h` instead of silently substituting a value. The
//! composer downstream can therefore assume a complete parameter set.

use crate::domain::errors::StrataError;
use crate::domain::result::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk layout of a parameter file: one `[parameters]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterFile {
    /// The flat parameter set
    pub parameters: Parameters,
}

/// The flat experiment parameter set
///
/// Field names match the keys of the `[parameters]` table verbatim,
/// including the `lgbm__`/`rf__`/`nms__` prefixes that namespace the
/// scoring-model parameters within the flat file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    // Experiment layout and data loading
    /// Root directory of the experiment (checkpoints, caches)
    pub experiment_dir: PathBuf,
    /// Directory holding the image and annotation data
    pub data_dir: PathBuf,
    /// Keep the full dataset resident in memory
    pub load_in_memory: bool,
    /// Worker count for the data loaders
    pub num_workers: usize,
    /// Thread count for postprocessing aggregation and scoring
    pub num_threads: usize,
    /// Target image height
    pub image_h: u32,
    /// Target image width
    pub image_w: u32,
    /// Input channels per image
    pub image_channels: usize,
    /// Batch size during training
    pub batch_size_train: usize,
    /// Batch size during inference
    pub batch_size_inference: usize,
    /// Loader geometry mode (`resize` or `crop_and_pad`)
    pub loader_mode: String,
    /// Stream samples from disk instead of materializing the dataset
    pub stream_mode: bool,
    /// Vertical padding applied before cropping
    pub h_pad: u32,
    /// Horizontal padding applied before cropping
    pub w_pad: u32,
    /// Padding fill strategy
    pub pad_method: String,
    /// Pin loader memory for faster device transfer
    pub pin_memory: bool,

    // U-Net architecture
    pub n_filters: usize,
    pub conv_kernel: usize,
    pub pool_kernel: usize,
    pub pool_stride: usize,
    pub repeat_blocks: usize,
    pub use_batch_norm: bool,
    pub dropout_conv: f64,
    pub channels_per_output: usize,
    pub nr_unet_outputs: usize,
    pub encoder: String,

    // U-Net optimization and losses
    pub lr: f64,
    pub l2_reg_conv: f64,
    pub bce_mask: f64,
    pub dice_mask: f64,
    pub w0: f64,
    pub sigma: f64,
    pub dice_smooth: f64,
    pub dice_activation: String,

    // Training schedule and callbacks
    pub epochs_nr: usize,
    pub gamma: f64,
    pub lr_factor: f64,
    pub lr_patience: usize,
    /// Early-stopping patience in epochs
    pub patience: usize,
    /// Validate with mean average precision instead of the loss
    pub validate_with_map: bool,
    pub small_annotations_size: usize,
    /// Which U-Net outputs the experiment monitor should plot
    pub unet_outputs_to_plot: Vec<String>,

    // Test-time augmentation and postprocessing
    pub tta_aggregation_method: String,
    pub dilate_selem_size: u32,
    pub erode_selem_size: u32,
    pub crop_image_h: u32,
    pub crop_image_w: u32,
    /// Scoring model selector (`lgbm` or `random_forest`)
    pub scoring_model: String,

    // LightGBM scoring model
    pub lgbm__learning_rate: f64,
    pub lgbm__num_leaves: usize,
    pub lgbm__min_data: usize,
    /// Maximum tree depth, -1 for unlimited
    pub lgbm__max_depth: i64,
    pub lgbm__number_of_trees: usize,
    pub lgbm__early_stopping: usize,
    /// Fraction of the scoring data used for training
    pub lgbm__train_size: f64,
    /// Regression target column for the scoring models
    pub lgbm__target: String,

    // Random-forest scoring model
    pub rf__n_estimators: usize,
    pub rf__criterion: String,
    pub rf__max_depth: usize,
    pub rf__min_samples_split: usize,
    pub rf__min_samples_leaf: usize,
    pub rf__max_features: f64,
    #[serde(default)]
    pub rf__max_leaf_nodes: Option<usize>,
    pub rf__n_jobs: i64,
    pub rf__verbose: usize,

    // Non-maximum suppression
    pub nms__iou_threshold: f64,
}

impl Parameters {
    /// Validates ranges and enumerated values
    ///
    /// Presence and typing are already guaranteed by deserialization; this
    /// catches values that parse but cannot configure a runnable pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error message naming the offending parameter.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.image_h == 0 || self.image_w == 0 {
            return Err(format!(
                "image_h and image_w must be > 0, got {}x{}",
                self.image_h, self.image_w
            ));
        }

        if self.batch_size_train == 0 || self.batch_size_inference == 0 {
            return Err("batch_size_train and batch_size_inference must be > 0".to_string());
        }

        let valid_loader_modes = ["resize", "crop_and_pad"];
        if !valid_loader_modes.contains(&self.loader_mode.as_str()) {
            return Err(format!(
                "Invalid loader_mode '{}'. Must be one of: {}",
                self.loader_mode,
                valid_loader_modes.join(", ")
            ));
        }

        let valid_pad_methods = ["edge", "reflect", "symmetric", "constant"];
        if !valid_pad_methods.contains(&self.pad_method.as_str()) {
            return Err(format!(
                "Invalid pad_method '{}'. Must be one of: {}",
                self.pad_method,
                valid_pad_methods.join(", ")
            ));
        }

        if !(0.0..1.0).contains(&self.dropout_conv) {
            return Err(format!(
                "dropout_conv must be in [0, 1), got {}",
                self.dropout_conv
            ));
        }

        if self.lr <= 0.0 {
            return Err(format!("lr must be > 0, got {}", self.lr));
        }

        if self.epochs_nr == 0 {
            return Err("epochs_nr must be > 0".to_string());
        }

        let valid_activations = ["softmax", "sigmoid"];
        if !valid_activations.contains(&self.dice_activation.as_str()) {
            return Err(format!(
                "Invalid dice_activation '{}'. Must be one of: {}",
                self.dice_activation,
                valid_activations.join(", ")
            ));
        }

        let valid_scoring_models = ["lgbm", "random_forest"];
        if !valid_scoring_models.contains(&self.scoring_model.as_str()) {
            return Err(format!(
                "Invalid scoring_model '{}'. Must be one of: {}",
                self.scoring_model,
                valid_scoring_models.join(", ")
            ));
        }

        if !(0.0..=1.0).contains(&self.lgbm__train_size) || self.lgbm__train_size == 0.0 {
            return Err(format!(
                "lgbm__train_size must be in (0, 1], got {}",
                self.lgbm__train_size
            ));
        }

        if !(0.0..=1.0).contains(&self.nms__iou_threshold) {
            return Err(format!(
                "nms__iou_threshold must be in [0, 1], got {}",
                self.nms__iou_threshold
            ));
        }

        Ok(())
    }
}

/// Reads and validates a parameter file
///
/// # Errors
///
/// Returns an error if the file cannot be read, a referenced environment
/// variable is unset, the TOML is malformed or missing a required key, or
/// validation fails. The error message names the file and the offending
/// variable or parameter.
pub fn read_params(path: impl AsRef<Path>) -> Result<Parameters> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(StrataError::Configuration(format!(
            "Parameter file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        StrataError::Io(format!(
            "Failed to read parameter file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let file: ParameterFile = toml::from_str(&contents)
        .map_err(|e| StrataError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    file.parameters
        .validate()
        .map_err(StrataError::Validation)?;

    Ok(file.parameters)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(StrataError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

#[cfg(test)]
pub(crate) fn sample_parameters() -> Parameters {
    Parameters {
        experiment_dir: PathBuf::from("/tmp/exp"),
        data_dir: PathBuf::from("/tmp/data"),
        load_in_memory: true,
        num_workers: 4,
        num_threads: 8,
        image_h: 256,
        image_w: 256,
        image_channels: 3,
        batch_size_train: 32,
        batch_size_inference: 64,
        loader_mode: "resize".to_string(),
        stream_mode: false,
        h_pad: 10,
        w_pad: 10,
        pad_method: "edge".to_string(),
        pin_memory: true,
        n_filters: 16,
        conv_kernel: 3,
        pool_kernel: 3,
        pool_stride: 2,
        repeat_blocks: 4,
        use_batch_norm: true,
        dropout_conv: 0.1,
        channels_per_output: 1,
        nr_unet_outputs: 1,
        encoder: "ResNet101".to_string(),
        lr: 0.0001,
        l2_reg_conv: 0.0001,
        bce_mask: 1.0,
        dice_mask: 1.0,
        w0: 50.0,
        sigma: 10.0,
        dice_smooth: 1.0,
        dice_activation: "softmax".to_string(),
        epochs_nr: 100,
        gamma: 0.99,
        lr_factor: 0.3,
        lr_patience: 30,
        patience: 30,
        validate_with_map: true,
        small_annotations_size: 14,
        unet_outputs_to_plot: vec!["mask".to_string()],
        tta_aggregation_method: "mean".to_string(),
        dilate_selem_size: 0,
        erode_selem_size: 0,
        crop_image_h: 300,
        crop_image_w: 300,
        scoring_model: "lgbm".to_string(),
        lgbm__learning_rate: 0.001,
        lgbm__num_leaves: 10,
        lgbm__min_data: 10,
        lgbm__max_depth: -1,
        lgbm__number_of_trees: 500,
        lgbm__early_stopping: 50,
        lgbm__train_size: 0.7,
        lgbm__target: "iou".to_string(),
        rf__n_estimators: 500,
        rf__criterion: "mse".to_string(),
        rf__max_depth: 10,
        rf__min_samples_split: 2,
        rf__min_samples_leaf: 1,
        rf__max_features: 0.5,
        rf__max_leaf_nodes: None,
        rf__n_jobs: -1,
        rf__verbose: 0,
        nms__iou_threshold: 0.5,
    }
}
