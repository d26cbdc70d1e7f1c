//! Nested configuration tree types
//!
//! [`SolutionConfig`] is the stage-grouped configuration tree every
//! downstream pipeline stage reads its settings from. Values are grouped
//! by the stage that consumes them, not by their origin in the flat
//! parameter set, so each stage gets a self-contained sub-tree. A flat
//! parameter shared by several stages (thread counts, batch sizes, the
//! scoring train split) appears in each of their groups; the composer
//! sources every occurrence from the same canonical field and the tree is
//! immutable once built, so the copies cannot diverge.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level stage keys of the tree, in serialization order.
///
/// Downstream consumers address their sub-tree by these names; the set is
/// part of the crate's compatibility contract and never changes shape
/// between runs.
pub const STAGE_KEYS: &[&str] = &[
    "env",
    "execution",
    "xy_splitter",
    "reader_single",
    "loader",
    "unet",
    "tta_generator",
    "tta_aggregator",
    "postprocessor",
];

/// The composed, stage-grouped configuration tree
///
/// Built exactly once at process startup by
/// [`SolutionConfig::compose`](crate::config::compose) and treated as
/// read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionConfig {
    /// Shared environment (cache location)
    pub env: EnvConfig,
    /// Process-wide execution settings
    pub execution: ExecutionConfig,
    /// Column selection for the X/y splitter
    pub xy_splitter: ColumnsConfig,
    /// Column selection for the single-pass reader
    pub reader_single: ColumnsConfig,
    /// Data loader geometry and batching
    pub loader: LoaderConfig,
    /// U-Net architecture, training schedule and callbacks
    pub unet: UnetConfig,
    /// Test-time augmentation generation flags
    pub tta_generator: TtaGeneratorConfig,
    /// Test-time augmentation aggregation
    pub tta_aggregator: TtaAggregatorConfig,
    /// Mask postprocessing and scoring models
    pub postprocessor: PostprocessorConfig,
}

/// Shared environment settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Directory used for intermediate caches
    pub cache_dirpath: PathBuf,
}

/// Process-wide execution settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Root directory of the experiment
    pub exp_root: PathBuf,
    pub load_in_memory: bool,
    pub num_workers: usize,
    /// Segmentation classes (background + foreground)
    pub num_classes: usize,
    /// Target image dimensions as an ordered (height, width) pair
    pub img_h_w: (u32, u32),
    pub batch_size_train: usize,
    pub batch_size_inference: usize,
    pub loader_mode: String,
    pub stream_mode: bool,
}

/// Input/target column selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnsConfig {
    pub x_columns: Vec<String>,
    pub y_columns: Vec<String>,
}

/// Data loader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub dataset_params: DatasetParams,
    pub loader_params: LoaderParams,
}

/// Dataset geometry parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetParams {
    pub h_pad: u32,
    pub w_pad: u32,
    pub h: u32,
    pub w: u32,
    pub pad_method: String,
}

/// Per-phase loader parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderParams {
    pub training: DataLoaderParams,
    pub inference: DataLoaderParams,
}

/// Batching parameters for one loader phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataLoaderParams {
    pub batch_size: usize,
    pub shuffle: bool,
    pub num_workers: usize,
    pub pin_memory: bool,
}

/// U-Net stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnetConfig {
    pub architecture_config: ArchitectureConfig,
    pub training_config: TrainingConfig,
    pub callbacks_config: CallbacksConfig,
}

/// U-Net architecture configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchitectureConfig {
    pub model_params: ModelParams,
    pub optimizer_params: OptimizerParams,
    pub regularizer_params: RegularizerParams,
    pub weights_init: WeightsInit,
    pub loss_weights: LossWeights,
    pub weighted_cross_entropy: WeightedCrossEntropy,
    pub dice: DiceParams,
}

/// Network shape parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelParams {
    pub n_filters: usize,
    pub conv_kernel: usize,
    pub pool_kernel: usize,
    pub pool_stride: usize,
    pub repeat_blocks: usize,
    pub batch_norm: bool,
    pub dropout: f64,
    pub in_channels: usize,
    pub out_channels: usize,
    pub nr_outputs: usize,
    pub encoder: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerParams {
    pub lr: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularizerParams {
    pub regularize: bool,
    pub weight_decay_conv2d: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsInit {
    pub function: String,
}

/// Relative weights of the mask losses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossWeights {
    pub bce_mask: f64,
    pub dice_mask: f64,
}

/// Distance-weighted cross-entropy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCrossEntropy {
    pub w0: f64,
    pub sigma: f64,
    /// Image dimensions as an ordered (height, width) pair
    pub imsize: (u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiceParams {
    pub smooth: f64,
    pub dice_activation: String,
}

/// Training schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub epochs: usize,
}

/// Training callback configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbacksConfig {
    pub model_checkpoint: ModelCheckpointConfig,
    pub exp_lr_scheduler: ExpLrSchedulerConfig,
    pub plateau_lr_scheduler: PlateauLrSchedulerConfig,
    pub training_monitor: MonitorCadence,
    pub experiment_timing: MonitorCadence,
    pub validation_monitor: ValidationMonitorConfig,
    pub experiment_monitor: ExperimentMonitorConfig,
    pub early_stopping: EarlyStoppingConfig,
}

/// Best-model checkpointing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCheckpointConfig {
    /// Derived path: exp_root/checkpoints/unet/best.torch
    pub filepath: PathBuf,
    pub epoch_every: usize,
    /// Whether a lower validation metric is better; negation of
    /// `validate_with_map`
    pub minimize: bool,
}

/// Exponential learning-rate decay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpLrSchedulerConfig {
    pub gamma: f64,
    pub epoch_every: usize,
}

/// Reduce-on-plateau learning-rate schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateauLrSchedulerConfig {
    pub lr_factor: f64,
    pub lr_patience: usize,
    pub epoch_every: usize,
}

/// How often a monitor callback fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorCadence {
    pub batch_every: usize,
    pub epoch_every: usize,
}

/// Validation metric computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationMonitorConfig {
    pub epoch_every: usize,
    pub data_dir: PathBuf,
    pub validate_with_map: bool,
    pub small_annotations_size: usize,
}

/// Experiment-tracking image plots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMonitorConfig {
    pub model_name: String,
    pub image_nr: usize,
    pub image_resize: f64,
    pub outputs_to_plot: Vec<String>,
}

/// Early stopping on the validation metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyStoppingConfig {
    pub patience: usize,
    /// Negation of `validate_with_map`, same derivation as the checkpoint
    pub minimize: bool,
}

/// Test-time augmentation generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtaGeneratorConfig {
    pub flip_ud: bool,
    pub flip_lr: bool,
    pub rotation: bool,
    pub color_shift_runs: bool,
}

/// Test-time augmentation aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TtaAggregatorConfig {
    pub method: String,
    pub num_threads: usize,
}

/// Postprocessing and scoring stage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostprocessorConfig {
    pub mask_dilation: MaskDilationConfig,
    pub mask_erosion: MaskErosionConfig,
    pub prediction_crop: PredictionCropConfig,
    /// Which scoring model to use (`lgbm` or `random_forest`)
    pub scoring_model: String,
    pub lightgbm: LightGbmConfig,
    pub random_forest: RandomForestConfig,
    pub nms: NmsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskDilationConfig {
    pub dilate_selem_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaskErosionConfig {
    pub erode_selem_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionCropConfig {
    pub h_crop: u32,
    pub w_crop: u32,
}

/// LightGBM scoring model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightGbmConfig {
    pub model_params: LightGbmModelParams,
    pub training_params: LightGbmTrainingParams,
    pub train_size: f64,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightGbmModelParams {
    pub learning_rate: f64,
    pub boosting_type: String,
    pub objective: String,
    pub metric: String,
    pub sub_feature: f64,
    pub num_leaves: usize,
    pub min_data: usize,
    pub max_depth: i64,
    pub num_threads: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightGbmTrainingParams {
    pub number_boosting_rounds: usize,
    pub early_stopping_rounds: usize,
}

/// Random-forest scoring model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestConfig {
    pub train_size: f64,
    pub target: String,
    pub model_params: RandomForestModelParams,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestModelParams {
    pub n_estimators: usize,
    pub criterion: String,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    pub max_features: f64,
    pub max_leaf_nodes: Option<usize>,
    pub n_jobs: i64,
    pub verbose: usize,
}

/// Non-maximum suppression over instance candidates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NmsConfig {
    pub iou_threshold: f64,
    pub num_threads: usize,
}
