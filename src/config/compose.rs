//! The configuration composer
//!
//! A single deterministic pass that turns the flat [`Parameters`] into the
//! stage-grouped [`SolutionConfig`] tree. Every leaf is one of:
//!
//! - a verbatim copy of a flat parameter,
//! - a derived value (the joined checkpoint path, packed `(h, w)` pairs,
//!   `minimize` flags negated from `validate_with_map`),
//! - a literal constant fixed by the pipeline design (loss identifiers,
//!   the boosting algorithm, monitor cadences).
//!
//! The composer performs no I/O and no validation of its own: presence,
//! typing and ranges are guaranteed by [`read_params`] before it runs, so
//! composition is infallible and two calls with the same parameters yield
//! value-equal trees.

use crate::config::env::{check_env_vars, config_path_from_env};
use crate::config::params::{read_params, Parameters};
use crate::config::schema::*;
use crate::domain::result::Result;
use std::path::{Path, PathBuf};

/// Fixed checkpoint location relative to the experiment root.
const CHECKPOINT_SUBDIR: &str = "checkpoints";
const CHECKPOINT_MODEL_DIR: &str = "unet";
const CHECKPOINT_FILENAME: &str = "best.torch";

/// Derives the checkpoint file path from the experiment root
///
/// The path is never supplied directly as a flat parameter; it is always
/// exp_root/checkpoints/unet/best.torch.
pub fn checkpoint_filepath(exp_root: &Path) -> PathBuf {
    exp_root
        .join(CHECKPOINT_SUBDIR)
        .join(CHECKPOINT_MODEL_DIR)
        .join(CHECKPOINT_FILENAME)
}

impl SolutionConfig {
    /// Composes the nested configuration tree from the flat parameters
    ///
    /// Pure and deterministic: no I/O beyond in-memory path joins, and the
    /// same parameters always produce a value-equal tree. Shared flat
    /// parameters (`num_workers`, `num_threads`, batch sizes, the scoring
    /// train split) are sourced from their single canonical field at every
    /// occurrence.
    pub fn compose(params: &Parameters) -> Self {
        // Checkpointing and early stopping minimize the loss unless the
        // experiment validates with mean average precision, which is
        // maximized. Derived once, negated, never a separate parameter.
        let minimize = !params.validate_with_map;
        let img_h_w = (params.image_h, params.image_w);

        let columns = ColumnsConfig {
            x_columns: crate::config::constants::X_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            y_columns: crate::config::constants::Y_COLUMNS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        SolutionConfig {
            env: EnvConfig {
                cache_dirpath: params.experiment_dir.clone(),
            },
            execution: ExecutionConfig {
                exp_root: params.experiment_dir.clone(),
                load_in_memory: params.load_in_memory,
                num_workers: params.num_workers,
                num_classes: 2,
                img_h_w,
                batch_size_train: params.batch_size_train,
                batch_size_inference: params.batch_size_inference,
                loader_mode: params.loader_mode.clone(),
                stream_mode: params.stream_mode,
            },
            xy_splitter: columns.clone(),
            reader_single: columns,
            loader: LoaderConfig {
                dataset_params: DatasetParams {
                    h_pad: params.h_pad,
                    w_pad: params.w_pad,
                    h: params.image_h,
                    w: params.image_w,
                    pad_method: params.pad_method.clone(),
                },
                loader_params: LoaderParams {
                    training: DataLoaderParams {
                        batch_size: params.batch_size_train,
                        shuffle: true,
                        num_workers: params.num_workers,
                        pin_memory: params.pin_memory,
                    },
                    inference: DataLoaderParams {
                        batch_size: params.batch_size_inference,
                        shuffle: false,
                        num_workers: params.num_workers,
                        pin_memory: params.pin_memory,
                    },
                },
            },
            unet: UnetConfig {
                architecture_config: ArchitectureConfig {
                    model_params: ModelParams {
                        n_filters: params.n_filters,
                        conv_kernel: params.conv_kernel,
                        pool_kernel: params.pool_kernel,
                        pool_stride: params.pool_stride,
                        repeat_blocks: params.repeat_blocks,
                        batch_norm: params.use_batch_norm,
                        dropout: params.dropout_conv,
                        in_channels: params.image_channels,
                        out_channels: params.channels_per_output,
                        nr_outputs: params.nr_unet_outputs,
                        encoder: params.encoder.clone(),
                    },
                    optimizer_params: OptimizerParams { lr: params.lr },
                    regularizer_params: RegularizerParams {
                        regularize: true,
                        weight_decay_conv2d: params.l2_reg_conv,
                    },
                    weights_init: WeightsInit {
                        function: "he".to_string(),
                    },
                    loss_weights: LossWeights {
                        bce_mask: params.bce_mask,
                        dice_mask: params.dice_mask,
                    },
                    weighted_cross_entropy: WeightedCrossEntropy {
                        w0: params.w0,
                        sigma: params.sigma,
                        imsize: img_h_w,
                    },
                    dice: DiceParams {
                        smooth: params.dice_smooth,
                        dice_activation: params.dice_activation.clone(),
                    },
                },
                training_config: TrainingConfig {
                    epochs: params.epochs_nr,
                },
                callbacks_config: CallbacksConfig {
                    model_checkpoint: ModelCheckpointConfig {
                        filepath: checkpoint_filepath(&params.experiment_dir),
                        epoch_every: 1,
                        minimize,
                    },
                    exp_lr_scheduler: ExpLrSchedulerConfig {
                        gamma: params.gamma,
                        epoch_every: 1,
                    },
                    plateau_lr_scheduler: PlateauLrSchedulerConfig {
                        lr_factor: params.lr_factor,
                        lr_patience: params.lr_patience,
                        epoch_every: 1,
                    },
                    training_monitor: MonitorCadence {
                        batch_every: 1,
                        epoch_every: 1,
                    },
                    experiment_timing: MonitorCadence {
                        batch_every: 10,
                        epoch_every: 1,
                    },
                    validation_monitor: ValidationMonitorConfig {
                        epoch_every: 1,
                        data_dir: params.data_dir.clone(),
                        validate_with_map: params.validate_with_map,
                        small_annotations_size: params.small_annotations_size,
                    },
                    experiment_monitor: ExperimentMonitorConfig {
                        model_name: "unet".to_string(),
                        image_nr: 16,
                        image_resize: 0.2,
                        outputs_to_plot: params.unet_outputs_to_plot.clone(),
                    },
                    early_stopping: EarlyStoppingConfig {
                        patience: params.patience,
                        minimize,
                    },
                },
            },
            tta_generator: TtaGeneratorConfig {
                flip_ud: true,
                flip_lr: true,
                rotation: true,
                color_shift_runs: false,
            },
            tta_aggregator: TtaAggregatorConfig {
                method: params.tta_aggregation_method.clone(),
                num_threads: params.num_threads,
            },
            postprocessor: PostprocessorConfig {
                mask_dilation: MaskDilationConfig {
                    dilate_selem_size: params.dilate_selem_size,
                },
                mask_erosion: MaskErosionConfig {
                    erode_selem_size: params.erode_selem_size,
                },
                prediction_crop: PredictionCropConfig {
                    h_crop: params.crop_image_h,
                    w_crop: params.crop_image_w,
                },
                scoring_model: params.scoring_model.clone(),
                lightgbm: LightGbmConfig {
                    model_params: LightGbmModelParams {
                        learning_rate: params.lgbm__learning_rate,
                        boosting_type: "gbdt".to_string(),
                        objective: "regression".to_string(),
                        metric: "regression_l2".to_string(),
                        sub_feature: 1.0,
                        num_leaves: params.lgbm__num_leaves,
                        min_data: params.lgbm__min_data,
                        max_depth: params.lgbm__max_depth,
                        num_threads: params.num_threads,
                    },
                    training_params: LightGbmTrainingParams {
                        number_boosting_rounds: params.lgbm__number_of_trees,
                        early_stopping_rounds: params.lgbm__early_stopping,
                    },
                    train_size: params.lgbm__train_size,
                    target: params.lgbm__target.clone(),
                },
                random_forest: RandomForestConfig {
                    train_size: params.lgbm__train_size,
                    target: params.lgbm__target.clone(),
                    model_params: RandomForestModelParams {
                        n_estimators: params.rf__n_estimators,
                        criterion: params.rf__criterion.clone(),
                        max_depth: params.rf__max_depth,
                        min_samples_split: params.rf__min_samples_split,
                        min_samples_leaf: params.rf__min_samples_leaf,
                        max_features: params.rf__max_features,
                        max_leaf_nodes: params.rf__max_leaf_nodes,
                        n_jobs: params.rf__n_jobs,
                        verbose: params.rf__verbose,
                    },
                },
                nms: NmsConfig {
                    iou_threshold: params.nms__iou_threshold,
                    num_threads: params.num_threads,
                },
            },
        }
    }
}

/// Loads a parameter file and composes the configuration tree
///
/// # Errors
///
/// Returns an error if the file cannot be read, is missing a required
/// parameter, or fails validation. Composition itself cannot fail.
pub fn load(path: impl AsRef<Path>) -> Result<SolutionConfig> {
    let params = read_params(path)?;
    Ok(SolutionConfig::compose(&params))
}

/// Composes the configuration tree from the process environment
///
/// This is the startup entry point: it checks the required environment
/// variables, reads the parameter file named by `CONFIG_PATH`, and
/// composes the tree. Call it once at process start and pass the returned
/// value by reference to every stage that needs it.
///
/// # Errors
///
/// Returns an error naming the missing environment variable or parameter;
/// a partially-built configuration is never returned.
pub fn init_from_env() -> Result<SolutionConfig> {
    check_env_vars()?;
    let path = config_path_from_env()?;
    tracing::info!(config_path = %path.display(), "Composing pipeline configuration");
    load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::params::sample_parameters;

    #[test]
    fn test_compose_is_deterministic() {
        let params = sample_parameters();
        assert_eq!(
            SolutionConfig::compose(&params),
            SolutionConfig::compose(&params)
        );
    }

    #[test]
    fn test_checkpoint_filepath_join() {
        let path = checkpoint_filepath(Path::new("/tmp/exp"));
        assert_eq!(
            path,
            Path::new("/tmp/exp")
                .join("checkpoints")
                .join("unet")
                .join("best.torch")
        );
    }

    #[test]
    fn test_dimension_pair_is_height_then_width() {
        let mut params = sample_parameters();
        params.image_h = 300;
        params.image_w = 400;
        let config = SolutionConfig::compose(&params);
        assert_eq!(config.execution.img_h_w, (300, 400));
        assert_eq!(
            config
                .unet
                .architecture_config
                .weighted_cross_entropy
                .imsize,
            (300, 400)
        );
        assert_eq!(config.loader.dataset_params.h, 300);
        assert_eq!(config.loader.dataset_params.w, 400);
    }

    #[test]
    fn test_minimize_is_negated_validate_with_map() {
        for validate_with_map in [true, false] {
            let mut params = sample_parameters();
            params.validate_with_map = validate_with_map;
            let config = SolutionConfig::compose(&params);
            let callbacks = &config.unet.callbacks_config;
            assert_eq!(callbacks.model_checkpoint.minimize, !validate_with_map);
            assert_eq!(callbacks.early_stopping.minimize, !validate_with_map);
            assert_eq!(
                callbacks.validation_monitor.validate_with_map,
                validate_with_map
            );
        }
    }

    #[test]
    fn test_shared_parameters_are_consistent_across_stages() {
        let mut params = sample_parameters();
        params.num_threads = 13;
        params.num_workers = 7;
        let config = SolutionConfig::compose(&params);

        assert_eq!(config.tta_aggregator.num_threads, 13);
        assert_eq!(config.postprocessor.lightgbm.model_params.num_threads, 13);
        assert_eq!(config.postprocessor.nms.num_threads, 13);

        assert_eq!(config.execution.num_workers, 7);
        assert_eq!(config.loader.loader_params.training.num_workers, 7);
        assert_eq!(config.loader.loader_params.inference.num_workers, 7);

        assert_eq!(
            config.postprocessor.lightgbm.train_size,
            config.postprocessor.random_forest.train_size
        );
        assert_eq!(
            config.postprocessor.lightgbm.target,
            config.postprocessor.random_forest.target
        );
    }

    #[test]
    fn test_splitter_and_reader_share_columns() {
        let config = SolutionConfig::compose(&sample_parameters());
        assert_eq!(config.xy_splitter, config.reader_single);
        assert_eq!(config.xy_splitter.x_columns, vec!["file_path_image"]);
    }

    #[test]
    fn test_fixed_constants_in_tree() {
        let config = SolutionConfig::compose(&sample_parameters());
        assert_eq!(config.execution.num_classes, 2);
        assert_eq!(
            config.unet.architecture_config.weights_init.function,
            "he"
        );
        let lgbm = &config.postprocessor.lightgbm.model_params;
        assert_eq!(lgbm.boosting_type, "gbdt");
        assert_eq!(lgbm.objective, "regression");
        assert_eq!(lgbm.metric, "regression_l2");
        assert_eq!(lgbm.sub_feature, 1.0);
        assert!(config.tta_generator.flip_ud);
        assert!(config.tta_generator.flip_lr);
        assert!(config.tta_generator.rotation);
        assert!(!config.tta_generator.color_shift_runs);
    }

    #[test]
    fn test_batch_sizes_flow_to_their_loader_phases() {
        let mut params = sample_parameters();
        params.batch_size_train = 24;
        params.batch_size_inference = 48;
        let config = SolutionConfig::compose(&params);
        assert_eq!(config.loader.loader_params.training.batch_size, 24);
        assert_eq!(config.loader.loader_params.inference.batch_size, 48);
        assert_eq!(config.execution.batch_size_train, 24);
        assert_eq!(config.execution.batch_size_inference, 48);
        assert!(config.loader.loader_params.training.shuffle);
        assert!(!config.loader.loader_params.inference.shuffle);
    }
}
