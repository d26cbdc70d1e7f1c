//! Integration tests for parameter reading and configuration composition
//!
//! Note: Tests that modify environment variables should be run with
//! --test-threads=1 to avoid interference between tests.

use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use strata::config::{check_env_vars, init_from_env, load, read_params, STAGE_KEYS};
use tempfile::NamedTempFile;
use test_case::test_case;

// Mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const SAMPLE_PARAMS: &str = r#"
[parameters]
experiment_dir = "/tmp/exp"
data_dir = "/data/ships"
load_in_memory = false
num_workers = 6
num_threads = 12
image_h = 256
image_w = 320
image_channels = 3
batch_size_train = 32
batch_size_inference = 64
loader_mode = "resize"
stream_mode = false
h_pad = 10
w_pad = 20
pad_method = "edge"
pin_memory = true
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
lr = 0.0001
l2_reg_conv = 0.0001
bce_mask = 1.0
dice_mask = 1.0
w0 = 50.0
sigma = 10.0
dice_smooth = 1.0
dice_activation = "softmax"
epochs_nr = 100
gamma = 0.99
lr_factor = 0.3
lr_patience = 30
patience = 30
validate_with_map = true
small_annotations_size = 14
unet_outputs_to_plot = ["mask"]
tta_aggregation_method = "mean"
dilate_selem_size = 2
erode_selem_size = 1
crop_image_h = 300
crop_image_w = 300
scoring_model = "lgbm"
lgbm__learning_rate = 0.001
lgbm__num_leaves = 10
lgbm__min_data = 10
lgbm__max_depth = -1
lgbm__number_of_trees = 500
lgbm__early_stopping = 50
lgbm__train_size = 0.7
lgbm__target = "iou"
rf__n_estimators = 500
rf__criterion = "mse"
rf__max_depth = 10
rf__min_samples_split = 2
rf__min_samples_leaf = 1
rf__max_features = 0.5
rf__n_jobs = -1
rf__verbose = 0
nms__iou_threshold = 0.5
"#;

fn write_params(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Sample parameters with one key line removed
fn params_without(key: &str) -> String {
    SAMPLE_PARAMS
        .lines()
        .filter(|line| !line.starts_with(&format!("{key} =")))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_tree_has_exactly_the_documented_stage_keys() {
    let file = write_params(SAMPLE_PARAMS);
    let tree = load(file.path()).expect("Failed to compose");

    let value = serde_json::to_value(&tree).unwrap();
    let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
    keys.sort_unstable();
    let mut expected: Vec<String> = STAGE_KEYS.iter().map(|k| k.to_string()).collect();
    expected.sort_unstable();
    assert_eq!(keys, expected);
}

#[test]
fn test_composition_is_deterministic() {
    let file = write_params(SAMPLE_PARAMS);
    let first = load(file.path()).unwrap();
    let second = load(file.path()).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[test]
fn test_dimension_pairs_are_height_then_width() {
    let file = write_params(SAMPLE_PARAMS);
    let tree = load(file.path()).unwrap();

    assert_eq!(tree.execution.img_h_w, (256, 320));
    assert_eq!(
        tree.unet.architecture_config.weighted_cross_entropy.imsize,
        (256, 320)
    );
    assert_eq!(tree.loader.dataset_params.h, 256);
    assert_eq!(tree.loader.dataset_params.w, 320);
}

#[test]
fn test_shared_parameters_are_value_equal_across_stages() {
    let file = write_params(SAMPLE_PARAMS);
    let tree = load(file.path()).unwrap();

    // num_threads: TTA aggregation, LightGBM, NMS
    assert_eq!(tree.tta_aggregator.num_threads, 12);
    assert_eq!(tree.postprocessor.lightgbm.model_params.num_threads, 12);
    assert_eq!(tree.postprocessor.nms.num_threads, 12);

    // num_workers: execution and both loader phases
    assert_eq!(tree.execution.num_workers, 6);
    assert_eq!(tree.loader.loader_params.training.num_workers, 6);
    assert_eq!(tree.loader.loader_params.inference.num_workers, 6);

    // train split and target: both scoring models
    assert_eq!(tree.postprocessor.lightgbm.train_size, 0.7);
    assert_eq!(tree.postprocessor.random_forest.train_size, 0.7);
    assert_eq!(tree.postprocessor.lightgbm.target, "iou");
    assert_eq!(tree.postprocessor.random_forest.target, "iou");
}

#[test_case(true; "validate with map")]
#[test_case(false; "validate with loss")]
fn test_minimize_flags_negate_validate_with_map(validate_with_map: bool) {
    let content = SAMPLE_PARAMS.replace(
        "validate_with_map = true",
        &format!("validate_with_map = {validate_with_map}"),
    );
    let file = write_params(&content);
    let tree = load(file.path()).unwrap();

    let callbacks = &tree.unet.callbacks_config;
    assert_eq!(callbacks.model_checkpoint.minimize, !validate_with_map);
    assert_eq!(callbacks.early_stopping.minimize, !validate_with_map);
    assert_eq!(
        callbacks.validation_monitor.validate_with_map,
        validate_with_map
    );
}

#[test]
fn test_missing_key_fails_naming_it() {
    let file = write_params(&params_without("image_h"));
    let err = load(file.path()).expect_err("missing image_h must fail");
    assert!(
        err.to_string().contains("image_h"),
        "error must name the missing key, got: {err}"
    );
}

#[test]
fn test_missing_key_is_not_silently_defaulted() {
    let file = write_params(&params_without("num_threads"));
    assert!(load(file.path()).is_err());
}

#[test]
fn test_checkpoint_path_is_platform_correct_join() {
    let file = write_params(SAMPLE_PARAMS);
    let tree = load(file.path()).unwrap();

    let expected = Path::new("/tmp/exp")
        .join("checkpoints")
        .join("unet")
        .join("best.torch");
    assert_eq!(
        tree.unet.callbacks_config.model_checkpoint.filepath,
        expected
    );
}

#[test]
fn test_cache_dir_and_exp_root_share_experiment_dir() {
    let file = write_params(SAMPLE_PARAMS);
    let tree = load(file.path()).unwrap();
    assert_eq!(tree.env.cache_dirpath, tree.execution.exp_root);
}

#[test]
fn test_env_var_substitution_in_parameter_file() {
    let _guard = ENV_MUTEX.lock().unwrap();
    std::env::set_var("STRATA_TEST_EXP_ROOT", "/scratch/exp42");

    let content = SAMPLE_PARAMS.replace(
        "experiment_dir = \"/tmp/exp\"",
        "experiment_dir = \"${STRATA_TEST_EXP_ROOT}\"",
    );
    let file = write_params(&content);
    let tree = load(file.path()).unwrap();
    assert_eq!(tree.execution.exp_root, Path::new("/scratch/exp42"));

    std::env::remove_var("STRATA_TEST_EXP_ROOT");
}

#[test]
fn test_init_from_env_composes_from_config_path() {
    let _guard = ENV_MUTEX.lock().unwrap();
    let file = write_params(SAMPLE_PARAMS);
    std::env::set_var("CONFIG_PATH", file.path());

    let tree = init_from_env().expect("Failed to compose from env");
    assert_eq!(tree.execution.img_h_w, (256, 320));

    std::env::remove_var("CONFIG_PATH");
}

#[test]
fn test_init_from_env_fails_without_config_path() {
    let _guard = ENV_MUTEX.lock().unwrap();
    std::env::remove_var("CONFIG_PATH");

    let err = init_from_env().expect_err("must fail without CONFIG_PATH");
    assert!(err.to_string().contains("CONFIG_PATH"));
    assert!(check_env_vars().is_err());
}

#[test]
fn test_validation_error_propagates_through_load() {
    let content = SAMPLE_PARAMS.replace(
        "scoring_model = \"lgbm\"",
        "scoring_model = \"xgboost\"",
    );
    let file = write_params(&content);
    let err = load(file.path()).expect_err("unknown scoring model must fail");
    assert!(err.to_string().contains("scoring_model"));
}

#[test]
fn test_flat_parameter_reader_exposes_parameters_table() {
    let file = write_params(SAMPLE_PARAMS);
    let params = read_params(file.path()).unwrap();
    assert_eq!(params.encoder, "ResNet101");
    assert_eq!(params.unet_outputs_to_plot, vec!["mask".to_string()]);
    assert_eq!(params.rf__max_leaf_nodes, None);
}
