//! Fixed pipeline constants
//!
//! These values are part of the pipeline design, not experiment parameters:
//! they are defined once here and consumed directly by name by downstream
//! stages. None of them may be overridden from the parameter file.

/// Metadata columns carrying per-image dimensions.
pub const SIZE_COLUMNS: &[&str] = &["height", "width"];

/// Input columns consumed by the splitter and readers.
pub const X_COLUMNS: &[&str] = &["file_path_image"];

/// Target columns consumed by the splitter and readers.
pub const Y_COLUMNS: &[&str] = &["file_path_mask_eroded_0_dilated_0"];

/// Target columns consumed by the scoring stage.
pub const Y_COLUMNS_SCORING: &[&str] = &["ImageId"];

/// Random seed shared by every stochastic stage for reproducibility.
pub const SEED: u64 = 1234;

/// Category identifiers; `None` is the background class.
pub const CATEGORY_IDS: &[Option<u32>] = &[None, Some(100)];

/// Threshold layers per category: 1 means a single 0.5 threshold, 19 means
/// 0.05..0.95 and is only meaningful with a second-layer model.
pub const CATEGORY_LAYERS: &[usize] = &[1, 1];

/// ImageNet channel means used for input normalization.
pub const MEAN: [f64; 3] = [0.485, 0.456, 0.406];

/// ImageNet channel standard deviations used for input normalization.
pub const STD: [f64; 3] = [0.229, 0.224, 0.225];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tables_align() {
        assert_eq!(CATEGORY_IDS.len(), CATEGORY_LAYERS.len());
    }

    #[test]
    fn test_normalization_stats_are_per_channel() {
        assert_eq!(MEAN.len(), 3);
        assert_eq!(STD.len(), 3);
    }
}
