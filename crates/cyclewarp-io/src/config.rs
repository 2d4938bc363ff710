//! Pipeline configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use cyclewarp_dtw::{DEFAULT_CURVE_LENGTH, DEFAULT_SMOOTHING_WINDOW, Preprocessor};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::IoError;

/// Settings shared by every subcommand.
///
/// Loaded from JSON via [`PipelineConfig::load`]; unknown keys are rejected.
/// Every field is optional in the file.
///
/// # Defaults
///
/// | Field                  | Default              |
/// |------------------------|----------------------|
/// | `input_features_path`  | `features.csv`       |
/// | `output_results_path`  | `results`            |
/// | `model_cycle_path`     | `model_cycle.json`   |
/// | `k_fold_count`         | 10                   |
/// | `seed`                 | 42                   |
/// | `curve_length`         | 51                   |
/// | `smoothing_window`     | 3                    |
/// | `cycles_per_user`      | 3                    |
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Feature table produced by `extract` and consumed by `evaluate`.
    #[serde(default = "default_input_features_path")]
    pub input_features_path: PathBuf,
    /// Directory for JSON result artifacts.
    #[serde(default = "default_output_results_path")]
    pub output_results_path: PathBuf,
    /// Persisted reference curve.
    #[serde(default = "default_model_cycle_path")]
    pub model_cycle_path: PathBuf,
    /// Number of cross-validation folds.
    #[serde(default = "default_k_fold_count")]
    pub k_fold_count: usize,
    /// Seed of every random choice in the pipeline.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Points per standardized curve.
    #[serde(default = "default_curve_length")]
    pub curve_length: usize,
    /// Moving-average window, in days.
    #[serde(default = "default_smoothing_window")]
    pub smoothing_window: usize,
    /// Cycles sampled per user before evaluation.
    #[serde(default = "default_cycles_per_user")]
    pub cycles_per_user: usize,
}

fn default_input_features_path() -> PathBuf {
    PathBuf::from("features.csv")
}

fn default_output_results_path() -> PathBuf {
    PathBuf::from("results")
}

fn default_model_cycle_path() -> PathBuf {
    PathBuf::from("model_cycle.json")
}

const fn default_k_fold_count() -> usize {
    10
}

const fn default_seed() -> u64 {
    42
}

const fn default_curve_length() -> usize {
    DEFAULT_CURVE_LENGTH
}

const fn default_smoothing_window() -> usize {
    DEFAULT_SMOOTHING_WINDOW
}

const fn default_cycles_per_user() -> usize {
    3
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_features_path: default_input_features_path(),
            output_results_path: default_output_results_path(),
            model_cycle_path: default_model_cycle_path(),
            k_fold_count: default_k_fold_count(),
            seed: default_seed(),
            curve_length: default_curve_length(),
            smoothing_window: default_smoothing_window(),
            cycles_per_user: default_cycles_per_user(),
        }
    }
}

impl PipelineConfig {
    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
    /// | [`IoError::Json`] | Malformed JSON or unknown key |
    /// | [`IoError::InvalidConfig`] | A value is out of range |
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, IoError> {
        let text = fs::read_to_string(path).map_err(|e| IoError::FileNotFound {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| IoError::Json {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), IoError> {
        let invalid = |field, reason: &str| IoError::InvalidConfig {
            field,
            reason: reason.to_string(),
        };
        if self.k_fold_count < 2 {
            return Err(invalid("k_fold_count", "must be at least 2"));
        }
        if self.curve_length < 2 {
            return Err(invalid("curve_length", "must be at least 2"));
        }
        if self.smoothing_window == 0 || self.smoothing_window % 2 == 0 {
            return Err(invalid("smoothing_window", "must be odd and positive"));
        }
        if self.cycles_per_user == 0 {
            return Err(invalid("cycles_per_user", "must be at least 1"));
        }
        Ok(())
    }

    /// Preprocessor configured with this curve length and smoothing window.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidConfig`] if either value is rejected.
    pub fn preprocessor(&self) -> Result<Preprocessor, IoError> {
        Preprocessor::new(self.curve_length)
            .and_then(|p| p.with_smoothing_window(self.smoothing_window))
            .map_err(|e| IoError::InvalidConfig {
                field: "preprocessor",
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn write(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn empty_object_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = PipelineConfig::load(&write(&dir, "{}")).unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.curve_length, 51);
        assert_eq!(config.k_fold_count, 10);
    }

    #[test]
    fn recognised_keys_override() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            r#"{"input_features_path":"f.csv","output_results_path":"out","k_fold_count":5,"model_cycle_path":"m.json","seed":7}"#,
        );
        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.input_features_path, PathBuf::from("f.csv"));
        assert_eq!(config.output_results_path, PathBuf::from("out"));
        assert_eq!(config.model_cycle_path, PathBuf::from("m.json"));
        assert_eq!(config.k_fold_count, 5);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn unknown_key_rejected() {
        let dir = TempDir::new().unwrap();
        let err = PipelineConfig::load(&write(&dir, r#"{"k_folds":5}"#)).unwrap_err();
        assert!(matches!(err, IoError::Json { .. }));
    }

    #[test]
    fn out_of_range_values_rejected() {
        let dir = TempDir::new().unwrap();
        let err = PipelineConfig::load(&write(&dir, r#"{"k_fold_count":1}"#)).unwrap_err();
        assert!(matches!(err, IoError::InvalidConfig { field: "k_fold_count", .. }));

        let err = PipelineConfig::load(&write(&dir, r#"{"smoothing_window":4}"#)).unwrap_err();
        assert!(matches!(err, IoError::InvalidConfig { field: "smoothing_window", .. }));
    }

    #[test]
    fn preprocessor_uses_configured_values() {
        let config = PipelineConfig {
            curve_length: 21,
            smoothing_window: 5,
            ..PipelineConfig::default()
        };
        let p = config.preprocessor().unwrap();
        assert_eq!(p.curve_length(), 21);
        assert_eq!(p.smoothing_window(), 5);
    }
}
