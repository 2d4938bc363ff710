//! JSON result writer for extraction and evaluation outputs.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use cyclewarp_features::{BatchSummary, UserId};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Cross-validation outcome handed to [`ResultWriter::write_evaluation`].
///
/// Holds primitives only, so the writer does not depend on the learning crate.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport<'a> {
    /// Classifier name.
    pub model: &'a str,
    /// Seed used for fold shuffling.
    pub seed: u64,
    /// Number of evaluated cycles.
    pub n_samples: usize,
    /// Number of positive-label cycles.
    pub n_positive: usize,
    /// Names of the feature columns used.
    pub feature_names: &'a [&'a str],
    /// Per-fold accuracy.
    pub fold_accuracies: &'a [f64],
    /// Per-fold ROC AUC.
    pub fold_aucs: &'a [f64],
    /// Mean and population standard deviation of fold accuracy.
    pub accuracy: (f64, f64),
    /// Mean and population standard deviation of fold AUC.
    pub auc: (f64, f64),
}

/// Writes pipeline results to JSON files under one directory.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are `extraction.json` and `evaluation.json`.
pub struct ResultWriter {
    output_dir: PathBuf,
}

impl ResultWriter {
    /// Create a new writer targeting the given directory.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display()))]
    pub fn new(output_dir: &Path) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    /// Write the extraction summary to `extraction.json`.
    ///
    /// Returns the rendered JSON document.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Json`] | Serialization fails |
    /// | [`IoError::WriteFile`] | File cannot be written |
    #[instrument(skip_all)]
    pub fn write_extraction(
        &self,
        summary: &BatchSummary,
        model_users_skipped: usize,
        sampled: usize,
        dropped_users: &[UserId],
    ) -> Result<String, IoError> {
        let excluded: BTreeMap<&str, usize> = summary
            .excluded
            .iter()
            .map(|(kind, &n)| (kind.as_str(), n))
            .collect();
        let artifact = ExtractionArtifact {
            processed: summary.processed,
            succeeded: summary.succeeded,
            excluded_total: summary.excluded_total(),
            excluded,
            model_users_skipped,
            sampled,
            dropped_users: dropped_users.iter().map(UserId::as_str).collect(),
        };
        let json = self.write_json("extraction.json", &artifact)?;
        info!(processed = summary.processed, "extraction summary written");
        Ok(json)
    }

    /// Write cross-validation results to `evaluation.json`.
    ///
    /// Returns the rendered JSON document.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`IoError::Json`] | Serialization fails |
    /// | [`IoError::WriteFile`] | File cannot be written |
    #[instrument(skip_all, fields(model = report.model))]
    pub fn write_evaluation(&self, report: &EvaluationReport<'_>) -> Result<String, IoError> {
        let folds = report
            .fold_accuracies
            .iter()
            .zip(report.fold_aucs)
            .enumerate()
            .map(|(fold, (&accuracy, &auc))| FoldEntry {
                fold,
                accuracy,
                auc,
            })
            .collect();
        let artifact = EvaluateArtifact {
            model: report.model,
            seed: report.seed,
            n_samples: report.n_samples,
            n_positive: report.n_positive,
            n_folds: report.fold_accuracies.len(),
            features: report.feature_names,
            cv_accuracy_mean: report.accuracy.0,
            cv_accuracy_std: report.accuracy.1,
            cv_auc_mean: report.auc.0,
            cv_auc_std: report.auc.1,
            folds,
        };
        let json = self.write_json("evaluation.json", &artifact)?;
        info!("evaluation result written");
        Ok(json)
    }

    fn write_json<T: Serialize>(&self, name: &str, artifact: &T) -> Result<String, IoError> {
        let path = self.output_dir.join(name);
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Json {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        debug!(path = %path.display(), "artifact written");
        Ok(json)
    }
}

// --- Shadow structs for JSON serialization ---

#[derive(Serialize)]
struct ExtractionArtifact<'a> {
    processed: usize,
    succeeded: usize,
    excluded_total: usize,
    excluded: BTreeMap<&'a str, usize>,
    model_users_skipped: usize,
    sampled: usize,
    dropped_users: Vec<&'a str>,
}

#[derive(Serialize)]
struct EvaluateArtifact<'a> {
    model: &'a str,
    seed: u64,
    n_samples: usize,
    n_positive: usize,
    n_folds: usize,
    features: &'a [&'a str],
    cv_accuracy_mean: f64,
    cv_accuracy_std: f64,
    cv_auc_mean: f64,
    cv_auc_std: f64,
    folds: Vec<FoldEntry>,
}

#[derive(Serialize)]
struct FoldEntry {
    fold: usize,
    accuracy: f64,
    auc: f64,
}

#[cfg(test)]
mod tests {
    use cyclewarp_features::FailureKind;
    use tempfile::TempDir;

    use super::*;

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn write_extraction_structure() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path()).unwrap();
        let mut summary = BatchSummary {
            processed: 10,
            succeeded: 7,
            ..BatchSummary::default()
        };
        summary.excluded.insert(FailureKind::Preprocess, 2);
        summary.excluded.insert(FailureKind::LandmarkResolution, 1);

        let rendered = writer
            .write_extraction(&summary, 4, 6, &[UserId::new("short")])
            .unwrap();

        let content = read_json(&dir.path().join("extraction.json"));
        assert_eq!(content, serde_json::from_str::<serde_json::Value>(&rendered).unwrap());
        assert_eq!(content["processed"], 10);
        assert_eq!(content["succeeded"], 7);
        assert_eq!(content["excluded_total"], 3);
        assert_eq!(content["excluded"]["preprocess"], 2);
        assert_eq!(content["excluded"]["landmark_resolution"], 1);
        assert_eq!(content["model_users_skipped"], 4);
        assert_eq!(content["dropped_users"][0], "short");
    }

    #[test]
    fn write_evaluation_structure() {
        let dir = TempDir::new().unwrap();
        let writer = ResultWriter::new(dir.path()).unwrap();
        let report = EvaluationReport {
            model: "logistic_regression",
            seed: 42,
            n_samples: 30,
            n_positive: 12,
            feature_names: &["nadir_day", "peak_day"],
            fold_accuracies: &[0.5, 1.0],
            fold_aucs: &[0.25, 0.75],
            accuracy: (0.75, 0.25),
            auc: (0.5, 0.25),
        };
        writer.write_evaluation(&report).unwrap();

        let content = read_json(&dir.path().join("evaluation.json"));
        assert_eq!(content["model"], "logistic_regression");
        assert_eq!(content["n_folds"], 2);
        assert_eq!(content["cv_accuracy_mean"], 0.75);
        assert_eq!(content["cv_auc_std"], 0.25);
        assert_eq!(content["features"].as_array().unwrap().len(), 2);
        let folds = content["folds"].as_array().unwrap();
        assert_eq!(folds[1]["fold"], 1);
        assert_eq!(folds[1]["auc"], 0.75);
    }

    #[test]
    fn creates_nested_output_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested").join("deep");
        let writer = ResultWriter::new(&nested).unwrap();
        writer
            .write_extraction(&BatchSummary::default(), 0, 0, &[])
            .unwrap();
        assert!(nested.join("extraction.json").exists());
    }
}
