//! The fit/predict seam every classifier implements.

use crate::error::LearnError;

/// Decision threshold applied by [`Classifier::predict`].
pub const DECISION_THRESHOLD: f64 = 0.5;

/// A binary classifier over dense feature rows.
///
/// Labels are `0` (negative) or `1` (positive). Implementations must be
/// [`Send`] so cross-validation folds can train in parallel.
pub trait Classifier: Send {
    /// Short stable name used in result artifacts.
    fn name(&self) -> &'static str;

    /// Train on `features[sample][feature]` with matching `labels`.
    ///
    /// # Errors
    ///
    /// Returns a [`LearnError`] if the training data is malformed.
    fn fit(&mut self, features: &[Vec<f64>], labels: &[usize]) -> Result<(), LearnError>;

    /// Positive-class probability for each row.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::NotFitted`] before [`fit`](Self::fit), or a
    /// shape error if a row has the wrong number of features.
    fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, LearnError>;

    /// Hard labels at [`DECISION_THRESHOLD`].
    ///
    /// # Errors
    ///
    /// Same as [`predict_proba`](Self::predict_proba).
    fn predict(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, LearnError> {
        Ok(self
            .predict_proba(features)?
            .into_iter()
            .map(|p| usize::from(p >= DECISION_THRESHOLD))
            .collect())
    }
}

/// Validate a feature matrix and return its column count.
pub(crate) fn check_features(features: &[Vec<f64>]) -> Result<usize, LearnError> {
    let first = features.first().ok_or(LearnError::EmptyDataset)?;
    let expected = first.len();
    if expected == 0 {
        return Err(LearnError::ZeroFeatures);
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != expected {
            return Err(LearnError::FeatureCountMismatch {
                expected,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(LearnError::NonFiniteFeature {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(expected)
}

/// Validate binary labels against `n_samples` rows.
pub(crate) fn check_labels(labels: &[usize], n_samples: usize) -> Result<(), LearnError> {
    if labels.len() != n_samples {
        return Err(LearnError::LabelCountMismatch {
            features: n_samples,
            labels: labels.len(),
        });
    }
    if let Some((sample_index, &label)) = labels.iter().enumerate().find(|&(_, &l)| l > 1) {
        return Err(LearnError::InvalidLabel {
            label,
            sample_index,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Constant(f64);

    impl Classifier for Constant {
        fn name(&self) -> &'static str {
            "constant"
        }

        fn fit(&mut self, _: &[Vec<f64>], _: &[usize]) -> Result<(), LearnError> {
            Ok(())
        }

        fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, LearnError> {
            Ok(vec![self.0; features.len()])
        }
    }

    #[test]
    fn predict_thresholds_at_one_half() {
        let rows = vec![vec![0.0]; 2];
        assert_eq!(Constant(0.5).predict(&rows).unwrap(), vec![1, 1]);
        assert_eq!(Constant(0.49).predict(&rows).unwrap(), vec![0, 0]);
    }

    #[test]
    fn ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![1.0]];
        assert!(matches!(
            check_features(&rows),
            Err(LearnError::FeatureCountMismatch { expected: 2, got: 1, sample_index: 1 })
        ));
    }

    #[test]
    fn nan_feature_rejected() {
        let rows = vec![vec![1.0, f64::NAN]];
        assert!(matches!(
            check_features(&rows),
            Err(LearnError::NonFiniteFeature { sample_index: 0, feature_index: 1 })
        ));
    }

    #[test]
    fn non_binary_label_rejected() {
        assert!(matches!(
            check_labels(&[0, 1, 2], 3),
            Err(LearnError::InvalidLabel { label: 2, sample_index: 2 })
        ));
        assert!(matches!(
            check_labels(&[0, 1], 3),
            Err(LearnError::LabelCountMismatch { .. })
        ));
    }
}
