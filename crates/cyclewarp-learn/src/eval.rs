//! Stratified k-fold cross-validation of a binary classifier.

use rand::Rng;
use rayon::prelude::*;
use tracing::{info, instrument};

use crate::classifier::{Classifier, check_features, check_labels};
use crate::error::LearnError;
use crate::folds::{Fold, StratifiedKFold};
use crate::metrics::{accuracy, mean_std, roc_auc};

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`].
#[derive(Debug, Clone, Copy)]
pub struct CrossValidation {
    splitter: StratifiedKFold,
}

/// Results of stratified k-fold cross-validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidationResult {
    /// Classifier name.
    pub model: &'static str,
    /// Accuracy for each fold.
    pub fold_accuracies: Vec<f64>,
    /// ROC AUC for each fold.
    pub fold_aucs: Vec<f64>,
    /// Mean accuracy across folds.
    pub mean_accuracy: f64,
    /// Population standard deviation of fold accuracies.
    pub std_accuracy: f64,
    /// Mean AUC across folds.
    pub mean_auc: f64,
    /// Population standard deviation of fold AUCs.
    pub std_auc: f64,
    /// Number of folds.
    pub n_folds: usize,
    /// Total number of samples.
    pub n_samples: usize,
    /// Number of features.
    pub n_features: usize,
}

struct FoldScore {
    model: &'static str,
    accuracy: f64,
    auc: f64,
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, LearnError> {
        Ok(Self {
            splitter: StratifiedKFold::new(n_folds)?,
        })
    }

    /// Number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.splitter.n_folds()
    }

    /// Run stratified k-fold cross-validation.
    ///
    /// Folds are drawn from `rng`; each fold trains a fresh classifier from
    /// `factory` on the remaining folds and scores the held-out fold. Folds
    /// train in parallel.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`LearnError::EmptyDataset`] | Zero samples |
    /// | [`LearnError::SingleClass`] | Only one label present |
    /// | [`LearnError::TooFewSamplesForFolds`] | A class has fewer samples than folds |
    /// | Other learn errors | Malformed data or training failure |
    #[instrument(skip_all, fields(n_folds = self.n_folds(), n_samples = features.len()))]
    pub fn evaluate<C, F, R>(
        &self,
        factory: F,
        features: &[Vec<f64>],
        labels: &[usize],
        rng: &mut R,
    ) -> Result<CrossValidationResult, LearnError>
    where
        C: Classifier,
        F: Fn() -> C + Sync,
        R: Rng + ?Sized,
    {
        let n_features = check_features(features)?;
        check_labels(labels, features.len())?;
        let class = labels[0];
        if labels.iter().all(|&l| l == class) {
            return Err(LearnError::SingleClass {
                class,
                n_samples: labels.len(),
            });
        }

        let folds = self.splitter.split(labels, rng)?;
        let scores: Vec<FoldScore> = folds
            .par_iter()
            .enumerate()
            .map(|(fold, split)| score_fold(&factory, fold, split, features, labels))
            .collect::<Result<_, _>>()?;

        let fold_accuracies: Vec<f64> = scores.iter().map(|s| s.accuracy).collect();
        let fold_aucs: Vec<f64> = scores.iter().map(|s| s.auc).collect();
        let (mean_accuracy, std_accuracy) = mean_std(&fold_accuracies);
        let (mean_auc, std_auc) = mean_std(&fold_aucs);

        info!(
            mean_accuracy,
            std_accuracy,
            mean_auc,
            std_auc,
            "cross-validation complete"
        );

        Ok(CrossValidationResult {
            model: scores.first().map_or("", |s| s.model),
            fold_accuracies,
            fold_aucs,
            mean_accuracy,
            std_accuracy,
            mean_auc,
            std_auc,
            n_folds: self.n_folds(),
            n_samples: features.len(),
            n_features,
        })
    }
}

fn score_fold<C, F>(
    factory: &F,
    fold: usize,
    split: &Fold,
    features: &[Vec<f64>],
    labels: &[usize],
) -> Result<FoldScore, LearnError>
where
    C: Classifier,
    F: Fn() -> C,
{
    let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<usize>) {
        idx.iter()
            .map(|&i| (features[i].clone(), labels[i]))
            .unzip()
    };
    let (train_features, train_labels) = pick(&split.train);
    let (test_features, test_labels) = pick(&split.test);

    let mut model = factory();
    model.fit(&train_features, &train_labels)?;
    let proba = model.predict_proba(&test_features)?;
    let predicted = model.predict(&test_features)?;

    let accuracy = accuracy(&predicted, &test_labels);
    // Stratification puts every present class in every fold.
    let auc = roc_auc(&proba, &test_labels).ok_or(LearnError::SingleClass {
        class: test_labels.first().copied().unwrap_or(0),
        n_samples: test_labels.len(),
    })?;

    info!(fold, accuracy, auc, "fold completed");
    Ok(FoldScore {
        model: model.name(),
        accuracy,
        auc,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::logistic::LogisticRegression;

    fn make_separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..30 {
            features.push(vec![i as f64 * 0.1, 0.5]);
            labels.push(0);
        }
        for i in 0..20 {
            features.push(vec![10.0 + i as f64 * 0.1, 0.5]);
            labels.push(1);
        }
        (features, labels)
    }

    #[test]
    fn five_fold_separable() {
        let (features, labels) = make_separable_data();
        let cv = CrossValidation::new(5).unwrap();
        let result = cv
            .evaluate(
                LogisticRegression::new,
                &features,
                &labels,
                &mut ChaCha8Rng::seed_from_u64(42),
            )
            .unwrap();

        assert_eq!(result.model, "logistic_regression");
        assert_eq!(result.fold_accuracies.len(), 5);
        assert_eq!(result.fold_aucs.len(), 5);
        assert_eq!(result.n_samples, 50);
        assert_eq!(result.n_features, 2);
        assert_eq!(result.mean_accuracy, 1.0);
        assert_eq!(result.mean_auc, 1.0);
        assert_eq!(result.std_auc, 0.0);
    }

    #[test]
    fn same_seed_same_result() {
        let (features, mut labels) = make_separable_data();
        labels.swap(3, 40);
        let cv = CrossValidation::new(3).unwrap();
        let run = |seed| {
            cv.evaluate(
                LogisticRegression::new,
                &features,
                &labels,
                &mut ChaCha8Rng::seed_from_u64(seed),
            )
            .unwrap()
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn single_class_rejected() {
        let features = vec![vec![1.0]; 6];
        let labels = vec![1; 6];
        let err = CrossValidation::new(2)
            .unwrap()
            .evaluate(
                LogisticRegression::new,
                &features,
                &labels,
                &mut ChaCha8Rng::seed_from_u64(0),
            )
            .unwrap_err();
        assert!(matches!(err, LearnError::SingleClass { class: 1, n_samples: 6 }));
    }

    #[test]
    fn empty_dataset_rejected() {
        let err = CrossValidation::new(2)
            .unwrap()
            .evaluate(
                LogisticRegression::new,
                &[],
                &[],
                &mut ChaCha8Rng::seed_from_u64(0),
            )
            .unwrap_err();
        assert!(matches!(err, LearnError::EmptyDataset));
    }
}
