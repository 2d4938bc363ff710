//! Stratified k-fold splitting.

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::error::LearnError;

/// One train/test partition of the sample indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    /// Indices used for training, ascending.
    pub train: Vec<usize>,
    /// Held-out indices, ascending.
    pub test: Vec<usize>,
}

/// Stratified k-fold splitter over class labels `0..n_classes`.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    n_folds: usize,
}

impl StratifiedKFold {
    /// Create a splitter with `n_folds` folds.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, LearnError> {
        if n_folds < 2 {
            return Err(LearnError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds })
    }

    /// Number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Assign every sample a fold.
    ///
    /// Groups samples by class, shuffles within each class, then
    /// round-robins across folds so each fold gets approximately
    /// equal representation of each class.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`LearnError::EmptyDataset`] | `labels` is empty |
    /// | [`LearnError::TooFewSamplesForFolds`] | A present class has fewer samples than folds |
    pub fn assign<R: Rng + ?Sized>(
        &self,
        labels: &[usize],
        rng: &mut R,
    ) -> Result<Vec<usize>, LearnError> {
        let n_classes = labels.iter().max().ok_or(LearnError::EmptyDataset)? + 1;

        let mut class_indices: Vec<Vec<usize>> = vec![vec![]; n_classes];
        for (i, &label) in labels.iter().enumerate() {
            class_indices[label].push(i);
        }

        for (class, indices) in class_indices.iter().enumerate() {
            if !indices.is_empty() && indices.len() < self.n_folds {
                return Err(LearnError::TooFewSamplesForFolds {
                    class,
                    count: indices.len(),
                    n_folds: self.n_folds,
                });
            }
        }

        let mut fold_assignments = vec![0usize; labels.len()];
        for indices in &mut class_indices {
            indices.shuffle(rng);
            for (j, &idx) in indices.iter().enumerate() {
                fold_assignments[idx] = j % self.n_folds;
            }
        }
        Ok(fold_assignments)
    }

    /// Split into [`Fold`]s, one per fold index.
    ///
    /// # Errors
    ///
    /// Same as [`assign`](Self::assign).
    pub fn split<R: Rng + ?Sized>(
        &self,
        labels: &[usize],
        rng: &mut R,
    ) -> Result<Vec<Fold>, LearnError> {
        let assignments = self.assign(labels, rng)?;
        let folds: Vec<Fold> = (0..self.n_folds)
            .map(|fold| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..labels.len()).partition(|&i| assignments[i] == fold);
                Fold { train, test }
            })
            .collect();
        debug!(
            sizes = ?folds.iter().map(|f| f.test.len()).collect::<Vec<_>>(),
            "folds assigned"
        );
        Ok(folds)
    }
}
