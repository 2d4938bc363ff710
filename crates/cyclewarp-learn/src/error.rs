/// Errors from classifier training, prediction and cross-validation.
#[derive(Debug, thiserror::Error)]
pub enum LearnError {
    /// Returned when n_folds is less than 2.
    #[error("n_folds must be at least 2, got {n_folds}")]
    InvalidFoldCount {
        /// The invalid n_folds value provided.
        n_folds: usize,
    },

    /// Returned when a hyperparameter is out of range.
    #[error("{name} must be {expected}, got {value}")]
    InvalidHyperparameter {
        /// Hyperparameter name.
        name: &'static str,
        /// Accepted range.
        expected: &'static str,
        /// The invalid value.
        value: f64,
    },

    /// Returned when the dataset has zero samples.
    #[error("dataset has zero samples")]
    EmptyDataset,

    /// Returned when the dataset has zero feature columns.
    #[error("dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when features and labels differ in length.
    #[error("{features} feature rows but {labels} labels")]
    LabelCountMismatch {
        /// Number of feature rows.
        features: usize,
        /// Number of labels.
        labels: usize,
    },

    /// Returned when a sample has a different number of features than expected.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// The expected number of features.
        expected: usize,
        /// The actual number of features in the sample.
        got: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when a feature value is NaN or infinite.
    #[error("sample {sample_index}, feature {feature_index} is not finite")]
    NonFiniteFeature {
        /// The zero-based index of the offending sample.
        sample_index: usize,
        /// The zero-based feature column.
        feature_index: usize,
    },

    /// Returned when a label is neither 0 nor 1.
    #[error("sample {sample_index} has label {label}, expected 0 or 1")]
    InvalidLabel {
        /// The offending label.
        label: usize,
        /// The zero-based index of the offending sample.
        sample_index: usize,
    },

    /// Returned when every sample belongs to one class.
    #[error("all {n_samples} samples have label {class}; two classes are required")]
    SingleClass {
        /// The only class present.
        class: usize,
        /// Number of samples.
        n_samples: usize,
    },

    /// Returned when a class has fewer samples than the number of folds.
    #[error("class {class} has {count} samples, fewer than n_folds={n_folds}")]
    TooFewSamplesForFolds {
        /// The class with too few samples.
        class: usize,
        /// The number of samples in that class.
        count: usize,
        /// The requested number of folds.
        n_folds: usize,
    },

    /// Returned when predicting with a classifier that was never fitted.
    #[error("classifier has not been fitted")]
    NotFitted,
}
