//! Binary classification of cycle features: a fit/predict classifier seam,
//! logistic regression, stratified k-fold splitting and cross-validated
//! accuracy and ROC AUC.

mod classifier;
mod error;
mod eval;
mod folds;
mod logistic;
mod metrics;

pub use classifier::{Classifier, DECISION_THRESHOLD};
pub use error::LearnError;
pub use eval::{CrossValidation, CrossValidationResult};
pub use folds::{Fold, StratifiedKFold};
pub use logistic::LogisticRegression;
pub use metrics::{accuracy, mean_std, roc_auc};
