//! L2-penalised logistic regression trained by batch gradient descent.

use tracing::{debug, instrument};

use crate::classifier::{Classifier, check_features, check_labels};
use crate::error::LearnError;

/// Logistic regression classifier.
///
/// Features are standardised with the training means and standard deviations
/// before fitting; the same transform is applied at prediction time.
///
/// # Defaults
///
/// | Parameter       | Default |
/// |-----------------|---------|
/// | `learning_rate` | 0.1     |
/// | `max_iter`      | 2000    |
/// | `l2`            | 0.01    |
/// | `tol`           | 1e-6    |
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    learning_rate: f64,
    max_iter: usize,
    l2: f64,
    tol: f64,
    model: Option<Fitted>,
}

#[derive(Debug, Clone)]
struct Fitted {
    means: Vec<f64>,
    scales: Vec<f64>,
    weights: Vec<f64>,
    bias: f64,
}

impl Fitted {
    fn logit(&self, row: &[f64]) -> f64 {
        row.iter()
            .zip(&self.means)
            .zip(&self.scales)
            .zip(&self.weights)
            .map(|(((x, m), s), w)| w * (x - m) / s)
            .sum::<f64>()
            + self.bias
    }
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iter: 2000,
            l2: 0.01,
            tol: 1e-6,
            model: None,
        }
    }
}

impl LogisticRegression {
    /// Create an unfitted model with default hyperparameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gradient step size.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::InvalidHyperparameter`] unless `rate` is finite and positive.
    pub fn with_learning_rate(mut self, rate: f64) -> Result<Self, LearnError> {
        if !(rate.is_finite() && rate > 0.0) {
            return Err(LearnError::InvalidHyperparameter {
                name: "learning_rate",
                expected: "finite and > 0",
                value: rate,
            });
        }
        self.learning_rate = rate;
        Ok(self)
    }

    /// Set the maximum number of gradient steps.
    #[must_use]
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the L2 penalty strength.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::InvalidHyperparameter`] unless `l2` is finite and non-negative.
    pub fn with_l2(mut self, l2: f64) -> Result<Self, LearnError> {
        if !(l2.is_finite() && l2 >= 0.0) {
            return Err(LearnError::InvalidHyperparameter {
                name: "l2",
                expected: "finite and >= 0",
                value: l2,
            });
        }
        self.l2 = l2;
        Ok(self)
    }

    /// Set the gradient-norm convergence tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`LearnError::InvalidHyperparameter`] unless `tol` is finite and non-negative.
    pub fn with_tol(mut self, tol: f64) -> Result<Self, LearnError> {
        if !(tol.is_finite() && tol >= 0.0) {
            return Err(LearnError::InvalidHyperparameter {
                name: "tol",
                expected: "finite and >= 0",
                value: tol,
            });
        }
        self.tol = tol;
        Ok(self)
    }

    /// Fitted coefficients on the standardised scale, if trained.
    #[must_use]
    pub fn coefficients(&self) -> Option<(&[f64], f64)> {
        self.model.as_ref().map(|m| (m.weights.as_slice(), m.bias))
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &'static str {
        "logistic_regression"
    }

    #[instrument(skip_all, fields(n_samples = features.len()))]
    fn fit(&mut self, features: &[Vec<f64>], labels: &[usize]) -> Result<(), LearnError> {
        let n_features = check_features(features)?;
        check_labels(labels, features.len())?;
        let n = features.len() as f64;

        let mut means = vec![0.0; n_features];
        for row in features {
            for (m, x) in means.iter_mut().zip(row) {
                *m += x / n;
            }
        }
        let mut scales = vec![0.0; n_features];
        for row in features {
            for ((s, x), m) in scales.iter_mut().zip(row).zip(&means) {
                *s += (x - m).powi(2) / n;
            }
        }
        for s in &mut scales {
            *s = if *s > 0.0 { s.sqrt() } else { 1.0 };
        }

        let z: Vec<Vec<f64>> = features
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&means)
                    .zip(&scales)
                    .map(|((x, m), s)| (x - m) / s)
                    .collect()
            })
            .collect();

        let mut weights = vec![0.0; n_features];
        let mut bias = 0.0;
        let mut grad_w = vec![0.0; n_features];
        let mut iterations = 0;

        for _ in 0..self.max_iter {
            iterations += 1;
            grad_w.iter_mut().for_each(|g| *g = 0.0);
            let mut grad_b = 0.0;
            for (row, &y) in z.iter().zip(labels) {
                let logit: f64 = row.iter().zip(&weights).map(|(x, w)| x * w).sum::<f64>() + bias;
                let err = sigmoid(logit) - y as f64;
                for (g, x) in grad_w.iter_mut().zip(row) {
                    *g += err * x / n;
                }
                grad_b += err / n;
            }
            for (g, w) in grad_w.iter_mut().zip(&weights) {
                *g += self.l2 * w;
            }

            let norm = (grad_w.iter().map(|g| g * g).sum::<f64>() + grad_b * grad_b).sqrt();
            for (w, g) in weights.iter_mut().zip(&grad_w) {
                *w -= self.learning_rate * g;
            }
            bias -= self.learning_rate * grad_b;
            if norm < self.tol {
                break;
            }
        }
        debug!(iterations, bias, "logistic regression fitted");

        self.model = Some(Fitted {
            means,
            scales,
            weights,
            bias,
        });
        Ok(())
    }

    fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, LearnError> {
        let model = self.model.as_ref().ok_or(LearnError::NotFitted)?;
        let expected = model.weights.len();
        features
            .iter()
            .enumerate()
            .map(|(sample_index, row)| {
                if row.len() != expected {
                    return Err(LearnError::FeatureCountMismatch {
                        expected,
                        got: row.len(),
                        sample_index,
                    });
                }
                Ok(sigmoid(model.logit(row)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            features.push(vec![i as f64 * 0.1, 5.0]);
            labels.push(0);
            features.push(vec![10.0 + i as f64 * 0.1, 5.0]);
            labels.push(1);
        }
        (features, labels)
    }

    #[test]
    fn separable_data_classified() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&features, &labels).unwrap();
        assert_eq!(model.predict(&features).unwrap(), labels);
    }

    #[test]
    fn probabilities_ordered_by_feature() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&features, &labels).unwrap();
        let p = model
            .predict_proba(&[vec![-5.0, 5.0], vec![5.0, 5.0], vec![15.0, 5.0]])
            .unwrap();
        assert!(p.iter().all(|&v| (0.0..=1.0).contains(&v)));
        assert!(p[0] < p[1] && p[1] < p[2]);
    }

    #[test]
    fn constant_feature_gets_zero_weight() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&features, &labels).unwrap();
        let (weights, _) = model.coefficients().unwrap();
        assert_eq!(weights[1], 0.0);
        assert!(weights[0] > 0.0);
    }

    #[test]
    fn predict_before_fit() {
        let model = LogisticRegression::new();
        assert!(matches!(
            model.predict_proba(&[vec![1.0]]),
            Err(LearnError::NotFitted)
        ));
    }

    #[test]
    fn wrong_width_at_prediction() {
        let (features, labels) = separable();
        let mut model = LogisticRegression::new();
        model.fit(&features, &labels).unwrap();
        assert!(matches!(
            model.predict_proba(&[vec![1.0]]),
            Err(LearnError::FeatureCountMismatch { expected: 2, got: 1, .. })
        ));
    }

    #[test]
    fn invalid_hyperparameters() {
        assert!(LogisticRegression::new().with_learning_rate(0.0).is_err());
        assert!(LogisticRegression::new().with_l2(-1.0).is_err());
        assert!(LogisticRegression::new().with_tol(f64::NAN).is_err());
    }

    #[test]
    fn sigmoid_is_stable_at_extremes() {
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(1000.0), 1.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-15);
    }
}
