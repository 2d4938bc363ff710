//! Accuracy regression tests for cyclewarp-learn.
//!
//! These tests verify that changes to the classifier or the fold logic do not
//! degrade cross-validated accuracy and AUC on a deterministic synthetic dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use cyclewarp_learn::{Classifier, CrossValidation, LogisticRegression, roc_auc};
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Helper: deterministic synthetic binary dataset
// ---------------------------------------------------------------------------

/// Generate a 200-sample, 6-feature binary dataset, 40% positive.
///
/// Features 0-1 are informative (class * 2.0 + noise in [0, 1]).
/// Features 2-5 are pure noise in [0, 1].
fn make_classification() -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut features = Vec::with_capacity(200);
    let mut labels = Vec::with_capacity(200);
    for i in 0..200 {
        let class = usize::from(i % 5 < 2);
        labels.push(class);
        let row: Vec<f64> = (0..6)
            .map(|f| {
                let base = if f < 2 { class as f64 * 2.0 } else { 0.0 };
                base + rng.r#gen::<f64>()
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

// ---------------------------------------------------------------------------
// a) cv_scores_above_threshold
// ---------------------------------------------------------------------------

#[test]
fn cv_scores_above_threshold() {
    let (features, labels) = make_classification();
    let cv = CrossValidation::new(10).unwrap();
    let result = cv
        .evaluate(
            LogisticRegression::new,
            &features,
            &labels,
            &mut ChaCha8Rng::seed_from_u64(42),
        )
        .unwrap();

    assert_eq!(result.fold_accuracies.len(), 10);
    assert!(
        result.mean_accuracy > 0.9,
        "cv mean_accuracy {} <= 0.9",
        result.mean_accuracy
    );
    assert!(result.mean_auc > 0.95, "cv mean_auc {} <= 0.95", result.mean_auc);
    assert!(result.std_accuracy >= 0.0 && result.std_auc >= 0.0);
}

// ---------------------------------------------------------------------------
// b) noise_only_auc_near_chance
// ---------------------------------------------------------------------------

#[test]
fn noise_only_auc_near_chance() {
    let (features, labels) = make_classification();
    let noise: Vec<Vec<f64>> = features.iter().map(|r| r[2..].to_vec()).collect();
    let result = CrossValidation::new(5)
        .unwrap()
        .evaluate(
            LogisticRegression::new,
            &noise,
            &labels,
            &mut ChaCha8Rng::seed_from_u64(3),
        )
        .unwrap();
    assert!(result.mean_auc < 0.75, "mean_auc {} on noise", result.mean_auc);
}

// ---------------------------------------------------------------------------
// c) in-sample fit
// ---------------------------------------------------------------------------

#[test]
fn in_sample_auc_matches_probability_ranking() {
    let (features, labels) = make_classification();
    let mut model = LogisticRegression::new();
    model.fit(&features, &labels).unwrap();
    let proba = model.predict_proba(&features).unwrap();
    let auc = roc_auc(&proba, &labels).unwrap();
    assert!(auc > 0.95, "auc = {auc}");
}

// ---------------------------------------------------------------------------
// d) properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, ..ProptestConfig::default() })]

    #[test]
    fn auc_is_complement_under_score_negation(
        scores in prop::collection::vec(-5.0f64..5.0, 4..40),
        seed in any::<u64>(),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut labels: Vec<usize> = scores.iter().map(|_| rng.gen_range(0..2)).collect();
        labels[0] = 0;
        labels[1] = 1;
        let auc = roc_auc(&scores, &labels).unwrap();
        let negated: Vec<f64> = scores.iter().map(|s| -s).collect();
        let flipped = roc_auc(&negated, &labels).unwrap();
        prop_assert!((0.0..=1.0).contains(&auc));
        prop_assert!((auc + flipped - 1.0).abs() < 1e-9);
    }
}
