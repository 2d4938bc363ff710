//! Join of feature rows with per-user labels.

use std::collections::BTreeSet;

use cyclewarp_features::{CycleKey, UserId};
use tracing::{info, instrument, warn};

use crate::domain::{FEATURE_COLUMNS, FeatureRow, Labels};

/// Labelled dataset: feature rows matched with their user's label.
///
/// Keys, features and labels are stored in parallel vectors;
/// `keys[i]` corresponds to `features[i]` and `labels[i]`.
#[derive(Debug)]
pub struct LabeledData {
    keys: Vec<CycleKey>,
    features: Vec<Vec<f64>>,
    labels: Vec<usize>,
    dropped_users: Vec<UserId>,
}

impl LabeledData {
    /// Return the cycle keys.
    #[must_use]
    pub fn keys(&self) -> &[CycleKey] {
        &self.keys
    }

    /// Return the feature matrix (row-major).
    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Return the binary labels.
    #[must_use]
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Return the feature column names.
    #[must_use]
    pub fn feature_names(&self) -> &'static [&'static str] {
        &FEATURE_COLUMNS
    }

    /// Users whose rows were dropped for lack of a label, sorted.
    #[must_use]
    pub fn dropped_users(&self) -> &[UserId] {
        &self.dropped_users
    }

    /// Return the number of samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.keys.len()
    }

    /// Number of samples labelled `1`.
    #[must_use]
    pub fn n_positive(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }
}

/// Attach each row's user label.
///
/// Rows whose user has no label are dropped with a warning; row order is
/// otherwise preserved.
#[instrument(skip_all, fields(n_rows = rows.len(), n_labels = labels.len()))]
pub fn join_labels(rows: &[FeatureRow], labels: &Labels) -> LabeledData {
    let mut keys = Vec::with_capacity(rows.len());
    let mut features = Vec::with_capacity(rows.len());
    let mut out_labels = Vec::with_capacity(rows.len());
    let mut dropped: BTreeSet<UserId> = BTreeSet::new();

    for row in rows {
        match labels.get(&row.key.user) {
            Some(label) => {
                keys.push(row.key.clone());
                features.push(row.values.to_vec());
                out_labels.push(label);
            }
            None => {
                dropped.insert(row.key.user.clone());
            }
        }
    }

    let n_dropped = rows.len() - keys.len();
    if n_dropped > 0 {
        warn!(
            n_dropped,
            users = ?dropped.iter().map(UserId::as_str).collect::<Vec<_>>(),
            "dropped cycles of unlabelled users"
        );
    }
    info!(n_joined = keys.len(), "label join complete");

    LabeledData {
        keys,
        features,
        labels: out_labels,
        dropped_users: dropped.into_iter().collect(),
    }
}
