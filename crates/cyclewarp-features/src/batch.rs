//! Parallel batch extraction with a per-failure-kind summary.

use std::collections::BTreeMap;

use cyclewarp_dtw::{Preprocessor, ReferenceCurve};
use rayon::prelude::*;
use tracing::{error, info, instrument, warn};

use crate::error::CycleError;
use crate::extract::{CycleFeatures, FeatureExtractor};
use crate::key::RawCycle;

/// Category of a per-cycle failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FailureKind {
    /// Raw readings could not be preprocessed.
    Preprocess,
    /// Curve had no valid sample.
    DegenerateInput,
    /// Warp path broke an invariant.
    AlignmentInvariant,
    /// Nadir or peak could not be resolved.
    LandmarkResolution,
    /// Asymmetry features were not finite.
    Asymmetry,
}

impl FailureKind {
    /// Stable snake_case name used in summaries.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preprocess => "preprocess",
            Self::DegenerateInput => "degenerate_input",
            Self::AlignmentInvariant => "alignment_invariant",
            Self::LandmarkResolution => "landmark_resolution",
            Self::Asymmetry => "asymmetry",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counts reported at the end of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Cycles attempted.
    pub processed: usize,
    /// Cycles that produced features.
    pub succeeded: usize,
    /// Excluded cycles per failure kind.
    pub excluded: BTreeMap<FailureKind, usize>,
}

impl BatchSummary {
    /// Total number of excluded cycles.
    #[must_use]
    pub fn excluded_total(&self) -> usize {
        self.excluded.values().sum()
    }
}

/// Extract features for every cycle in parallel.
///
/// Failures are logged with the cycle's key and counted; they never abort the
/// batch. Successful records are returned in input order.
#[instrument(skip_all, fields(n = cycles.len()))]
pub fn extract_batch(
    cycles: &[RawCycle],
    reference: &ReferenceCurve,
    preprocessor: Preprocessor,
) -> (Vec<CycleFeatures>, BatchSummary) {
    let extractor = FeatureExtractor::new(reference, preprocessor);
    let results: Vec<Result<CycleFeatures, CycleError>> =
        cycles.par_iter().map(|c| extractor.extract(c)).collect();

    let mut summary = BatchSummary {
        processed: cycles.len(),
        ..BatchSummary::default()
    };
    let mut records = Vec::with_capacity(cycles.len());

    for result in results {
        match result {
            Ok(features) => records.push(features),
            Err(e) => {
                report(&e);
                *summary.excluded.entry(e.kind()).or_insert(0) += 1;
            }
        }
    }
    summary.succeeded = records.len();

    info!(
        processed = summary.processed,
        succeeded = summary.succeeded,
        excluded = summary.excluded_total(),
        "batch extraction complete"
    );
    (records, summary)
}

fn report(e: &CycleError) {
    let key = e.key();
    match e {
        CycleError::AlignmentInvariant { .. } => error!(
            user = %key.user,
            cycle = key.cycle,
            kind = %e.kind(),
            error = %e,
            "excluding cycle"
        ),
        CycleError::LandmarkResolution { values, path, .. } => warn!(
            user = %key.user,
            cycle = key.cycle,
            kind = %e.kind(),
            error = %e,
            ?values,
            ?path,
            "excluding cycle"
        ),
        _ => warn!(
            user = %key.user,
            cycle = key.cycle,
            kind = %e.kind(),
            error = %e,
            "excluding cycle"
        ),
    }
}
