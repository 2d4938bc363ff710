//! Error types for landmark, asymmetry and per-cycle feature extraction.

use cyclewarp_dtw::{DtwError, PreprocessError};

use crate::batch::FailureKind;
use crate::key::CycleKey;

/// Which landmark an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Landmark {
    /// Temperature trough.
    Nadir,
    /// Temperature high following the nadir.
    Peak,
}

impl std::fmt::Display for Landmark {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nadir => f.write_str("nadir"),
            Self::Peak => f.write_str("peak"),
        }
    }
}

/// Errors from mapping reference extremes through a warp path.
#[derive(Debug, thiserror::Error)]
pub enum LandmarkError {
    /// Returned when the cycle's valid span reaches past the reference.
    #[error("reference window [{first}, {last}] exceeds reference of length {reference_len}")]
    WindowOutOfRange {
        /// First valid cycle index.
        first: usize,
        /// Last valid cycle index.
        last: usize,
        /// Reference curve length.
        reference_len: usize,
    },

    /// Returned when no path step maps to the reference anchor.
    #[error("no warp step maps to {landmark} anchor at reference index {reference_index}")]
    AnchorNotOnPath {
        /// Which landmark.
        landmark: Landmark,
        /// Reference-side anchor index.
        reference_index: usize,
    },

    /// Returned when the resolved landmark temperature is NaN.
    #[error("{landmark} at day {day} (reference index {reference_index}) resolved to NaN")]
    Unresolved {
        /// Which landmark.
        landmark: Landmark,
        /// Cycle index the landmark resolved to.
        day: usize,
        /// Reference-side anchor index.
        reference_index: usize,
    },
}

/// Errors from the warp-asymmetry feature calculation.
#[derive(Debug, thiserror::Error)]
pub enum AsymmetryError {
    /// Returned when the normaliser is zero.
    #[error("reference max position must be positive")]
    ZeroNormaliser,

    /// Returned when a feature evaluates to a non-finite value.
    #[error("{feature} is not finite ({value})")]
    NonFinite {
        /// Feature name.
        feature: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// A per-cycle failure, tagged with the cycle it belongs to.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// Raw readings could not be turned into a standardized curve.
    #[error("preprocessing failed for {key}: {source}")]
    Preprocess {
        /// Failing cycle.
        key: CycleKey,
        /// Underlying error.
        source: PreprocessError,
    },

    /// The standardized curve had no valid sample.
    #[error("degenerate input for {key}: {source}")]
    DegenerateInput {
        /// Failing cycle.
        key: CycleKey,
        /// Underlying error.
        source: DtwError,
    },

    /// The recovered warp path broke an alignment invariant.
    #[error("alignment invariant violated for {key}: {source}")]
    AlignmentInvariant {
        /// Failing cycle.
        key: CycleKey,
        /// Underlying error.
        source: DtwError,
    },

    /// A landmark could not be resolved.
    #[error("landmark resolution failed for {key}: {source}")]
    LandmarkResolution {
        /// Failing cycle.
        key: CycleKey,
        /// The cycle's standardized curve values.
        values: Vec<f64>,
        /// The warp path as `(reference, cycle)` pairs.
        path: Vec<(usize, usize)>,
        /// Underlying error.
        source: LandmarkError,
    },

    /// Warp-asymmetry features could not be computed.
    #[error("asymmetry features failed for {key}: {source}")]
    Asymmetry {
        /// Failing cycle.
        key: CycleKey,
        /// Underlying error.
        source: AsymmetryError,
    },
}

impl CycleError {
    /// The cycle this failure belongs to.
    #[must_use]
    pub fn key(&self) -> &CycleKey {
        match self {
            Self::Preprocess { key, .. }
            | Self::DegenerateInput { key, .. }
            | Self::AlignmentInvariant { key, .. }
            | Self::LandmarkResolution { key, .. }
            | Self::Asymmetry { key, .. } => key,
        }
    }

    /// Category used in the batch summary.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Preprocess { .. } => FailureKind::Preprocess,
            Self::DegenerateInput { .. } => FailureKind::DegenerateInput,
            Self::AlignmentInvariant { .. } => FailureKind::AlignmentInvariant,
            Self::LandmarkResolution { .. } => FailureKind::LandmarkResolution,
            Self::Asymmetry { .. } => FailureKind::Asymmetry,
        }
    }
}
