//! Landmark and warp-asymmetry features of aligned temperature cycles.
//!
//! Maps the reference curve's nadir and peak through a warp path onto each
//! cycle, derives cost, path-length and step-count asymmetry descriptors,
//! and runs the whole per-cycle pipeline over a batch in parallel.

mod asymmetry;
mod batch;
mod error;
mod extract;
mod key;
mod landmark;
mod sample;

pub use asymmetry::{AsymmetryFeatures, compute_asymmetry};
pub use batch::{BatchSummary, FailureKind, extract_batch};
pub use error::{AsymmetryError, CycleError, Landmark, LandmarkError};
pub use extract::{CycleFeatures, FeatureExtractor};
pub use key::{CycleKey, RawCycle, UserId};
pub use landmark::{Landmarks, ReferenceAnchors, extract_landmarks, reference_anchors};
pub use sample::{SampledCycles, sample_cycles_per_user};
