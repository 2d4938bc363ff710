//! Per-cycle feature extraction: preprocess, align, landmarks, asymmetry.

use cyclewarp_dtw::{
    Aligner, DtwError, PreprocessError, Preprocessor, ReferenceCurve, StandardizedCurve,
};
use tracing::{debug, instrument};

use crate::asymmetry::{AsymmetryFeatures, compute_asymmetry};
use crate::error::CycleError;
use crate::key::{CycleKey, RawCycle};
use crate::landmark::{Landmarks, extract_landmarks};

/// The full feature record of one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleFeatures {
    /// Identifying key.
    pub key: CycleKey,
    /// Nadir and peak.
    pub landmarks: Landmarks,
    /// Warp-asymmetry descriptors.
    pub asymmetry: AsymmetryFeatures,
    /// Terminal cumulative alignment cost.
    pub dtw_distance: f64,
    /// Number of valid readings.
    pub data_length: usize,
    /// Cycle length in days.
    pub cycle_length: usize,
}

/// Turns cycles into [`CycleFeatures`] against one shared reference.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor<'a> {
    reference: &'a ReferenceCurve,
    preprocessor: Preprocessor,
    aligner: Aligner,
}

impl<'a> FeatureExtractor<'a> {
    /// Create an extractor over `reference`.
    #[must_use]
    pub fn new(reference: &'a ReferenceCurve, preprocessor: Preprocessor) -> Self {
        Self {
            reference,
            preprocessor,
            aligner: Aligner::new(),
        }
    }

    /// The shared reference curve.
    #[must_use]
    pub fn reference(&self) -> &ReferenceCurve {
        self.reference
    }

    /// Preprocess raw readings, then extract features from the resulting curve.
    ///
    /// # Errors
    ///
    /// Returns a [`CycleError`] tagged with `cycle.key` for any per-cycle failure.
    #[instrument(skip_all, fields(key = %cycle.key))]
    pub fn extract(&self, cycle: &RawCycle) -> Result<CycleFeatures, CycleError> {
        let pre = self
            .preprocessor
            .process(&cycle.readings, cycle.cycle_length)
            .map_err(|source| match source {
                PreprocessError::Curve(source @ DtwError::DegenerateInput { .. }) => {
                    CycleError::DegenerateInput {
                        key: cycle.key.clone(),
                        source,
                    }
                }
                source => CycleError::Preprocess {
                    key: cycle.key.clone(),
                    source,
                },
            })?;
        self.extract_curve(
            cycle.key.clone(),
            &pre.curve,
            pre.data_length,
            pre.cycle_length,
        )
    }

    /// Extract features from an already standardized curve.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`CycleError::AlignmentInvariant`] | The warp path fails validation |
    /// | [`CycleError::LandmarkResolution`] | Nadir or peak cannot be resolved |
    /// | [`CycleError::Asymmetry`] | An asymmetry feature is not finite |
    pub fn extract_curve(
        &self,
        key: CycleKey,
        curve: &StandardizedCurve,
        data_length: usize,
        cycle_length: usize,
    ) -> Result<CycleFeatures, CycleError> {
        let alignment = match self.aligner.align(self.reference, curve) {
            Ok(alignment) => alignment,
            Err(source @ DtwError::DegenerateInput { .. }) => {
                return Err(CycleError::DegenerateInput { key, source });
            }
            Err(source) => return Err(CycleError::AlignmentInvariant { key, source }),
        };

        let landmarks = match extract_landmarks(self.reference, alignment.path(), curve) {
            Ok(landmarks) => landmarks,
            Err(source) => {
                return Err(CycleError::LandmarkResolution {
                    key,
                    values: curve.values().to_vec(),
                    path: alignment
                        .path()
                        .steps()
                        .iter()
                        .map(|s| (s.reference, s.cycle))
                        .collect(),
                    source,
                });
            }
        };

        let asymmetry = compute_asymmetry(
            alignment.path(),
            alignment.costs(),
            self.reference.last_index(),
        )
        .map_err(|source| CycleError::Asymmetry {
            key: key.clone(),
            source,
        })?;

        debug!(
            nadir_day = landmarks.nadir_day,
            peak_day = landmarks.peak_day,
            distance = alignment.distance(),
            "extracted cycle features"
        );
        Ok(CycleFeatures {
            key,
            landmarks,
            asymmetry,
            dtw_distance: alignment.distance(),
            data_length,
            cycle_length,
        })
    }
}

#[cfg(test)]
mod tests {
    use cyclewarp_dtw::Reading;

    use super::*;
    use crate::key::UserId;

    fn key() -> CycleKey {
        CycleKey::new(UserId::new("u1"), 4)
    }

    #[test]
    fn extract_curve_round_trip() {
        let reference = ReferenceCurve::new(vec![1.0, 2.0, 3.0, 2.0, 1.0]).unwrap();
        let extractor = FeatureExtractor::new(&reference, Preprocessor::default());
        let curve = StandardizedCurve::new(vec![1.0, 1.0, 3.0, 1.0]).unwrap();
        let f = extractor.extract_curve(key(), &curve, 4, 4).unwrap();
        assert_eq!(f.landmarks.nadir_day, 0);
        assert_eq!(f.landmarks.peak_day, 2);
        assert_eq!(f.dtw_distance, 2.0);
        assert!((f.asymmetry.cost_with_diff - 0.5).abs() < 1e-12);
    }

    #[test]
    fn extract_from_readings() {
        let reference =
            ReferenceCurve::new((0..51).map(|i| if i < 25 { -1.0 } else { 1.0 }).collect())
                .unwrap();
        let extractor = FeatureExtractor::new(&reference, Preprocessor::default());
        let cycle = RawCycle {
            key: key(),
            cycle_length: None,
            readings: (0..28)
                .map(|d| Reading::new(d, if d < 15 { 36.4 } else { 36.9 }))
                .collect(),
        };
        let f = extractor.extract(&cycle).unwrap();
        assert_eq!(f.key, key());
        assert_eq!(f.data_length, 28);
        assert_eq!(f.cycle_length, 28);
        assert!(f.landmarks.nadir_day <= f.landmarks.peak_day);
        assert!(f.landmarks.low_to_high_temp() >= 0.0);
    }

    #[test]
    fn preprocess_failure_is_tagged() {
        let reference = ReferenceCurve::new(vec![0.0, 1.0]).unwrap();
        let extractor = FeatureExtractor::new(&reference, Preprocessor::default());
        let cycle = RawCycle {
            key: key(),
            cycle_length: None,
            readings: vec![Reading::new(0, 36.5)],
        };
        let err = extractor.extract(&cycle).unwrap_err();
        assert!(matches!(err, CycleError::Preprocess { .. }));
        assert_eq!(err.key(), &key());
    }

    #[test]
    fn window_outside_reference_is_landmark_failure() {
        let reference = ReferenceCurve::new(vec![0.0, 1.0, 0.0]).unwrap();
        let extractor = FeatureExtractor::new(&reference, Preprocessor::default());
        let curve = StandardizedCurve::new(vec![0.0, 1.0, 0.5, -1.0]).unwrap();
        let err = extractor.extract_curve(key(), &curve, 4, 4).unwrap_err();
        match err {
            CycleError::LandmarkResolution { values, path, .. } => {
                assert_eq!(values.len(), 4);
                assert_eq!(path.first(), Some(&(0, 0)));
            }
            other => panic!("expected LandmarkResolution, got {other:?}"),
        }
    }
}
