//! Warp-asymmetry descriptors of an alignment.

use cyclewarp_dtw::{CostMatrix, WarpPath};
use tracing::trace;

use crate::error::AsymmetryError;

/// Scalar descriptors of how an alignment warps between its start and end anchors.
///
/// Each value is divided by the reference curve's maximum position index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsymmetryFeatures {
    /// Cumulative cost accrued between the anchors.
    pub cost_with_diff: f64,
    /// Euclidean length of the path between the anchors.
    pub path_length_with_diff: f64,
    /// Number of path steps between the anchors.
    pub pos_count_with_diff: f64,
}

/// Compute warp-asymmetry features for one alignment.
///
/// The start anchor is the last step pinned to the cycle's first valid index
/// (the end of the opening multi-warp). The end anchor is the first step that
/// reaches the cycle's last valid index. When the cycle has a single valid
/// index the anchors cross: the step count is negative and the path length 0.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`AsymmetryError::ZeroNormaliser`] | `reference_max_pos == 0` |
/// | [`AsymmetryError::NonFinite`] | A feature evaluates to NaN or infinity |
pub fn compute_asymmetry(
    path: &WarpPath,
    costs: &CostMatrix,
    reference_max_pos: usize,
) -> Result<AsymmetryFeatures, AsymmetryError> {
    if reference_max_pos == 0 {
        return Err(AsymmetryError::ZeroNormaliser);
    }
    let steps = path.steps();
    let start_cycle = path.first().cycle;
    let end_cycle = path.last().cycle;

    // Steps at a fixed cycle index are contiguous and ordered by reference index.
    let index_least = steps
        .iter()
        .rposition(|s| s.cycle == start_cycle)
        .unwrap_or(0);
    let index_max = steps
        .iter()
        .position(|s| s.cycle == end_cycle)
        .unwrap_or(steps.len() - 1);
    let (least, maximum) = (steps[index_least], steps[index_max]);
    trace!(index_least, index_max, ?least, ?maximum, "asymmetry anchors");

    let norm = reference_max_pos as f64;
    let features = AsymmetryFeatures {
        cost_with_diff: (costs.at_step(maximum) - costs.at_step(least)) / norm,
        path_length_with_diff: path.segment_length(index_least, index_max) / norm,
        pos_count_with_diff: (index_max as f64 - index_least as f64) / norm,
    };

    for (feature, value) in [
        ("cost_with_diff", features.cost_with_diff),
        ("path_length_with_diff", features.path_length_with_diff),
        ("pos_count_with_diff", features.pos_count_with_diff),
    ] {
        if !value.is_finite() {
            return Err(AsymmetryError::NonFinite { feature, value });
        }
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use cyclewarp_dtw::{Aligner, ReferenceCurve, StandardizedCurve};

    use super::*;

    fn align(r: Vec<f64>, c: Vec<f64>) -> (WarpPath, CostMatrix, usize) {
        let reference = ReferenceCurve::new(r).unwrap();
        let cycle = StandardizedCurve::new(c).unwrap();
        let (path, costs) = Aligner::new().align(&reference, &cycle).unwrap().into_parts();
        (path, costs, reference.last_index())
    }

    #[test]
    fn round_trip_values() {
        let (path, costs, max_pos) = align(vec![1.0, 2.0, 3.0, 2.0, 1.0], vec![1.0, 1.0, 3.0, 1.0]);
        let f = compute_asymmetry(&path, &costs, max_pos).unwrap();
        assert!((f.pos_count_with_diff - 1.0).abs() < 1e-12);
        let expected_len = (3.0 * 2.0_f64.sqrt() + 1.0) / 4.0;
        assert!((f.path_length_with_diff - expected_len).abs() < 1e-12);
        assert!((f.cost_with_diff - 0.5).abs() < 1e-12);
    }

    #[test]
    fn opening_multi_warp_moves_start_anchor() {
        // Reference dwells on cycle index 0 for three steps before moving on.
        let (path, costs, max_pos) = align(vec![0.0, 0.0, 0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]);
        let coords: Vec<(usize, usize)> =
            path.steps().iter().map(|s| (s.reference, s.cycle)).collect();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (3, 1), (4, 2)]);
        let f = compute_asymmetry(&path, &costs, max_pos).unwrap();
        assert!((f.pos_count_with_diff - 0.5).abs() < 1e-12);
        assert!((f.path_length_with_diff - 2.0 * 2.0_f64.sqrt() / 4.0).abs() < 1e-12);
        assert_eq!(f.cost_with_diff, 0.0);
    }

    #[test]
    fn single_point_cycle_has_zero_path_length() {
        let (path, costs, max_pos) = align(vec![0.0, 1.0, 2.0], vec![f64::NAN, 1.0, f64::NAN]);
        let f = compute_asymmetry(&path, &costs, max_pos).unwrap();
        assert_eq!(f.path_length_with_diff, 0.0);
        assert!((f.pos_count_with_diff + 1.0).abs() < 1e-12);
        assert!(f.cost_with_diff.is_finite());
    }

    #[test]
    fn scaling_costs_scales_only_cost_feature() {
        let (path, costs, max_pos) = align(
            vec![0.2, -0.5, 0.1, 1.3, 0.8, -0.2],
            vec![f64::NAN, 0.0, -0.9, 0.4, 1.1, f64::NAN],
        );
        let base = compute_asymmetry(&path, &costs, max_pos).unwrap();
        for k in [0.5, 2.0, 7.25] {
            let scaled = compute_asymmetry(&path, &costs.scaled(k), max_pos).unwrap();
            assert!((scaled.cost_with_diff - k * base.cost_with_diff).abs() < 1e-9);
            assert_eq!(scaled.pos_count_with_diff, base.pos_count_with_diff);
            assert_eq!(scaled.path_length_with_diff, base.path_length_with_diff);
        }
    }

    #[test]
    fn zero_normaliser_rejected() {
        let (path, costs, _) = align(vec![0.0, 1.0], vec![0.0, 1.0]);
        assert!(matches!(
            compute_asymmetry(&path, &costs, 0),
            Err(AsymmetryError::ZeroNormaliser)
        ));
    }
}
