//! Reference ("model") cycle construction from many standardized curves.

use tracing::{debug, instrument};

use crate::curve::{ReferenceCurve, StandardizedCurve, normal_positions};
use crate::error::ReferenceError;
use crate::interp::interp;

/// A curve sampled at explicit positions of the normalized cycle axis.
///
/// Values may be NaN where the curve has no data.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedCurve {
    /// Positions in `[0, 1]`, strictly increasing.
    pub positions: Vec<f64>,
    /// Values at `positions`.
    pub values: Vec<f64>,
}

impl PositionedCurve {
    /// Pair `values` with evenly spaced positions.
    #[must_use]
    pub fn uniform(values: Vec<f64>) -> Self {
        Self {
            positions: normal_positions(values.len()),
            values,
        }
    }
}

impl From<&StandardizedCurve> for PositionedCurve {
    fn from(curve: &StandardizedCurve) -> Self {
        Self::uniform(curve.values().to_vec())
    }
}

/// Element-wise mean of one user's curves, ignoring NaN.
///
/// Positions where every curve is NaN stay NaN. Curves of different lengths
/// are averaged over the shortest common prefix.
#[must_use]
pub fn user_average(curves: &[StandardizedCurve]) -> PositionedCurve {
    let len = curves.iter().map(StandardizedCurve::len).min().unwrap_or(0);
    let values = (0..len)
        .map(|k| {
            let (sum, n) = curves
                .iter()
                .map(|c| c[k])
                .filter(|v| !v.is_nan())
                .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
            if n == 0 { f64::NAN } else { sum / n as f64 }
        })
        .collect();
    PositionedCurve::uniform(values)
}

/// Builds a [`ReferenceCurve`] on a uniform grid by averaging interpolated inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceBuilder {
    grid_len: usize,
}

impl ReferenceBuilder {
    /// Create a builder for a reference of `grid_len` points.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ReferenceError::InvalidGrid`] | `grid_len < 2` |
    pub fn new(grid_len: usize) -> Result<Self, ReferenceError> {
        if grid_len < 2 {
            return Err(ReferenceError::InvalidGrid { len: grid_len });
        }
        Ok(Self { grid_len })
    }

    /// Number of reference points.
    #[must_use]
    pub fn grid_len(&self) -> usize {
        self.grid_len
    }

    /// Combine `curves` into one reference.
    ///
    /// Each curve's finite points are interpolated onto the grid within the
    /// range they cover; each grid value is the mean over covering curves.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ReferenceError::NoCurves`] | `curves` is empty |
    /// | [`ReferenceError::LengthMismatch`] | A curve's positions and values differ in length |
    /// | [`ReferenceError::EmptyCurve`] | A curve has no finite point |
    /// | [`ReferenceError::UnsortedPositions`] | A curve's finite positions are not strictly increasing |
    /// | [`ReferenceError::Uncovered`] | A grid position is covered by no curve |
    #[instrument(skip(self, curves), fields(n = curves.len(), grid = self.grid_len))]
    pub fn build(&self, curves: &[PositionedCurve]) -> Result<ReferenceCurve, ReferenceError> {
        if curves.is_empty() {
            return Err(ReferenceError::NoCurves);
        }
        let grid = normal_positions(self.grid_len);
        let mut sums = vec![0.0; self.grid_len];
        let mut counts = vec![0usize; self.grid_len];

        for (index, curve) in curves.iter().enumerate() {
            let (xs, ys) = finite_points(index, curve)?;
            let (lo, hi) = (xs[0], xs[xs.len() - 1]);
            for (g, &x) in grid.iter().enumerate() {
                if x >= lo - GRID_TOLERANCE && x <= hi + GRID_TOLERANCE {
                    sums[g] += interp(x, &xs, &ys);
                    counts[g] += 1;
                }
            }
        }

        if let Some(position) = counts.iter().position(|&n| n == 0) {
            return Err(ReferenceError::Uncovered { position });
        }
        let values: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(s, &n)| s / n as f64)
            .collect();
        debug!(min_coverage = ?counts.iter().min(), "built reference curve");
        Ok(ReferenceCurve::with_positions(values, grid)?)
    }
}

const GRID_TOLERANCE: f64 = 1e-12;

fn finite_points(
    index: usize,
    curve: &PositionedCurve,
) -> Result<(Vec<f64>, Vec<f64>), ReferenceError> {
    if curve.positions.len() != curve.values.len() {
        return Err(ReferenceError::LengthMismatch {
            index,
            positions: curve.positions.len(),
            values: curve.values.len(),
        });
    }
    let (xs, ys): (Vec<f64>, Vec<f64>) = curve
        .positions
        .iter()
        .zip(&curve.values)
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .map(|(&x, &y)| (x, y))
        .unzip();
    if xs.is_empty() {
        return Err(ReferenceError::EmptyCurve { index });
    }
    if let Some(k) = xs.windows(2).position(|w| w[1] <= w[0]) {
        return Err(ReferenceError::UnsortedPositions {
            index,
            point: k + 1,
        });
    }
    Ok((xs, ys))
}
