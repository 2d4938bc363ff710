//! DTW alignment of a cycle curve against the reference curve.

use tracing::{error, instrument, trace};

use crate::curve::{CurveSpan, ReferenceCurve, StandardizedCurve};
use crate::error::DtwError;
use crate::matrix::CostMatrix;
use crate::path::{WarpPath, WarpStep};

/// Result of aligning one cycle against the reference.
#[derive(Debug, Clone)]
pub struct Alignment {
    path: WarpPath,
    costs: CostMatrix,
}

impl Alignment {
    /// The optimal warp path.
    #[must_use]
    pub fn path(&self) -> &WarpPath {
        &self.path
    }

    /// The full accumulated cost matrix.
    #[must_use]
    pub fn costs(&self) -> &CostMatrix {
        &self.costs
    }

    /// Total alignment cost: the cumulative cost at the path's last step.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.costs.at_step(self.path.last())
    }

    /// Split into path and cost matrix.
    #[must_use]
    pub fn into_parts(self) -> (WarpPath, CostMatrix) {
        (self.path, self.costs)
    }
}

/// Unconstrained DTW aligner with absolute-difference local cost.
///
/// Only the cycle's valid span participates; NaN padding columns stay at
/// `f64::INFINITY` in the cost matrix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aligner {
    _private: (),
}

impl Aligner {
    /// Create an aligner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Align `cycle` against `reference`, returning the warp path and cost matrix.
    ///
    /// The recurrence is `C[i+1][j+1] = |r[i] - c[j]| + min(C[i][j], C[i][j+1], C[i+1][j])`
    /// over `j` in the cycle's valid span. Backtracking from `(n_ref - 1, span.last)`
    /// picks the predecessor with the smallest cumulative cost, preferring the
    /// diagonal, then the reference step `(i - 1, j)`, then the cycle step `(i, j - 1)`
    /// on exact ties.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::AlignmentInvariant`] | The traced path fails monotonicity, continuity or endpoint checks |
    #[instrument(skip(self, reference, cycle), fields(n_ref = reference.len(), n_cycle = cycle.len()))]
    pub fn align(
        &self,
        reference: &ReferenceCurve,
        cycle: &StandardizedCurve,
    ) -> Result<Alignment, DtwError> {
        let r = reference.values();
        let c = cycle.values();
        let span = cycle.span();
        let n = r.len();

        let mut costs = CostMatrix::filled(n + 1, c.len() + 1);
        costs.set(0, span.first(), 0.0);

        for (i, &ri) in r.iter().enumerate() {
            for j in span.first()..=span.last() {
                let d = (ri - c[j]).abs();
                let best = costs
                    .get(i, j)
                    .min(costs.get(i, j + 1))
                    .min(costs.get(i + 1, j));
                costs.set(i + 1, j + 1, d + best);
            }
        }

        let steps = backtrack(&costs, n, span);
        let path = WarpPath::from_steps(steps, n, span).inspect_err(|e| {
            error!(error = %e, "traced warp path failed validation");
        })?;
        trace!(steps = path.len(), "aligned cycle");

        Ok(Alignment { path, costs })
    }
}

/// Trace the optimal path from `(n - 1, span.last)` back to `(0, span.first)`.
fn backtrack(costs: &CostMatrix, n: usize, span: CurveSpan) -> Vec<WarpStep> {
    let first = span.first();
    let mut path = Vec::with_capacity(n + span.len());
    let mut i = n - 1;
    let mut j = span.last();

    loop {
        path.push(WarpStep::new(i, j));
        if i == 0 && j == first {
            break;
        }

        // Step (i', j') lives at matrix cell (i' + 1, j' + 1).
        let diag = if i > 0 && j > first {
            costs.get(i, j)
        } else {
            f64::INFINITY
        };
        let up = if i > 0 { costs.get(i, j + 1) } else { f64::INFINITY };
        let left = if j > first {
            costs.get(i + 1, j)
        } else {
            f64::INFINITY
        };

        if diag <= up && diag <= left {
            i -= 1;
            j -= 1;
        } else if up <= left {
            i -= 1;
        } else {
            j -= 1;
        }
    }

    path.reverse();
    path
}
