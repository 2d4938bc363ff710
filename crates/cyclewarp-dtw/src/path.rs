//! Warp path types for reference-to-cycle alignment.

use crate::curve::CurveSpan;
use crate::error::DtwError;

/// A single step in a warp path, pairing a reference index with a cycle index.
///
/// Cycle indices are absolute positions in the padded [`StandardizedCurve`][crate::StandardizedCurve],
/// not offsets into its valid span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WarpStep {
    /// Index into the reference curve.
    pub reference: usize,
    /// Index into the cycle curve.
    pub cycle: usize,
}

impl WarpStep {
    /// Shorthand constructor.
    #[must_use]
    pub const fn new(reference: usize, cycle: usize) -> Self {
        Self { reference, cycle }
    }
}

impl From<(usize, usize)> for WarpStep {
    fn from((reference, cycle): (usize, usize)) -> Self {
        Self { reference, cycle }
    }
}

/// An ordered, validated alignment from `(0, span.first)` to `(n_ref - 1, span.last)`.
///
/// Both coordinates are non-decreasing and advance by at most one per step.
#[derive(Debug, Clone, PartialEq)]
pub struct WarpPath(Vec<WarpStep>);

impl WarpPath {
    /// Validate `steps` against a reference of length `reference_len` and a cycle span.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::AlignmentInvariant`] | Path is empty, misses an endpoint, steps backwards, or skips an index |
    pub fn from_steps(
        steps: Vec<WarpStep>,
        reference_len: usize,
        span: CurveSpan,
    ) -> Result<Self, DtwError> {
        validate(&steps, reference_len, span)?;
        Ok(Self(steps))
    }

    /// Return the warp steps as a slice.
    #[must_use]
    pub fn steps(&self) -> &[WarpStep] {
        &self.0
    }

    /// Return the number of steps in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// A validated path always holds at least one step.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First step, always `(0, span.first)`.
    #[must_use]
    pub fn first(&self) -> WarpStep {
        self.0[0]
    }

    /// Last step, always `(n_ref - 1, span.last)`.
    #[must_use]
    pub fn last(&self) -> WarpStep {
        self.0[self.0.len() - 1]
    }

    /// Euclidean length of the polyline through steps `start..=end` in (cycle, reference) space.
    ///
    /// Returns `0.0` when `start > end` or `start == end`.
    ///
    /// # Panics
    ///
    /// Panics if `end >= self.len()` while `start <= end`.
    #[must_use]
    pub fn segment_length(&self, start: usize, end: usize) -> f64 {
        if start >= end {
            return 0.0;
        }
        self.0[start..=end]
            .windows(2)
            .map(|w| {
                let dr = w[1].reference as f64 - w[0].reference as f64;
                let dc = w[1].cycle as f64 - w[0].cycle as f64;
                dr.hypot(dc)
            })
            .sum()
    }

    /// Consume and return the inner steps.
    #[must_use]
    pub fn into_inner(self) -> Vec<WarpStep> {
        self.0
    }
}

impl<'a> IntoIterator for &'a WarpPath {
    type Item = &'a WarpStep;
    type IntoIter = std::slice::Iter<'a, WarpStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

fn validate(steps: &[WarpStep], reference_len: usize, span: CurveSpan) -> Result<(), DtwError> {
    let broken = |reason: String| Err(DtwError::AlignmentInvariant { reason });

    let (Some(&head), Some(&tail)) = (steps.first(), steps.last()) else {
        return broken("warp path is empty".to_owned());
    };
    let start = WarpStep::new(0, span.first());
    if head != start {
        return broken(format!("path starts at {head:?}, expected {start:?}"));
    }
    let end = WarpStep::new(reference_len.saturating_sub(1), span.last());
    if reference_len == 0 || tail != end {
        return broken(format!("path ends at {tail:?}, expected {end:?}"));
    }

    for (k, w) in steps.windows(2).enumerate() {
        let (prev, next) = (w[0], w[1]);
        let (Some(dr), Some(dc)) = (
            next.reference.checked_sub(prev.reference),
            next.cycle.checked_sub(prev.cycle),
        ) else {
            return broken(format!("step {} moves backwards: {prev:?} -> {next:?}", k + 1));
        };
        if dr > 1 || dc > 1 {
            return broken(format!("step {} skips an index: {prev:?} -> {next:?}", k + 1));
        }
        if dr == 0 && dc == 0 {
            return broken(format!("step {} repeats {prev:?}", k + 1));
        }
    }
    Ok(())
}
