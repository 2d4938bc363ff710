//! Curve types with validation guarantees.

use std::ops::Index;

use crate::error::DtwError;

/// Inclusive index range `[first, last]` of the valid samples of a curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveSpan {
    first: usize,
    last: usize,
}

impl CurveSpan {
    pub(crate) fn new(first: usize, last: usize) -> Self {
        debug_assert!(first <= last);
        Self { first, last }
    }

    /// Index of the first valid sample.
    #[must_use]
    pub fn first(&self) -> usize {
        self.first
    }

    /// Index of the last valid sample.
    #[must_use]
    pub fn last(&self) -> usize {
        self.last
    }

    /// Number of samples in the span. Always at least 1.
    #[must_use]
    pub fn len(&self) -> usize {
        self.last - self.first + 1
    }

    /// A span always holds at least one sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Return true if `index` lies inside the span.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        (self.first..=self.last).contains(&index)
    }
}

/// Evenly spaced positions `0, 1/(n-1), ..., 1` on the normalized cycle axis.
///
/// A single point maps to `[0.0]`.
#[must_use]
pub fn normal_positions(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let denom = (n - 1) as f64;
            (0..n).map(|i| i as f64 / denom).collect()
        }
    }
}

/// Standardized temperature curve of one cycle on the normalized axis.
///
/// Leading and trailing positions may be NaN where the cycle has no data.
/// The non-NaN samples form one contiguous [`CurveSpan`] and are all finite.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardizedCurve {
    values: Vec<f64>,
    span: CurveSpan,
}

impl StandardizedCurve {
    /// Validate `values` and locate its valid span.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::EmptyCurve`] | `values` is empty |
    /// | [`DtwError::NonFiniteValue`] | Any value is infinite |
    /// | [`DtwError::DegenerateInput`] | Every value is NaN |
    /// | [`DtwError::NonContiguousSpan`] | A NaN sits between two valid samples |
    pub fn new(values: Vec<f64>) -> Result<Self, DtwError> {
        if values.is_empty() {
            return Err(DtwError::EmptyCurve);
        }
        if let Some(index) = values.iter().position(|v| v.is_infinite()) {
            return Err(DtwError::NonFiniteValue { index });
        }
        let Some(first) = values.iter().position(|v| !v.is_nan()) else {
            return Err(DtwError::DegenerateInput { len: values.len() });
        };
        let last = values.iter().rposition(|v| !v.is_nan()).unwrap_or(first);
        if let Some(offset) = values[first..=last].iter().position(|v| v.is_nan()) {
            return Err(DtwError::NonContiguousSpan {
                index: first + offset,
            });
        }
        Ok(Self {
            values,
            span: CurveSpan::new(first, last),
        })
    }

    /// All samples, NaN padding included.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The contiguous range of valid samples.
    #[must_use]
    pub fn span(&self) -> CurveSpan {
        self.span
    }

    /// The valid samples only.
    #[must_use]
    pub fn valid_values(&self) -> &[f64] {
        &self.values[self.span.first..=self.span.last]
    }

    /// Total length including padding.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false` for a validated curve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume and return the inner vector.
    #[must_use]
    pub fn into_inner(self) -> Vec<f64> {
        self.values
    }
}

impl Index<usize> for StandardizedCurve {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}

impl TryFrom<Vec<f64>> for StandardizedCurve {
    type Error = DtwError;

    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

/// The population "model" cycle every individual cycle is aligned against.
///
/// Guaranteed to hold at least two finite values, with matching positions on
/// the normalized axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceCurve {
    values: Vec<f64>,
    positions: Vec<f64>,
}

impl ReferenceCurve {
    /// Create a reference on evenly spaced positions.
    ///
    /// # Errors
    ///
    /// See [`ReferenceCurve::with_positions`].
    pub fn new(values: Vec<f64>) -> Result<Self, DtwError> {
        let positions = normal_positions(values.len());
        Self::with_positions(values, positions)
    }

    /// Create a reference with an explicit position axis.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`DtwError::ReferenceTooShort`] | Fewer than 2 values |
    /// | [`DtwError::NonFiniteValue`] | Any value is NaN or infinite |
    /// | [`DtwError::PositionMismatch`] | `positions.len() != values.len()` |
    pub fn with_positions(values: Vec<f64>, positions: Vec<f64>) -> Result<Self, DtwError> {
        if values.len() < 2 {
            return Err(DtwError::ReferenceTooShort { len: values.len() });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DtwError::NonFiniteValue { index });
        }
        if positions.len() != values.len() {
            return Err(DtwError::PositionMismatch {
                values: values.len(),
                positions: positions.len(),
            });
        }
        Ok(Self { values, positions })
    }

    /// Reference values.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Positions of the values on the normalized axis.
    #[must_use]
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Number of reference points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false` for a validated reference.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the last reference point, the normaliser for warp-asymmetry features.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.values.len() - 1
    }
}

impl Index<usize> for ReferenceCurve {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.values[index]
    }
}
