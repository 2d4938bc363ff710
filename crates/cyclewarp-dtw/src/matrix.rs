//! Accumulated cost matrix produced by an alignment.

use std::ops::Index;

use crate::path::WarpStep;

/// Row-major accumulated DTW cost matrix with a sentinel border.
///
/// Shape is `(n_ref + 1) x (n_cycle + 1)`. Cell `(i + 1, j + 1)` holds the
/// cheapest cumulative cost of aligning reference prefix `0..=i` with cycle
/// samples `span.first..=j`. Row 0, column 0 and every column outside the
/// cycle's valid span hold `f64::INFINITY`, except the origin sentinel
/// `(0, span.first)`, which holds `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct CostMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CostMatrix {
    /// Create a matrix of the given shape filled with `f64::INFINITY`.
    pub(crate) fn filled(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![f64::INFINITY; rows * cols],
        }
    }

    /// Return `(rows, cols)`, i.e. `(n_ref + 1, n_cycle + 1)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Return the raw cell at matrix coordinates `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `row >= rows` or `col >= cols`.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(row < self.rows, "row {row} out of bounds for {} rows", self.rows);
        assert!(col < self.cols, "column {col} out of bounds for {} columns", self.cols);
        self.data[row * self.cols + col]
    }

    /// Return the cumulative cost at a warp step, i.e. cell `(reference + 1, cycle + 1)`.
    ///
    /// # Panics
    ///
    /// Panics if the step lies outside the aligned curves.
    #[must_use]
    pub fn at_step(&self, step: WarpStep) -> f64 {
        self.get(step.reference + 1, step.cycle + 1)
    }

    pub(crate) fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.cols + col] = value;
    }

    /// Return the matrix with every cell multiplied by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|v| v * factor).collect(),
        }
    }
}

impl Index<(usize, usize)> for CostMatrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) out of bounds");
        &self.data[row * self.cols + col]
    }
}
