//! Error types for curve validation, preprocessing, reference construction and alignment.

/// Errors from curve validation and DTW alignment.
#[derive(Debug, thiserror::Error)]
pub enum DtwError {
    /// Returned when an empty slice is provided as a curve.
    #[error("curve must be non-empty")]
    EmptyCurve,

    /// Returned when a curve has no finite sample at all.
    #[error("curve of length {len} has no valid (non-NaN) samples")]
    DegenerateInput {
        /// Length of the all-NaN curve.
        len: usize,
    },

    /// Returned when a curve contains an infinite value, or a reference curve contains NaN.
    #[error("curve contains non-finite value at index {index}")]
    NonFiniteValue {
        /// Position of the first offending value.
        index: usize,
    },

    /// Returned when a NaN appears between the first and last valid samples.
    #[error("valid span is not contiguous: NaN at index {index}")]
    NonContiguousSpan {
        /// Position of the first interior NaN.
        index: usize,
    },

    /// Returned when a reference curve has fewer than two points.
    #[error("reference curve needs at least 2 points, got {len}")]
    ReferenceTooShort {
        /// Length of the rejected reference.
        len: usize,
    },

    /// Returned when the reference position axis does not match the values.
    #[error("reference has {values} values but {positions} positions")]
    PositionMismatch {
        /// Number of values.
        values: usize,
        /// Number of positions.
        positions: usize,
    },

    /// Returned when a warp path breaks monotonicity, continuity or endpoint coverage.
    #[error("alignment invariant violated: {reason}")]
    AlignmentInvariant {
        /// Human-readable description of the broken invariant.
        reason: String,
    },
}

/// Errors from turning raw daily readings into a standardized curve.
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    /// Returned when fewer than two distinct days carry a valid temperature.
    #[error("need at least 2 valid day-temperature pairs, got {valid}")]
    TooFewReadings {
        /// Number of distinct valid days found.
        valid: usize,
    },

    /// Returned when the declared cycle length does not cover the last reading.
    #[error("cycle length {cycle_length} does not cover reading on day {last_day}")]
    CycleLengthTooShort {
        /// Declared cycle length in days.
        cycle_length: usize,
        /// Day of the last valid reading.
        last_day: usize,
    },

    /// Returned when the target curve length is below 2.
    #[error("curve length must be at least 2, got {len}")]
    InvalidCurveLength {
        /// The rejected length.
        len: usize,
    },

    /// Returned when the smoothing window is zero or even.
    #[error("smoothing window must be odd and at least 1, got {window}")]
    InvalidSmoothingWindow {
        /// The rejected window.
        window: usize,
    },

    /// Returned when the observed span falls between two grid points of the normalized axis.
    #[error("observed span [{first}, {last}] maps to no point of the normalized axis")]
    EmptyResample {
        /// First valid daily index.
        first: usize,
        /// Last valid daily index.
        last: usize,
    },

    /// Returned when a reading day or the declared length exceeds the longest supported cycle.
    #[error("cycle spans {days} days, longer than the supported maximum of {max}")]
    CycleTooLong {
        /// Days the cycle would span (declared length, or last reading day + 1).
        days: usize,
        /// The supported maximum.
        max: usize,
    },

    /// Wraps a curve validation error on the produced curve.
    #[error("invalid standardized curve: {0}")]
    Curve(#[from] DtwError),
}

/// Errors from building the reference ("model") cycle.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// Returned when no input curves are supplied.
    #[error("cannot build a reference curve from zero curves")]
    NoCurves,

    /// Returned when the requested grid length is below 2.
    #[error("reference grid length must be at least 2, got {len}")]
    InvalidGrid {
        /// The rejected length.
        len: usize,
    },

    /// Returned when an input curve has mismatched positions and values.
    #[error("curve {index} has {positions} positions but {values} values")]
    LengthMismatch {
        /// Index of the offending input curve.
        index: usize,
        /// Number of positions.
        positions: usize,
        /// Number of values.
        values: usize,
    },

    /// Returned when positions of an input curve are not strictly increasing.
    #[error("curve {index} has non-increasing positions at point {point}")]
    UnsortedPositions {
        /// Index of the offending input curve.
        index: usize,
        /// Index of the first out-of-order point.
        point: usize,
    },

    /// Returned when an input curve has no finite point.
    #[error("curve {index} has no finite points")]
    EmptyCurve {
        /// Index of the offending input curve.
        index: usize,
    },

    /// Returned when no input covers a grid position.
    #[error("grid position {position} is not covered by any input curve")]
    Uncovered {
        /// Index on the reference grid.
        position: usize,
    },

    /// Wraps a validation error on the produced reference.
    #[error("invalid reference curve: {0}")]
    Curve(#[from] DtwError),
}
