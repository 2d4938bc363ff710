//! Cycle curve preprocessing, reference construction and DTW alignment.
//!
//! Pure math library, zero I/O. Turns raw daily temperature readings into
//! standardized curves on a normalized cycle axis, averages curves into a
//! reference ("model") cycle, and aligns individual cycles against that
//! reference, returning the warp path and accumulated cost matrix.

mod align;
mod curve;
mod error;
mod interp;
mod matrix;
mod path;
mod preprocess;
mod reference;

pub use align::{Aligner, Alignment};
pub use curve::{CurveSpan, ReferenceCurve, StandardizedCurve, normal_positions};
pub use error::{DtwError, PreprocessError, ReferenceError};
pub use matrix::CostMatrix;
pub use path::{WarpPath, WarpStep};
pub use preprocess::{
    DEFAULT_CURVE_LENGTH, DEFAULT_SMOOTHING_WINDOW, MAX_CYCLE_DAYS, PreprocessedCycle,
    Preprocessor, Reading, standardize,
};
pub use reference::{PositionedCurve, ReferenceBuilder, user_average};
