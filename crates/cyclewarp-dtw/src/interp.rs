//! Piecewise-linear interpolation shared by resampling and reference construction.

/// Evaluate the piecewise-linear function through `(xs, ys)` at `x`.
///
/// `xs` must be strictly increasing and non-empty. Values of `x` outside
/// `[xs[0], xs[last]]` clamp to the nearest endpoint.
pub(crate) fn interp(x: f64, xs: &[f64], ys: &[f64]) -> f64 {
    debug_assert_eq!(xs.len(), ys.len());
    debug_assert!(!xs.is_empty());
    let last = xs.len() - 1;
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[last] {
        return ys[last];
    }
    // First index with xs[k] > x; 1 <= k <= last here.
    let k = xs.partition_point(|&v| v <= x);
    let (x0, x1) = (xs[k - 1], xs[k]);
    let (y0, y1) = (ys[k - 1], ys[k]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}
