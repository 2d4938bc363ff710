//! Sequence preprocessing: raw daily readings to a standardized, NaN-padded curve.

use tracing::{debug, instrument};

use crate::curve::{StandardizedCurve, normal_positions};
use crate::error::PreprocessError;
use crate::interp::interp;

/// Default number of points on the normalized cycle axis.
pub const DEFAULT_CURVE_LENGTH: usize = 51;

/// Default centred moving-average window, in days.
pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;

/// Longest cycle, in days, the preprocessor accepts.
pub const MAX_CYCLE_DAYS: usize = 366;

/// One raw temperature observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Day of the cycle, counted from 0.
    pub day: usize,
    /// Recorded temperature, `None` when the day was skipped.
    pub temperature: Option<f64>,
}

impl Reading {
    /// Reading with a recorded temperature.
    #[must_use]
    pub const fn new(day: usize, temperature: f64) -> Self {
        Self {
            day,
            temperature: Some(temperature),
        }
    }

    /// Day without a usable temperature.
    #[must_use]
    pub const fn missing(day: usize) -> Self {
        Self {
            day,
            temperature: None,
        }
    }
}

/// Output of [`Preprocessor::process`].
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedCycle {
    /// Standardized curve on the normalized axis.
    pub curve: StandardizedCurve,
    /// Number of valid readings that went into the curve.
    pub data_length: usize,
    /// Cycle length in days used for the daily series.
    pub cycle_length: usize,
}

/// Immutable preprocessing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preprocessor {
    curve_length: usize,
    smoothing_window: usize,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self {
            curve_length: DEFAULT_CURVE_LENGTH,
            smoothing_window: DEFAULT_SMOOTHING_WINDOW,
        }
    }
}

impl Preprocessor {
    /// Create a preprocessor producing curves of `curve_length` points.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PreprocessError::InvalidCurveLength`] | `curve_length < 2` |
    pub fn new(curve_length: usize) -> Result<Self, PreprocessError> {
        if curve_length < 2 {
            return Err(PreprocessError::InvalidCurveLength { len: curve_length });
        }
        Ok(Self {
            curve_length,
            ..Self::default()
        })
    }

    /// Set the moving-average window.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PreprocessError::InvalidSmoothingWindow`] | `window` is zero or even |
    pub fn with_smoothing_window(mut self, window: usize) -> Result<Self, PreprocessError> {
        if window == 0 || window % 2 == 0 {
            return Err(PreprocessError::InvalidSmoothingWindow { window });
        }
        self.smoothing_window = window;
        Ok(self)
    }

    /// Number of points on the normalized axis.
    #[must_use]
    pub fn curve_length(&self) -> usize {
        self.curve_length
    }

    /// Moving-average window in days.
    #[must_use]
    pub fn smoothing_window(&self) -> usize {
        self.smoothing_window
    }

    /// Turn one cycle's raw readings into a standardized curve.
    ///
    /// Missing and non-finite temperatures are dropped, same-day readings are
    /// averaged, interior gaps are linearly interpolated, the daily series is
    /// smoothed, resampled onto the normalized axis and z-scored.
    ///
    /// Standardization runs after resampling, over the resampled curve's valid
    /// points. Day indices and temperatures of landmarks both read from this one
    /// curve; no separately standardized daily series is kept.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PreprocessError::TooFewReadings`] | Fewer than 2 distinct valid days |
    /// | [`PreprocessError::CycleLengthTooShort`] | `cycle_length` ends before the last reading |
    /// | [`PreprocessError::CycleTooLong`] | A reading day or `cycle_length` reaches past [`MAX_CYCLE_DAYS`] |
    /// | [`PreprocessError::EmptyResample`] | No normalized position falls inside the observed days |
    #[instrument(skip(self, readings), fields(n = readings.len()))]
    pub fn process(
        &self,
        readings: &[Reading],
        cycle_length: Option<usize>,
    ) -> Result<PreprocessedCycle, PreprocessError> {
        let (days, data_length) = merge_days(readings);
        if days.len() < 2 {
            return Err(PreprocessError::TooFewReadings { valid: days.len() });
        }
        let last_day = days[days.len() - 1].0;
        if last_day >= MAX_CYCLE_DAYS {
            return Err(PreprocessError::CycleTooLong {
                days: last_day.saturating_add(1),
                max: MAX_CYCLE_DAYS,
            });
        }
        let cycle_length = match cycle_length {
            Some(len) if len <= last_day => {
                return Err(PreprocessError::CycleLengthTooShort {
                    cycle_length: len,
                    last_day,
                });
            }
            Some(len) if len > MAX_CYCLE_DAYS => {
                return Err(PreprocessError::CycleTooLong {
                    days: len,
                    max: MAX_CYCLE_DAYS,
                });
            }
            Some(len) => len,
            None => last_day + 1,
        };

        let daily = daily_series(&days, cycle_length);
        let first = days[0].0;
        let smoothed = smooth(&daily, first, last_day, self.smoothing_window);
        let resampled = resample(&smoothed, first, last_day, self.curve_length)?;
        let curve = StandardizedCurve::new(standardize(resampled))?;

        debug!(
            data_length,
            cycle_length,
            span_first = curve.span().first(),
            span_last = curve.span().last(),
            "preprocessed cycle"
        );
        Ok(PreprocessedCycle {
            curve,
            data_length,
            cycle_length,
        })
    }
}

/// Sorted `(day, mean temperature)` pairs plus the count of valid readings.
fn merge_days(readings: &[Reading]) -> (Vec<(usize, f64)>, usize) {
    let mut valid: Vec<(usize, f64)> = readings
        .iter()
        .filter_map(|r| r.temperature.filter(|t| t.is_finite()).map(|t| (r.day, t)))
        .collect();
    let count = valid.len();
    valid.sort_by_key(|&(day, _)| day);

    let mut merged: Vec<(usize, f64, usize)> = Vec::with_capacity(valid.len());
    for (day, t) in valid {
        match merged.last_mut() {
            Some((d, sum, n)) if *d == day => {
                *sum += t;
                *n += 1;
            }
            _ => merged.push((day, t, 1)),
        }
    }
    let days = merged
        .into_iter()
        .map(|(day, sum, n)| (day, sum / n as f64))
        .collect();
    (days, count)
}

/// Daily series over `0..cycle_length` with interior gaps interpolated and NaN outside.
fn daily_series(days: &[(usize, f64)], cycle_length: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; cycle_length];
    for pair in days.windows(2) {
        let ((d0, t0), (d1, t1)) = (pair[0], pair[1]);
        let width = (d1 - d0) as f64;
        for d in d0..d1 {
            out[d] = t0 + (t1 - t0) * (d - d0) as f64 / width;
        }
    }
    if let Some(&(day, t)) = days.last() {
        out[day] = t;
    }
    out
}

/// Centred moving average over `[first, last]`, windows truncated at the span edges.
fn smooth(daily: &[f64], first: usize, last: usize, window: usize) -> Vec<f64> {
    let half = window / 2;
    let mut out = vec![f64::NAN; daily.len()];
    for (k, slot) in out.iter_mut().enumerate().take(last + 1).skip(first) {
        let lo = k.saturating_sub(half).max(first);
        let hi = (k + half).min(last);
        let sum: f64 = daily[lo..=hi].iter().sum();
        *slot = sum / (hi - lo + 1) as f64;
    }
    out
}

/// Resample the valid span onto `target_len` evenly spaced positions, NaN outside.
fn resample(
    smoothed: &[f64],
    first: usize,
    last: usize,
    target_len: usize,
) -> Result<Vec<f64>, PreprocessError> {
    let denom = smoothed.len() - 1;
    let steps = target_len - 1;
    // Target g lies in [first/denom, last/denom] iff first*steps <= g*denom <= last*steps.
    let g_first = (first * steps).div_ceil(denom);
    let g_last = last * steps / denom;
    if g_first > g_last {
        return Err(PreprocessError::EmptyResample { first, last });
    }

    let positions = normal_positions(smoothed.len());
    let targets = normal_positions(target_len);
    let xs = &positions[first..=last];
    let ys = &smoothed[first..=last];

    let mut out = vec![f64::NAN; target_len];
    for g in g_first..=g_last {
        out[g] = interp(targets[g], xs, ys);
    }
    Ok(out)
}

/// Z-score the non-NaN values of `values` in place, using population standard deviation.
///
/// A (numerically) zero-variance curve is only centred, so flat cycles and
/// single-point curves come out as all zeros.
#[must_use]
pub fn standardize(mut values: Vec<f64>) -> Vec<f64> {
    let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let n = valid.len();
    if n == 0 {
        return values;
    }
    let mean = valid.iter().sum::<f64>() / n as f64;
    let variance = valid.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n as f64;
    let std = variance.sqrt();

    let scale = if std <= 1e-12 * (1.0 + mean.abs()) {
        1.0
    } else {
        std
    };
    for v in values.iter_mut().filter(|v| !v.is_nan()) {
        *v = (*v - mean) / scale;
    }
    values
}
