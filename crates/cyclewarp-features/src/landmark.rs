//! Nadir and peak extraction through a warp path.

use cyclewarp_dtw::{CurveSpan, ReferenceCurve, StandardizedCurve, WarpPath, WarpStep};
use tracing::{instrument, trace};

use crate::error::{Landmark, LandmarkError};

/// Nadir and peak of one cycle, on the cycle's own normalized timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmarks {
    /// Cycle index of the temperature trough.
    pub nadir_day: usize,
    /// Cycle curve value at `nadir_day`.
    pub nadir_temp_actual: f64,
    /// Cycle index of the temperature high.
    pub peak_day: usize,
    /// Cycle curve value at `peak_day`.
    pub peak_temp_actual: f64,
}

impl Landmarks {
    /// Days from nadir to peak; negative when the peak resolves first.
    #[must_use]
    pub fn nadir_to_peak(&self) -> i64 {
        self.peak_day as i64 - self.nadir_day as i64
    }

    /// Temperature rise from nadir to peak.
    #[must_use]
    pub fn low_to_high_temp(&self) -> f64 {
        self.peak_temp_actual - self.nadir_temp_actual
    }
}

/// Reference-side anchor positions of the nadir and peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceAnchors {
    /// Last position of the window minimum.
    pub min_pos: usize,
    /// First position of the maximum in `[min_pos, window end]`.
    pub max_pos: usize,
}

/// Locate the reference minimum and the following maximum within `window`.
///
/// The minimum takes the last of tied positions. The maximum is searched only
/// from the minimum onward and takes the first of tied positions.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`LandmarkError::WindowOutOfRange`] | `window.last()` is not a reference index |
pub fn reference_anchors(
    reference: &ReferenceCurve,
    window: CurveSpan,
) -> Result<ReferenceAnchors, LandmarkError> {
    let (first, last) = (window.first(), window.last());
    if last >= reference.len() {
        return Err(LandmarkError::WindowOutOfRange {
            first,
            last,
            reference_len: reference.len(),
        });
    }
    let values = reference.values();

    let mut min_pos = first;
    for k in first..=last {
        if values[k] <= values[min_pos] {
            min_pos = k;
        }
    }

    let mut max_pos = min_pos;
    for k in min_pos..=last {
        if values[k] > values[max_pos] {
            max_pos = k;
        }
    }

    Ok(ReferenceAnchors { min_pos, max_pos })
}

/// Map the reference nadir and peak anchors back onto the cycle timeline.
///
/// Among path steps at the nadir anchor the lowest cycle temperature wins,
/// the last such step on ties. Among steps at the peak anchor the highest
/// cycle temperature wins, the first such step on ties.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`LandmarkError::WindowOutOfRange`] | The cycle's valid span exceeds the reference |
/// | [`LandmarkError::AnchorNotOnPath`] | No step maps to an anchor |
/// | [`LandmarkError::Unresolved`] | A resolved temperature is NaN |
#[instrument(skip_all, fields(path_len = path.len()))]
pub fn extract_landmarks(
    reference: &ReferenceCurve,
    path: &WarpPath,
    cycle: &StandardizedCurve,
) -> Result<Landmarks, LandmarkError> {
    let anchors = reference_anchors(reference, cycle.span())?;
    trace!(min_pos = anchors.min_pos, max_pos = anchors.max_pos, "reference anchors");

    let nadir = resolve(path, cycle, anchors.min_pos, Landmark::Nadir, |v, best| {
        v <= best
    })?;
    let peak = resolve(path, cycle, anchors.max_pos, Landmark::Peak, |v, best| {
        v > best
    })?;

    Ok(Landmarks {
        nadir_day: nadir.cycle,
        nadir_temp_actual: cycle[nadir.cycle],
        peak_day: peak.cycle,
        peak_temp_actual: cycle[peak.cycle],
    })
}

/// Pick the step at `anchor` whose cycle value `replaces` the running best.
fn resolve(
    path: &WarpPath,
    cycle: &StandardizedCurve,
    anchor: usize,
    landmark: Landmark,
    replaces: impl Fn(f64, f64) -> bool,
) -> Result<WarpStep, LandmarkError> {
    let mut chosen: Option<WarpStep> = None;
    for &step in path.steps().iter().filter(|s| s.reference == anchor) {
        match chosen {
            Some(best) if !replaces(cycle[step.cycle], cycle[best.cycle]) => {}
            _ => chosen = Some(step),
        }
    }
    let step = chosen.ok_or(LandmarkError::AnchorNotOnPath {
        landmark,
        reference_index: anchor,
    })?;
    if cycle[step.cycle].is_nan() {
        return Err(LandmarkError::Unresolved {
            landmark,
            day: step.cycle,
            reference_index: anchor,
        });
    }
    Ok(step)
}
