//! Regression tests for cyclewarp-dtw.
//!
//! Hand-computed alignments and end-to-end preprocessing checks that pin the
//! recurrence, the tie-break order and the NaN-padding behaviour.

use cyclewarp_dtw::{
    Aligner, DtwError, PositionedCurve, Preprocessor, Reading, ReferenceBuilder, ReferenceCurve,
    StandardizedCurve, WarpStep, user_average,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn reference(values: Vec<f64>) -> ReferenceCurve {
    ReferenceCurve::new(values).expect("valid test reference")
}

fn curve(values: Vec<f64>) -> StandardizedCurve {
    StandardizedCurve::new(values).expect("valid test curve")
}

fn biphasic_readings(start: usize, end: usize, shift: usize) -> Vec<Reading> {
    (start..end)
        .map(|d| {
            let base = if d < 14 + shift { 36.3 } else { 36.75 };
            Reading::new(d, base + 0.01 * ((d * 7) % 5) as f64)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// a) distances_match_known_values
// ---------------------------------------------------------------------------

/// Terminal cumulative cost for a handful of pairs, computed by hand.
#[test]
fn distances_match_known_values() {
    let cases: Vec<(Vec<f64>, Vec<f64>, f64)> = vec![
        (vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0], 3.0),
        (vec![1.0, 2.0, 3.0, 4.0], vec![1.0, 2.0, 3.0, 4.0], 0.0),
        (vec![1.0, 2.0, 3.0, 2.0, 1.0], vec![1.0, 1.0, 3.0, 1.0], 2.0),
        (vec![0.0, 1.0], vec![1.0, 0.0], 2.0),
        (vec![0.0, 5.0], vec![f64::NAN, 5.0, f64::NAN], 5.0),
    ];

    let aligner = Aligner::new();
    for (i, (r, c, expected)) in cases.into_iter().enumerate() {
        let alignment = aligner.align(&reference(r), &curve(c)).unwrap();
        let got = alignment.distance();
        assert!(
            (got - expected).abs() < 1e-12,
            "case {i}: got {got}, expected {expected}"
        );
    }
}

// ---------------------------------------------------------------------------
// b) round_trip_path
// ---------------------------------------------------------------------------

#[test]
fn round_trip_path() {
    let alignment = Aligner::new()
        .align(
            &reference(vec![1.0, 2.0, 3.0, 2.0, 1.0]),
            &curve(vec![1.0, 1.0, 3.0, 1.0]),
        )
        .unwrap();
    let path = alignment.path();
    assert_eq!(path.first(), WarpStep::new(0, 0));
    assert_eq!(path.last(), WarpStep::new(4, 3));
    let steps: Vec<(usize, usize)> = path.steps().iter().map(|s| (s.reference, s.cycle)).collect();
    assert_eq!(steps, vec![(0, 0), (1, 1), (2, 2), (3, 2), (4, 3)]);
}

// ---------------------------------------------------------------------------
// c) degenerate_curve_rejected
// ---------------------------------------------------------------------------

#[test]
fn degenerate_curve_rejected() {
    let result = StandardizedCurve::new(vec![f64::NAN; 51]);
    assert!(
        matches!(result, Err(DtwError::DegenerateInput { len: 51 })),
        "expected DegenerateInput, got {result:?}"
    );
}

// ---------------------------------------------------------------------------
// d) preprocess_build_align
// ---------------------------------------------------------------------------

/// Readings -> curves -> user averages -> reference -> alignment, end to end.
#[test]
fn preprocess_build_align() {
    let pre = Preprocessor::default();
    let user_a: Vec<StandardizedCurve> = [0, 1]
        .iter()
        .map(|&s| pre.process(&biphasic_readings(0, 28, s), None).unwrap().curve)
        .collect();
    let user_b: Vec<StandardizedCurve> = [2, 3]
        .iter()
        .map(|&s| pre.process(&biphasic_readings(0, 30, s), None).unwrap().curve)
        .collect();

    let averages: Vec<PositionedCurve> = vec![user_average(&user_a), user_average(&user_b)];
    let model = ReferenceBuilder::new(51).unwrap().build(&averages).unwrap();
    assert_eq!(model.len(), 51);
    assert!(model.values().iter().all(|v| v.is_finite()));

    // A late-starting cycle aligns from its first valid index.
    let partial = pre.process(&biphasic_readings(5, 28, 0), None).unwrap().curve;
    let span = partial.span();
    assert!(span.first() > 0);
    let alignment = Aligner::new().align(&model, &partial).unwrap();
    assert_eq!(alignment.path().first(), WarpStep::new(0, span.first()));
    assert_eq!(alignment.path().last(), WarpStep::new(50, span.last()));
    assert!(alignment.distance().is_finite());
}
