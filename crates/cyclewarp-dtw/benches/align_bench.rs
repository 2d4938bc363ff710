//! Criterion benchmarks for cyclewarp-dtw: cycle alignment and preprocessing.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use cyclewarp_dtw::{Aligner, Preprocessor, Reading, ReferenceCurve, StandardizedCurve};

fn make_curve(n: usize, phase: f64) -> Vec<f64> {
    (0..n)
        .map(|i| (i as f64 / n as f64 * std::f64::consts::PI + phase).sin())
        .collect()
}

fn bench_align(c: &mut Criterion) {
    let lengths = [51usize, 101, 201];
    let mut group = c.benchmark_group("align");

    for &len in &lengths {
        let reference = ReferenceCurve::new(make_curve(len, 0.0)).unwrap();
        let mut padded = make_curve(len, 0.3);
        for v in padded.iter_mut().take(len / 10) {
            *v = f64::NAN;
        }
        let cycle = StandardizedCurve::new(padded).unwrap();
        let aligner = Aligner::new();

        group.bench_with_input(
            BenchmarkId::from_parameter(len),
            &(reference, cycle),
            |bencher, (reference, cycle)| {
                bencher.iter(|| aligner.align(reference, cycle).unwrap());
            },
        );
    }

    group.finish();
}

fn bench_preprocess(c: &mut Criterion) {
    let readings: Vec<Reading> = (0..30)
        .map(|d| Reading::new(d, 36.4 + 0.3 * (d as f64 / 5.0).sin()))
        .collect();
    let pre = Preprocessor::default();

    c.bench_function("preprocess_30_days", |b| {
        b.iter(|| pre.process(&readings, None).unwrap());
    });
}

criterion_group!(benches, bench_align, bench_preprocess);
criterion_main!(benches);
