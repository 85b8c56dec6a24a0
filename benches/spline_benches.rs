use RustedSplines::{SplineConfig, SolverMethod, TensorSplineND};
use criterion::{Criterion, criterion_group, criterion_main};
use ndarray::{ArrayD, IxDyn};
use std::hint::black_box;

fn axes(dims: &[usize]) -> Vec<Vec<f64>> {
    dims.iter()
        .map(|&n| (0..n).map(|i| (i as f64 / (n - 1) as f64).powf(1.3)).collect())
        .collect()
}

fn values(axes: &[Vec<f64>]) -> ArrayD<f64> {
    let shape: Vec<usize> = axes.iter().map(|a| a.len()).collect();
    ArrayD::from_shape_fn(IxDyn(&shape), |idx| {
        (0..axes.len())
            .map(|k| (3.0 * axes[k][idx[k]] + k as f64).sin())
            .product::<f64>()
    })
}

fn fitted(axes: &[Vec<f64>], config: SplineConfig) -> TensorSplineND {
    let mut spline = TensorSplineND::with_config(axes, config).unwrap();
    spline.setup().unwrap();
    spline.compute_coefficients(&values(axes)).unwrap();
    spline
}

fn bench_fit_3d(c: &mut Criterion) {
    let axes = axes(&[40, 40, 40]);
    let data = values(&axes);
    let mut group = c.benchmark_group("fit 40x40x40");
    for method in [SolverMethod::Dense, SolverMethod::Banded] {
        let config = SplineConfig {
            method,
            ..SplineConfig::default()
        };
        let mut spline = TensorSplineND::with_config(&axes, config).unwrap();
        spline.setup().unwrap();
        group.bench_function(format!("{:?}", method), |b| {
            b.iter(|| spline.compute_coefficients(black_box(&data)).unwrap())
        });
    }
    group.finish();
}

fn bench_evaluate_5d(c: &mut Criterion) {
    let axes = axes(&[10, 9, 8, 9, 10]);
    let spline = fitted(&axes, SplineConfig::default());
    let point = [0.31, 0.52, 0.77, 0.05, 0.64];
    c.bench_function("evaluate 5d, contraction", |b| {
        b.iter(|| spline.evaluate(black_box(&point)).unwrap())
    });
    c.bench_function("evaluate 5d, local sum", |b| {
        b.iter(|| spline.evaluate_local(black_box(&point)).unwrap())
    });
}

criterion_group!(benches, bench_fit_3d, bench_evaluate_5d);
criterion_main!(benches);
