use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ndarray::prelude::*;
use ndarray_ndimage::*;
use ndarray_rand::{rand_distr::Uniform, RandomExt};

fn criterion_benchmark(c: &mut Criterion) {
    let x = Array::random((512, 512), Uniform::new(0f32, 1.));
    let k = Array::random((9, 9), Uniform::new(0f32, 1.));
    let mask = x.mapv(|v| v > 0.6);

    c.bench_function("correlate", |b| {
        b.iter(|| x.correlate(black_box(&k), BoundaryMode::Reflect, 0isize))
    });

    c.bench_function("gaussian_filter", |b| {
        b.iter(|| x.gaussian_filter(black_box(2.0), 0usize, BoundaryMode::Reflect))
    });

    c.bench_function("median_filter", |b| {
        b.iter(|| x.median_filter(black_box(5usize), BoundaryMode::Reflect, 0isize))
    });

    c.bench_function("binary_erosion", |b| {
        b.iter(|| mask.binary_erosion(black_box(&BinaryMorphology::new())))
    });

    c.bench_function("zoom", |b| {
        b.iter(|| x.zoom(black_box(1.5), &Resample::default()))
    });

    c.bench_function("label", |b| b.iter(|| black_box(&mask).label(None)));

    c.bench_function("distance_transform_edt", |b| {
        b.iter(|| black_box(&mask).distance_transform_edt(1.0))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
