//! Criterion micro-benchmarks for velocity interpolation.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use drift_field::{ArrayField3, FieldInterpolant, VelocityField, VelocityFunction};
use drift_test_utils::{gyre_field, seeded_positions, tile_array_field, tiled_positions};
use ndarray::{Array2, Array3};

/// 10K deterministic sample points on a 64x64 domain, particle-major.
fn points_2d() -> Array2<f64> {
    seeded_positions(10_000, 0.0, 64.0, 1)
}

/// Benchmark: bilinear lookups on a periodic 64x64 array field.
fn bench_velocity_array2_10k(c: &mut Criterion) {
    let field: VelocityField<f64> = gyre_field(64, 1.0, (0.0, 10.0)).into();
    let pts = points_2d();

    c.bench_function("velocity_array2_10k", |b| {
        b.iter(|| {
            for col in pts.columns() {
                let v = field.velocity(&[col[0], col[1]], 2.5);
                black_box(&v);
            }
        });
    });
}

/// Benchmark: trilinear lookups on a 64x64x16 array field.
fn bench_velocity_array3_10k(c: &mut Criterion) {
    let shape = (64, 64, 16);
    let u = Array3::from_shape_fn(shape, |(i, j, k)| (i + j + k) as f64 * 1e-3);
    let v = Array3::from_shape_fn(shape, |(i, j, _)| (i as f64 - j as f64) * 1e-3);
    let w = Array3::from_elem(shape, 1e-4);
    let field: VelocityField<f64> = ArrayField3::stationary(u, v, w, (0.0, 10.0))
        .unwrap()
        .into();
    let pts = points_2d();

    c.bench_function("velocity_array3_10k", |b| {
        b.iter(|| {
            for (n, col) in pts.columns().into_iter().enumerate() {
                let z = (n % 15) as f64 + 0.5;
                let v = field.velocity(&[col[0], col[1], z], 2.5);
                black_box(&v);
            }
        });
    });
}

/// Benchmark: the default velocity function on a 2x2 tiled mosaic,
/// including tile relocation.
fn bench_interpolant_mesh2_10k(c: &mut Criterion) {
    let (mesh, field) = tile_array_field(&gyre_field(64, 1.0, (0.0, 10.0)), 2, 2);
    let pts = tiled_positions(&mesh, &points_2d());
    let mut out = [0.0; 3];

    c.bench_function("interpolant_mesh2_10k", |b| {
        b.iter(|| {
            for col in pts.columns() {
                let mut state = [col[0], col[1], col[2]];
                FieldInterpolant.velocity(&field, 2.5, &mut state, &mut out);
                black_box(&out);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_velocity_array2_10k,
    bench_velocity_array3_10k,
    bench_interpolant_mesh2_10k
);
criterion_main!(benches);
