//! Criterion benchmarks for whole-window integration.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use drift_bench::{reference_profile, tiled_profile, WINDOW};
use drift_engine::ParticleSet;
use drift_solver::{Rk4, SaveAt};
use drift_test_utils::{gyre_field, seeded_positions};

/// Benchmark: adaptive Dormand-Prince over the reference profile.
fn bench_integrate_reference_dopri(c: &mut Criterion) {
    c.bench_function("integrate_reference_dopri", |b| {
        b.iter_batched(
            || reference_profile(42),
            |mut set| black_box(set.integrate(WINDOW).unwrap()),
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: fixed-step RK4 over the same gyre and particles.
fn bench_integrate_reference_rk4(c: &mut Criterion) {
    let build = || {
        ParticleSet::for_field(
            gyre_field(64, 1.0, WINDOW),
            seeded_positions(1_000, 0.0, 64.0, 42),
        )
        .solver(Rk4::new(0.05).with_save_at(SaveAt::Every(1.0)))
        .build()
        .unwrap()
    };

    c.bench_function("integrate_reference_rk4", |b| {
        b.iter_batched(
            build,
            |mut set| black_box(set.integrate(WINDOW).unwrap()),
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: the reference profile split over four workers.
fn bench_integrate_reference_parallel4(c: &mut Criterion) {
    c.bench_function("integrate_reference_parallel4", |b| {
        b.iter_batched(
            || reference_profile(42),
            |mut set| black_box(set.integrate_parallel(WINDOW, 4).unwrap()),
            BatchSize::LargeInput,
        );
    });
}

/// Benchmark: the reference gyre on a 2x2 mosaic.
fn bench_integrate_tiled(c: &mut Criterion) {
    c.bench_function("integrate_tiled_2x2", |b| {
        b.iter_batched(
            || tiled_profile(42),
            |mut set| black_box(set.integrate(WINDOW).unwrap()),
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_integrate_reference_dopri,
        bench_integrate_reference_rk4,
        bench_integrate_reference_parallel4,
        bench_integrate_tiled
);
criterion_main!(benches);
