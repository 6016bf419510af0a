//! Test fixtures and mock strategies for drift development.
//!
//! Provides the standard gyre velocity field used across the engine tests
//! and benchmarks, seeded particle clouds, helpers that re-express an
//! array field on a tiled mesh, and instrumented strategies
//! ([`CountingInterpolant`], [`FailingSolver`]).

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{CountingInterpolant, FailingSolver};

use std::f64::consts::TAU;
use std::sync::Arc;

use drift_field::{tiles_from_global, ArrayField2, MeshField2, VelocityField};
use drift_grid::TiledMesh;
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// `amplitude * sin(2 pi i / n) * sin(2 pi j / n)` on an `n x n` corner grid:
/// four counter-rotating gyres on a doubly periodic square.
pub fn gyre_streamfunction(n: usize, amplitude: f64) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |(i, j)| {
        let x = TAU * i as f64 / n as f64;
        let y = TAU * j as f64 / n as f64;
        amplitude * x.sin() * y.sin()
    })
}

/// Stationary gyre field on an `n x n` periodic grid bracketed by `window`.
///
/// # Panics
///
/// Panics if `n == 0` or the window is invalid.
pub fn gyre_field(n: usize, amplitude: f64, window: (f64, f64)) -> ArrayField2<f64> {
    ArrayField2::from_streamfunction(&gyre_streamfunction(n, amplitude), window)
        .expect("gyre parameters are valid")
}

/// Stationary sheared drift on an `n x n` periodic grid: a mean flow of
/// `(0.5, 0.3)` cells per unit time with a sinusoidal shear of `0.1` across
/// each axis. Unlike the gyre it carries particles across any tiling.
///
/// # Panics
///
/// Panics if `n == 0` or the window is invalid.
pub fn shear_field(n: usize, window: (f64, f64)) -> ArrayField2<f64> {
    let wave = |k: usize| 0.1 * (TAU * (k as f64 + 0.5) / n as f64).sin();
    let u = Array2::from_shape_fn((n, n), |(_, j)| 0.5 + wave(j));
    let v = Array2::from_shape_fn((n, n), |(i, _)| 0.3 + wave(i));
    ArrayField2::stationary(u, v, window).expect("shear parameters are valid")
}

/// `n` particles drawn uniformly from `[lo, hi) x [lo, hi)`, reproducible
/// from `seed`. Returned as a `(2, n)` position array.
pub fn seeded_positions(n: usize, lo: f64, hi: f64, seed: u64) -> Array2<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut pos = Array2::zeros((2, n));
    for c in 0..n {
        pos[[0, c]] = rng.random_range(lo..hi);
        pos[[1, c]] = rng.random_range(lo..hi);
    }
    pos
}

/// The same velocities as `field`, cut into a `tiles_x x tiles_y` doubly
/// periodic mosaic.
///
/// # Panics
///
/// Panics if the field's extent is not divisible by the tile layout.
pub fn tile_array_field(
    field: &ArrayField2<f64>,
    tiles_x: usize,
    tiles_y: usize,
) -> (TiledMesh, VelocityField<f64>) {
    let (nx, ny) = field.shape();
    assert!(
        nx % tiles_x == 0 && ny % tiles_y == 0,
        "{nx}x{ny} grid does not split into {tiles_x}x{tiles_y} tiles"
    );
    let mesh =
        TiledMesh::new(tiles_x, tiles_y, nx / tiles_x, ny / tiles_y).expect("non-empty layout");
    let split = |a: &Array2<f64>| tiles_from_global(&mesh, a).expect("extent matches mesh");
    let (u0, v0) = field.start();
    let (u1, v1) = field.end();
    let tiled = MeshField2::new(
        Arc::new(mesh.clone()),
        split(u0),
        split(v0),
        split(u1),
        split(v1),
        field.time_bounds(),
    )
    .expect("tiles match mesh");
    (mesh, tiled.into())
}

/// Convert a `(2, n)` array of global index positions into the `(3, n)`
/// `[x, y, fid]` layout of a tiled field.
pub fn tiled_positions(mesh: &TiledMesh, global: &Array2<f64>) -> Array2<f64> {
    let n = global.ncols();
    let mut out = Array2::zeros((3, n));
    for c in 0..n {
        let loc = mesh.from_global(global[[0, c]], global[[1, c]]);
        out[[0, c]] = loc.x;
        out[[1, c]] = loc.y;
        out[[2, c]] = loc.tile.to_real::<f64>();
    }
    out
}

/// Map tile-local coordinates back to global index coordinates.
pub fn global_position(mesh: &TiledMesh, x: f64, y: f64, fid: f64) -> (f64, f64) {
    mesh.to_global(drift_core::TileId::from_real(fid), x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shear_field_drifts_east_and_north_everywhere() {
        let f = shear_field(16, (0.0, 1.0));
        for &(x, y) in &[(0.0, 0.0), (3.3, 12.1), (15.9, 7.5)] {
            let [u, v] = f.velocity(x, y, 0.5);
            assert!((0.4..=0.6).contains(&u), "u = {u}");
            assert!((0.2..=0.4).contains(&v), "v = {v}");
        }
    }

    #[test]
    fn seeded_positions_are_reproducible_and_bounded() {
        let a = seeded_positions(50, 6.4, 9.6, 42);
        let b = seeded_positions(50, 6.4, 9.6, 42);
        assert_eq!(a, b);
        assert!(a.iter().all(|&v| (6.4..9.6).contains(&v)));
        assert_ne!(a, seeded_positions(50, 6.4, 9.6, 43));
    }

    #[test]
    fn tiled_positions_round_trip() {
        let mesh = TiledMesh::new(2, 2, 8, 8).unwrap();
        let global = seeded_positions(20, 0.0, 16.0, 1);
        let tiled = tiled_positions(&mesh, &global);
        for c in 0..20 {
            let (gx, gy) = global_position(&mesh, tiled[[0, c]], tiled[[1, c]], tiled[[2, c]]);
            assert!((gx - global[[0, c]]).abs() < 1e-12);
            assert!((gy - global[[1, c]]).abs() < 1e-12);
        }
    }

    #[test]
    fn tiled_gyre_has_one_grid_per_tile() {
        let (mesh, field) = tile_array_field(&gyre_field(16, 1.0, (0.0, 10.0)), 2, 2);
        assert_eq!(drift_grid::Mesh::tile_count(&mesh), 4);
        assert_eq!(field.state_dim(), 3);
    }
}
