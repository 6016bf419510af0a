//! Benchmark profiles for the drift trajectory engine.
//!
//! Provides pre-built [`ParticleSet`] profiles for benchmarking:
//!
//! - [`reference_profile`]: 64x64 gyre with 1K particles, saved every time unit
//! - [`stress_profile`]: 256x256 gyre with 10K particles
//! - [`tiled_profile`]: the reference gyre cut into a 2x2 tile mosaic

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use drift_engine::ParticleSet;
use drift_solver::{DormandPrince, SaveAt};
use drift_test_utils::{gyre_field, seeded_positions, tile_array_field, tiled_positions};

/// Integration window shared by every profile.
pub const WINDOW: (f64, f64) = (0.0, 10.0);

fn gyre_set(n: usize, particles: usize, seed: u64) -> ParticleSet<f64> {
    let field = gyre_field(n, 1.0, WINDOW);
    let position = seeded_positions(particles, 0.0, n as f64, seed);
    ParticleSet::for_field(field, position)
        .solver(DormandPrince::with_tolerances(1e-6, 1e-6).with_save_at(SaveAt::Every(1.0)))
        .build()
        .expect("gyre profile is valid")
}

/// 64x64 gyre, 1000 particles spread over the whole domain.
///
/// # Panics
///
/// Never in practice; the profile parameters are fixed and valid.
pub fn reference_profile(seed: u64) -> ParticleSet<f64> {
    gyre_set(64, 1_000, seed)
}

/// 256x256 gyre, 10K particles.
///
/// Same setup as [`reference_profile`] at 10x the particle count.
///
/// # Panics
///
/// Never in practice; the profile parameters are fixed and valid.
pub fn stress_profile(seed: u64) -> ParticleSet<f64> {
    gyre_set(256, 10_000, seed)
}

/// The [`reference_profile`] gyre on a 2x2 mosaic of 32x32 tiles.
///
/// # Panics
///
/// Never in practice; the profile parameters are fixed and valid.
pub fn tiled_profile(seed: u64) -> ParticleSet<f64> {
    let field = gyre_field(64, 1.0, WINDOW);
    let global = seeded_positions(1_000, 0.0, 64.0, seed);
    let (mesh, tiled) = tile_array_field(&field, 2, 2);
    ParticleSet::for_field(tiled, tiled_positions(&mesh, &global))
        .solver(DormandPrince::with_tolerances(1e-6, 1e-6).with_save_at(SaveAt::Every(1.0)))
        .build()
        .expect("tiled profile is valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_profile_integrates() {
        let mut set = reference_profile(42);
        let report = set.integrate(WINDOW).unwrap();
        assert_eq!(report.samples, 11);
        assert_eq!(set.record().len(), 11_000);
    }

    #[test]
    fn stress_profile_shape() {
        let set = stress_profile(42);
        assert_eq!(set.len(), 10_000);
        assert_eq!(set.state_dim(), 2);
    }

    #[test]
    fn tiled_profile_shape() {
        let set = tiled_profile(42);
        assert_eq!(set.len(), 1_000);
        assert_eq!(set.state_dim(), 3);
    }

    #[test]
    fn profiles_are_deterministic() {
        assert_eq!(reference_profile(7).position(), reference_profile(7).position());
        assert_ne!(reference_profile(7).position(), reference_profile(8).position());
    }
}
