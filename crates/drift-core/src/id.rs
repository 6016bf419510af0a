//! Strongly-typed identifiers for particles and mesh tiles.

use crate::real::Real;
use std::fmt;

/// Identifies one particle across every append to a [`Record`](crate::Record).
///
/// Assigned once when a particle set is built and never reused within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ParticleId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl ParticleId {
    /// Sequential ids `1..=n`, the default when a set is built without ids.
    pub fn sequence(n: usize) -> Vec<ParticleId> {
        (1..=n as u64).map(ParticleId).collect()
    }
}

/// Identifies one tile (subdomain) of a multi-tile mesh.
///
/// Particles on a mesh carry their tile id as a trailing state component,
/// stored as a real number so the solver can treat the whole state as a
/// flat vector. [`TileId::from_real`] and [`TileId::to_real`] convert.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub u32);

impl TileId {
    /// Decode a tile id from its state-vector representation.
    ///
    /// Rounds to the nearest integer; negative or NaN inputs map to tile 0.
    pub fn from_real<T: Real>(v: T) -> Self {
        let r = v.round().to_f64();
        if r.is_nan() || r < 0.0 {
            Self(0)
        } else {
            Self(r as u32)
        }
    }

    /// Encode this id as a state-vector component.
    pub fn to_real<T: Real>(self) -> T {
        T::from_f64(self.0 as f64)
    }

    /// Zero-based index into per-tile storage.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TileId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_id_round_trips_through_real() {
        let t = TileId(7);
        let r: f64 = t.to_real();
        assert_eq!(TileId::from_real(r), t);
        let r32: f32 = t.to_real();
        assert_eq!(TileId::from_real(r32), t);
    }

    #[test]
    fn tile_id_from_real_rounds_and_floors_at_zero() {
        assert_eq!(TileId::from_real(2.9999f64), TileId(3));
        assert_eq!(TileId::from_real(-3.0f64), TileId(0));
        assert_eq!(TileId::from_real(f64::NAN), TileId(0));
    }

    #[test]
    fn particle_sequence_starts_at_one() {
        let ids = ParticleId::sequence(3);
        assert_eq!(ids, vec![ParticleId(1), ParticleId(2), ParticleId(3)]);
        assert_eq!(ids[2].to_string(), "3");
    }
}
