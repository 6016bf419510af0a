//! The [`Mesh`] capability consumed by multi-tile velocity fields.

use drift_core::TileId;
use std::fmt;
use std::ops::{Add, Sub};

/// One of the four edges of a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Low end of the first axis (`x < 0`).
    West,
    /// High end of the first axis (`x >= nx`).
    East,
    /// Low end of the second axis (`y < 0`).
    South,
    /// High end of the second axis (`y >= ny`).
    North,
}

/// A particle location on a mesh: tile plus tile-local index coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    /// Tile the coordinates refer to.
    pub tile: TileId,
    /// Tile-local first coordinate, in `[0, nx)` once resolved.
    pub x: f64,
    /// Tile-local second coordinate, in `[0, ny)` once resolved.
    pub y: f64,
}

/// Multi-tile mesh topology and coordinate conversion.
///
/// Tiles share one shape and one orientation. Implementors provide the
/// connectivity ([`neighbour`](Mesh::neighbour)) and the geographic
/// mapping ([`lonlat`](Mesh::lonlat)); tile crossing and halo index
/// resolution are derived from the connectivity.
///
/// A missing neighbour is a closed edge: locations and indices saturate
/// at that edge instead of leaving the tile.
pub trait Mesh: Send + Sync + fmt::Debug {
    /// Number of tiles. Valid tile ids are `0..tile_count()`.
    fn tile_count(&self) -> usize;

    /// Cells per tile along each horizontal axis, `(nx, ny)`.
    fn tile_shape(&self) -> (usize, usize);

    /// The tile across `side` of `tile`, or `None` at a closed edge.
    fn neighbour(&self, tile: TileId, side: Side) -> Option<TileId>;

    /// Longitude/latitude of a tile-local index position.
    fn lonlat(&self, tile: TileId, x: f64, y: f64) -> (f64, f64);

    /// Move a location that left its tile onto the tile that now holds it.
    ///
    /// Coordinates already inside `[0,nx) x [0,ny)` are returned unchanged.
    /// Non-finite coordinates are returned unchanged so the solver can
    /// report them.
    fn update_location(&self, tile: TileId, x: f64, y: f64) -> Location {
        if !(x.is_finite() && y.is_finite()) {
            return Location { tile, x, y };
        }
        let (nx, ny) = self.tile_shape();
        let (tile, x) = walk(self, tile, x, nx, [Side::West, Side::East]);
        let (tile, y) = walk(self, tile, y, ny, [Side::South, Side::North]);
        Location { tile, x, y }
    }

    /// Resolve a possibly out-of-tile cell index to `(tile, i, j)`.
    ///
    /// Used for interpolation stencils that straddle a tile edge.
    fn resolve(&self, tile: TileId, i: i64, j: i64) -> (TileId, usize, usize) {
        let (nx, ny) = self.tile_shape();
        let (tile, i) = walk(self, tile, i, nx, [Side::West, Side::East]);
        let (tile, j) = walk(self, tile, j, ny, [Side::South, Side::North]);
        (tile, i as usize, j as usize)
    }
}

/// A coordinate carried across tile edges: a position or a cell index.
trait Coord: Copy + PartialOrd + Add<Output = Self> + Sub<Output = Self> {
    const ZERO: Self;
    fn extent(n: usize) -> Self;
    /// Largest value strictly inside `[0, n)`.
    fn last(n: Self) -> Self;
    /// `n` repeated `laps` times.
    fn laps(n: Self, laps: usize) -> Self;
    fn rem_euclid(self, m: Self) -> Self;
}

impl Coord for f64 {
    const ZERO: Self = 0.0;
    fn extent(n: usize) -> Self {
        n as f64
    }
    fn last(n: Self) -> Self {
        n * (1.0 - f64::EPSILON)
    }
    fn laps(n: Self, laps: usize) -> Self {
        n * laps as f64
    }
    fn rem_euclid(self, m: Self) -> Self {
        f64::rem_euclid(self, m)
    }
}

impl Coord for i64 {
    const ZERO: Self = 0;
    fn extent(n: usize) -> Self {
        n as i64
    }
    fn last(n: Self) -> Self {
        n - 1
    }
    fn laps(n: Self, laps: usize) -> Self {
        n.saturating_mul(laps as i64)
    }
    fn rem_euclid(self, m: Self) -> Self {
        i64::rem_euclid(self, m)
    }
}

/// Walk one axis from `tile` until `c` lies in `[0, n)`.
///
/// `sides` are the low and high edges of the axis. A closed edge saturates
/// `c` there. Revisiting a tile means the axis is a ring, so the remaining
/// distance is reduced modulo the ring's length instead of being walked.
fn walk<M, C>(mesh: &M, mut tile: TileId, mut c: C, n: usize, sides: [Side; 2]) -> (TileId, C)
where
    M: Mesh + ?Sized,
    C: Coord,
{
    let n = C::extent(n);
    let mut visited: Vec<TileId> = Vec::new();
    loop {
        let (side, shift) = if c < C::ZERO {
            (sides[0], n)
        } else if c >= n {
            (sides[1], C::ZERO - n)
        } else {
            return (tile, c);
        };
        if let Some(first) = visited.iter().position(|&t| t == tile) {
            let ring = C::laps(n, visited.len() - first);
            c = c.rem_euclid(ring);
            if side == sides[0] {
                c = c - ring;
            }
            visited.clear();
            continue;
        }
        match mesh.neighbour(tile, side) {
            Some(next) => {
                visited.push(tile);
                tile = next;
                c = c + shift;
            }
            None if side == sides[0] => return (tile, C::ZERO),
            None => return (tile, C::last(n)),
        }
    }
}
