//! Rectangular tile mosaic.

use crate::error::GridError;
use crate::mesh::{Location, Mesh, Side};
use drift_core::TileId;

/// Affine map from global grid-index coordinates to longitude/latitude.
///
/// `lon = lon0 + gx * dlon`, `lat = lat0 + gy * dlat`. The default is the
/// identity, which makes `lon`/`lat` the global index coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoTransform {
    /// Longitude of global index `x = 0`.
    pub lon0: f64,
    /// Latitude of global index `y = 0`.
    pub lat0: f64,
    /// Degrees of longitude per cell.
    pub dlon: f64,
    /// Degrees of latitude per cell.
    pub dlat: f64,
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self {
            lon0: 0.0,
            lat0: 0.0,
            dlon: 1.0,
            dlat: 1.0,
        }
    }
}

impl GeoTransform {
    fn validate(&self) -> Result<(), GridError> {
        let ok = |v: f64| v.is_finite() && v != 0.0;
        if !ok(self.dlon) || !ok(self.dlat) {
            return Err(GridError::InvalidTransform {
                reason: format!(
                    "spacing must be finite and non-zero, got dlon={} dlat={}",
                    self.dlon, self.dlat
                ),
            });
        }
        if !self.lon0.is_finite() || !self.lat0.is_finite() {
            return Err(GridError::InvalidTransform {
                reason: "origin must be finite".to_string(),
            });
        }
        Ok(())
    }
}

/// A `tiles_x x tiles_y` mosaic of tiles, each `tile_nx x tile_ny` cells.
///
/// Tile `t` sits at column `t % tiles_x`, row `t / tiles_x` of the mosaic.
/// Each axis is independently periodic or closed.
///
/// # Examples
///
/// ```
/// use drift_core::TileId;
/// use drift_grid::{Mesh, Side, TiledMesh};
///
/// let mesh = TiledMesh::new(2, 2, 8, 8).unwrap();
/// assert_eq!(mesh.tile_count(), 4);
/// assert_eq!(mesh.neighbour(TileId(0), Side::East), Some(TileId(1)));
/// // Doubly periodic by default.
/// assert_eq!(mesh.neighbour(TileId(0), Side::West), Some(TileId(1)));
///
/// // A particle leaving tile 0 eastward lands on tile 1.
/// let loc = mesh.update_location(TileId(0), 8.5, 3.0);
/// assert_eq!(loc.tile, TileId(1));
/// assert!((loc.x - 0.5).abs() < 1e-12);
/// ```
#[derive(Clone, Debug)]
pub struct TiledMesh {
    tiles_x: usize,
    tiles_y: usize,
    tile_nx: usize,
    tile_ny: usize,
    periodic_x: bool,
    periodic_y: bool,
    geo: GeoTransform,
}

impl TiledMesh {
    /// A doubly periodic mosaic with the identity [`GeoTransform`].
    pub fn new(
        tiles_x: usize,
        tiles_y: usize,
        tile_nx: usize,
        tile_ny: usize,
    ) -> Result<Self, GridError> {
        for (axis, n) in [
            ("tiles_x", tiles_x),
            ("tiles_y", tiles_y),
            ("tile_nx", tile_nx),
            ("tile_ny", tile_ny),
        ] {
            if n == 0 {
                return Err(GridError::EmptyGrid { axis });
            }
        }
        Ok(Self {
            tiles_x,
            tiles_y,
            tile_nx,
            tile_ny,
            periodic_x: true,
            periodic_y: true,
            geo: GeoTransform::default(),
        })
    }

    /// A global longitude/latitude mosaic: periodic in longitude, closed at
    /// the poles, spanning `[-180, 180) x [-90, 90]`.
    pub fn global(
        tiles_x: usize,
        tiles_y: usize,
        tile_nx: usize,
        tile_ny: usize,
    ) -> Result<Self, GridError> {
        let mesh = Self::new(tiles_x, tiles_y, tile_nx, tile_ny)?;
        let geo = GeoTransform {
            lon0: -180.0,
            lat0: -90.0,
            dlon: 360.0 / (tiles_x * tile_nx) as f64,
            dlat: 180.0 / (tiles_y * tile_ny) as f64,
        };
        mesh.with_periodicity(true, false).with_geo(geo)
    }

    /// Set which axes wrap around.
    pub fn with_periodicity(mut self, periodic_x: bool, periodic_y: bool) -> Self {
        self.periodic_x = periodic_x;
        self.periodic_y = periodic_y;
        self
    }

    /// Replace the coordinate transform.
    pub fn with_geo(mut self, geo: GeoTransform) -> Result<Self, GridError> {
        geo.validate()?;
        self.geo = geo;
        Ok(self)
    }

    /// Mosaic layout `(tiles_x, tiles_y)`.
    pub fn layout(&self) -> (usize, usize) {
        (self.tiles_x, self.tiles_y)
    }

    /// Global extent in cells, `(tiles_x * tile_nx, tiles_y * tile_ny)`.
    pub fn global_shape(&self) -> (usize, usize) {
        (self.tiles_x * self.tile_nx, self.tiles_y * self.tile_ny)
    }

    /// The coordinate transform in use.
    pub fn geo(&self) -> GeoTransform {
        self.geo
    }

    /// Global cell offset of a tile's origin.
    pub fn tile_origin(&self, tile: TileId) -> (usize, usize) {
        let t = tile.index();
        (
            (t % self.tiles_x) * self.tile_nx,
            (t / self.tiles_x) * self.tile_ny,
        )
    }

    /// Tile-local coordinates to global index coordinates.
    pub fn to_global(&self, tile: TileId, x: f64, y: f64) -> (f64, f64) {
        let (ox, oy) = self.tile_origin(tile);
        (ox as f64 + x, oy as f64 + y)
    }

    /// Global index coordinates to a resolved tile-local location.
    pub fn from_global(&self, gx: f64, gy: f64) -> Location {
        let (gnx, gny) = self.global_shape();
        let gx = if self.periodic_x {
            gx.rem_euclid(gnx as f64)
        } else {
            gx
        };
        let gy = if self.periodic_y {
            gy.rem_euclid(gny as f64)
        } else {
            gy
        };
        let tx = ((gx / self.tile_nx as f64).floor().max(0.0) as usize).min(self.tiles_x - 1);
        let ty = ((gy / self.tile_ny as f64).floor().max(0.0) as usize).min(self.tiles_y - 1);
        let tile = TileId((ty * self.tiles_x + tx) as u32);
        let (ox, oy) = self.tile_origin(tile);
        self.update_location(tile, gx - ox as f64, gy - oy as f64)
    }
}

impl Mesh for TiledMesh {
    fn tile_count(&self) -> usize {
        self.tiles_x * self.tiles_y
    }

    fn tile_shape(&self) -> (usize, usize) {
        (self.tile_nx, self.tile_ny)
    }

    fn neighbour(&self, tile: TileId, side: Side) -> Option<TileId> {
        let t = tile.index();
        if t >= self.tile_count() {
            return None;
        }
        let (tx, ty) = ((t % self.tiles_x) as i64, (t / self.tiles_x) as i64);
        let (nx, ny) = match side {
            Side::West => (tx - 1, ty),
            Side::East => (tx + 1, ty),
            Side::South => (tx, ty - 1),
            Side::North => (tx, ty + 1),
        };
        let nx = step(nx, self.tiles_x, self.periodic_x)?;
        let ny = step(ny, self.tiles_y, self.periodic_y)?;
        Some(TileId((ny * self.tiles_x + nx) as u32))
    }

    fn lonlat(&self, tile: TileId, x: f64, y: f64) -> (f64, f64) {
        let (gx, gy) = self.to_global(tile, x, y);
        (
            self.geo.lon0 + gx * self.geo.dlon,
            self.geo.lat0 + gy * self.geo.dlat,
        )
    }
}

fn step(v: i64, n: usize, periodic: bool) -> Option<usize> {
    let n = n as i64;
    if (0..n).contains(&v) {
        Some(v as usize)
    } else if periodic {
        Some(v.rem_euclid(n) as usize)
    } else {
        None
    }
}
