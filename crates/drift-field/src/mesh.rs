//! Multi-tile velocity fields.

use crate::error::FieldError;
use crate::field::{check_shapes, check_window};
use crate::interp::{bilinear, in_time, trilinear, Snapshot, CENTRE, FACE};
use drift_core::{Real, TileId, TimeWindow};
use drift_grid::{resolve_axis, EdgeBehavior, Mesh, TiledMesh};
use ndarray::{Array2, Array3, Axis, Slice};
use std::sync::Arc;

fn tiled2<'a, T: Real>(
    mesh: &'a dyn Mesh,
    tiles: &'a [Array2<T>],
    tile: TileId,
) -> impl Fn(i64, i64) -> T + 'a {
    move |i, j| {
        let (t, i, j) = mesh.resolve(tile, i, j);
        tiles
            .get(t.index())
            .map_or(T::from_f64(f64::NAN), |g| g[[i, j]])
    }
}

fn tiled3<'a, T: Real>(
    mesh: &'a dyn Mesh,
    tiles: &'a [Array3<T>],
    tile: TileId,
    nz: usize,
) -> impl Fn(i64, i64, i64) -> T + 'a {
    move |i, j, k| {
        let (t, i, j) = mesh.resolve(tile, i, j);
        let k = resolve_axis(k, nz, EdgeBehavior::Clamp);
        tiles
            .get(t.index())
            .map_or(T::from_f64(f64::NAN), |g| g[[i, j, k]])
    }
}

fn check_tiles<A>(
    mesh: &dyn Mesh,
    expected: &[usize],
    components: &[(&'static str, &[A])],
    shape: impl Fn(&A) -> &[usize],
) -> Result<(), FieldError> {
    for &(component, tiles) in components {
        if tiles.len() != mesh.tile_count() {
            return Err(FieldError::TileCountMismatch {
                component,
                expected: mesh.tile_count(),
                got: tiles.len(),
            });
        }
        for tile in tiles {
            check_shapes(expected, &[(component, shape(tile))])?;
        }
    }
    Ok(())
}

/// Rewrite `state[0..2]` and `state[fid]` after a possible tile crossing.
fn relocate<T: Real>(mesh: &dyn Mesh, state: &mut [T], fid: usize) {
    let tile = TileId::from_real(state[fid]);
    let (x, y) = (state[0].to_f64(), state[1].to_f64());
    let loc = mesh.update_location(tile, x, y);
    if loc.tile != tile || loc.x != x || loc.y != y {
        let (nx, ny) = mesh.tile_shape();
        state[0] = below(T::from_f64(loc.x), nx);
        state[1] = below(T::from_f64(loc.y), ny);
        state[fid] = loc.tile.to_real();
    }
}

/// Keep a coordinate narrowed to `T` strictly below the extent `n`.
fn below<T: Real>(v: T, n: usize) -> T {
    let n = T::from_usize(n);
    if v >= n {
        n * (T::ONE - T::epsilon())
    } else {
        v
    }
}

/// Cut a global array into per-tile arrays following a [`TiledMesh`] layout.
///
/// # Errors
///
/// Returns `Err` if the array's extent is not the mesh's global extent.
pub fn tiles_from_global<T: Real>(
    mesh: &TiledMesh,
    global: &Array2<T>,
) -> Result<Vec<Array2<T>>, FieldError> {
    let (gnx, gny) = mesh.global_shape();
    check_shapes(&[gnx, gny], &[("global", global.shape())])?;
    let (nx, ny) = mesh.tile_shape();
    Ok((0..mesh.tile_count())
        .map(|t| {
            let (ox, oy) = mesh.tile_origin(TileId(t as u32));
            global
                .slice_axis(Axis(0), Slice::from(ox..ox + nx))
                .slice_axis(Axis(1), Slice::from(oy..oy + ny))
                .to_owned()
        })
        .collect())
}

/// 2D velocity on a multi-tile mesh.
///
/// Each component holds one `(nx, ny)` array per tile with the same
/// C-grid staggering as [`ArrayField2`](crate::ArrayField2). Stencils that
/// cross a tile edge read from the neighbouring tile through
/// [`Mesh::resolve`]. Particle states are `[x, y, fid]` in tile-local
/// index coordinates.
#[derive(Clone, Debug)]
pub struct MeshField2<T> {
    mesh: Arc<dyn Mesh>,
    u0: Vec<Array2<T>>,
    v0: Vec<Array2<T>>,
    u1: Vec<Array2<T>>,
    v1: Vec<Array2<T>>,
    time_bounds: TimeWindow<T>,
}

impl<T: Real> MeshField2<T> {
    /// Build from per-tile snapshots.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a component does not hold one grid per tile, a tile
    /// grid is not `mesh.tile_shape()`, or the window is invalid.
    pub fn new(
        mesh: Arc<dyn Mesh>,
        u0: Vec<Array2<T>>,
        v0: Vec<Array2<T>>,
        u1: Vec<Array2<T>>,
        v1: Vec<Array2<T>>,
        time_bounds: impl Into<TimeWindow<T>>,
    ) -> Result<Self, FieldError> {
        let time_bounds = time_bounds.into();
        check_window(&time_bounds)?;
        let (nx, ny) = mesh.tile_shape();
        check_tiles(
            mesh.as_ref(),
            &[nx, ny],
            &[
                ("u0", u0.as_slice()),
                ("v0", v0.as_slice()),
                ("u1", u1.as_slice()),
                ("v1", v1.as_slice()),
            ],
            |a| a.shape(),
        )?;
        Ok(Self {
            mesh,
            u0,
            v0,
            u1,
            v1,
            time_bounds,
        })
    }

    /// A field whose two snapshots are the same.
    pub fn stationary(
        mesh: Arc<dyn Mesh>,
        u: Vec<Array2<T>>,
        v: Vec<Array2<T>>,
        time_bounds: impl Into<TimeWindow<T>>,
    ) -> Result<Self, FieldError> {
        Self::new(mesh, u.clone(), v.clone(), u, v, time_bounds)
    }

    /// The mesh topology.
    pub fn mesh(&self) -> &Arc<dyn Mesh> {
        &self.mesh
    }

    /// The bracketing window.
    pub fn time_bounds(&self) -> TimeWindow<T> {
        self.time_bounds
    }

    /// The same snapshots bracketed by another window.
    pub fn with_time_bounds(mut self, window: TimeWindow<T>) -> Result<Self, FieldError> {
        check_window(&window)?;
        self.time_bounds = window;
        Ok(self)
    }

    /// Slide forward one window, installing `(u, v)` at `t_next`.
    pub fn next_window(
        self,
        u_next: Vec<Array2<T>>,
        v_next: Vec<Array2<T>>,
        t_next: T,
    ) -> Result<Self, FieldError> {
        let window = TimeWindow::new(self.time_bounds.end, t_next);
        Self::new(self.mesh, self.u1, self.v1, u_next, v_next, window)
    }

    /// Move a `[x, y, fid]` state onto the tile holding it.
    pub fn locate(&self, state: &mut [T]) {
        relocate(self.mesh.as_ref(), state, 2);
    }

    /// Interpolated `[u, v]` for a `[x, y, fid]` state at time `t`.
    ///
    /// An out-of-range tile id yields NaN so the solver reports it.
    pub fn velocity(&self, state: &[T], t: T) -> [T; 2] {
        let (x, y) = (state[0], state[1]);
        let tile = TileId::from_real(state[2]);
        let mesh = self.mesh.as_ref();
        in_time(&self.time_bounds, t, |s| {
            let (u, v) = match s {
                Snapshot::Start => (&self.u0, &self.v0),
                Snapshot::End => (&self.u1, &self.v1),
            };
            [
                bilinear(x, y, [FACE, CENTRE], tiled2(mesh, u, tile)),
                bilinear(x, y, [CENTRE, FACE], tiled2(mesh, v, tile)),
            ]
        })
    }
}

/// 3D velocity on a multi-tile mesh with a closed vertical axis.
///
/// Per-tile arrays are `(nx, ny, nz)`; states are `[x, y, z, fid]`.
#[derive(Clone, Debug)]
pub struct MeshField3<T> {
    mesh: Arc<dyn Mesh>,
    nz: usize,
    u0: Vec<Array3<T>>,
    v0: Vec<Array3<T>>,
    w0: Vec<Array3<T>>,
    u1: Vec<Array3<T>>,
    v1: Vec<Array3<T>>,
    w1: Vec<Array3<T>>,
    time_bounds: TimeWindow<T>,
}

impl<T: Real> MeshField3<T> {
    /// Build from per-tile snapshots. The level count comes from `u0`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mesh: Arc<dyn Mesh>,
        u0: Vec<Array3<T>>,
        v0: Vec<Array3<T>>,
        w0: Vec<Array3<T>>,
        u1: Vec<Array3<T>>,
        v1: Vec<Array3<T>>,
        w1: Vec<Array3<T>>,
        time_bounds: impl Into<TimeWindow<T>>,
    ) -> Result<Self, FieldError> {
        let time_bounds = time_bounds.into();
        check_window(&time_bounds)?;
        let (nx, ny) = mesh.tile_shape();
        let nz = u0.first().map_or(0, |a| a.dim().2);
        check_tiles(
            mesh.as_ref(),
            &[nx, ny, nz],
            &[
                ("u0", u0.as_slice()),
                ("v0", v0.as_slice()),
                ("w0", w0.as_slice()),
                ("u1", u1.as_slice()),
                ("v1", v1.as_slice()),
                ("w1", w1.as_slice()),
            ],
            |a| a.shape(),
        )?;
        Ok(Self {
            mesh,
            nz,
            u0,
            v0,
            w0,
            u1,
            v1,
            w1,
            time_bounds,
        })
    }

    /// A field whose two snapshots are the same.
    pub fn stationary(
        mesh: Arc<dyn Mesh>,
        u: Vec<Array3<T>>,
        v: Vec<Array3<T>>,
        w: Vec<Array3<T>>,
        time_bounds: impl Into<TimeWindow<T>>,
    ) -> Result<Self, FieldError> {
        Self::new(
            mesh,
            u.clone(),
            v.clone(),
            w.clone(),
            u,
            v,
            w,
            time_bounds,
        )
    }

    /// The mesh topology.
    pub fn mesh(&self) -> &Arc<dyn Mesh> {
        &self.mesh
    }

    /// Number of vertical levels.
    pub fn levels(&self) -> usize {
        self.nz
    }

    /// The bracketing window.
    pub fn time_bounds(&self) -> TimeWindow<T> {
        self.time_bounds
    }

    /// The same snapshots bracketed by another window.
    pub fn with_time_bounds(mut self, window: TimeWindow<T>) -> Result<Self, FieldError> {
        check_window(&window)?;
        self.time_bounds = window;
        Ok(self)
    }

    /// Slide forward one window, installing `(u, v, w)` at `t_next`.
    pub fn next_window(
        self,
        u_next: Vec<Array3<T>>,
        v_next: Vec<Array3<T>>,
        w_next: Vec<Array3<T>>,
        t_next: T,
    ) -> Result<Self, FieldError> {
        let window = TimeWindow::new(self.time_bounds.end, t_next);
        Self::new(
            self.mesh, self.u1, self.v1, self.w1, u_next, v_next, w_next, window,
        )
    }

    /// Move a `[x, y, z, fid]` state onto the tile holding it.
    pub fn locate(&self, state: &mut [T]) {
        relocate(self.mesh.as_ref(), state, 3);
    }

    /// Interpolated `[u, v, w]` for a `[x, y, z, fid]` state at time `t`.
    pub fn velocity(&self, state: &[T], t: T) -> [T; 3] {
        let (x, y, z) = (state[0], state[1], state[2]);
        let tile = TileId::from_real(state[3]);
        let mesh = self.mesh.as_ref();
        let nz = self.nz;
        in_time(&self.time_bounds, t, |s| {
            let (u, v, w) = match s {
                Snapshot::Start => (&self.u0, &self.v0, &self.w0),
                Snapshot::End => (&self.u1, &self.v1, &self.w1),
            };
            [
                trilinear(x, y, z, [FACE, CENTRE, CENTRE], tiled3(mesh, u, tile, nz)),
                trilinear(x, y, z, [CENTRE, FACE, CENTRE], tiled3(mesh, v, tile, nz)),
                trilinear(x, y, z, [CENTRE, CENTRE, FACE], tiled3(mesh, w, tile, nz)),
            ]
        })
    }
}
