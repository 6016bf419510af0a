//! Turning solver output into record rows.

use drift_core::{IntegrateError, ParticleId, Real, Row, TileId, TimeWindow};
use drift_field::VelocityField;
use drift_grid::wrap_coord;
use drift_solver::Solution;

/// Converts a [`Solution`] into [`Row`]s.
///
/// Rows come out grouped by sample time, particles in `ids` order within
/// each group. Implementations must not mutate their inputs and return
/// fresh rows on every call.
pub trait Postprocess<T, P: ?Sized>: Send + Sync {
    /// Rows for every sample of every particle.
    fn rows(
        &self,
        solution: &Solution<T>,
        params: &P,
        ids: &[ParticleId],
        window: TimeWindow<T>,
    ) -> Result<Vec<Row<T>>, IntegrateError>;
}

fn check_dim<T: Real>(
    solution: &Solution<T>,
    ids: &[ParticleId],
    per_particle: usize,
) -> Result<(), IntegrateError> {
    let expected = ids.len() * per_particle;
    if solution.dim() != expected {
        return Err(IntegrateError::StateShape {
            expected,
            got: solution.dim(),
        });
    }
    Ok(())
}

/// The default postprocessor for [`VelocityField`] parameters.
///
/// Array grids report `x` and `y` wrapped into the periodic domain. Mesh
/// grids report tile-local `x` and `y` plus longitude, latitude and tile.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldRows;

impl<T: Real> Postprocess<T, VelocityField<T>> for FieldRows {
    fn rows(
        &self,
        solution: &Solution<T>,
        field: &VelocityField<T>,
        ids: &[ParticleId],
        _window: TimeWindow<T>,
    ) -> Result<Vec<Row<T>>, IntegrateError> {
        let dim = field.state_dim();
        check_dim(solution, ids, dim)?;
        let mut rows = Vec::with_capacity(solution.len() * ids.len());
        for (t, state) in solution.iter() {
            for (&id, s) in ids.iter().zip(state.chunks_exact(dim)) {
                rows.push(field_row(field, id, t, s));
            }
        }
        Ok(rows)
    }
}

fn field_row<T: Real>(field: &VelocityField<T>, id: ParticleId, t: T, s: &[T]) -> Row<T> {
    match field {
        VelocityField::Array2D(f) => {
            let (nx, ny) = f.shape();
            Row::xy(id, wrap_coord(s[0], nx), wrap_coord(s[1], ny), t)
        }
        VelocityField::Array3D(f) => {
            let (nx, ny, _) = f.shape();
            Row {
                z: Some(s[2]),
                ..Row::xy(id, wrap_coord(s[0], nx), wrap_coord(s[1], ny), t)
            }
        }
        VelocityField::Mesh2D(f) => mesh_row(f.mesh().as_ref(), id, t, s, None),
        VelocityField::Mesh3D(f) => mesh_row(f.mesh().as_ref(), id, t, s, Some(s[2])),
    }
}

fn mesh_row<T: Real>(
    mesh: &dyn drift_grid::Mesh,
    id: ParticleId,
    t: T,
    s: &[T],
    z: Option<T>,
) -> Row<T> {
    let fid = TileId::from_real(s[s.len() - 1]);
    let (lon, lat) = mesh.lonlat(fid, s[0].to_f64(), s[1].to_f64());
    Row {
        z,
        lon: Some(T::from_f64(lon)),
        lat: Some(T::from_f64(lat)),
        fid: Some(fid),
        ..Row::xy(id, s[0], s[1], t)
    }
}

/// Identity postprocessor: the leading `dims` state components become
/// `x`, `y` and (for `dims == 3`) `z`.
///
/// Works with any parameter bundle. Extra state components are ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawRows {
    /// Spatial dimensions to report, 2 or 3.
    pub dims: usize,
    /// State components per particle.
    pub state_dim: usize,
}

impl RawRows {
    /// Report `dims` coordinates from states of length `dims`.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            state_dim: dims,
        }
    }

    /// Report `dims` coordinates from longer per-particle states.
    pub fn with_state_dim(mut self, state_dim: usize) -> Self {
        self.state_dim = state_dim;
        self
    }
}

impl<T: Real, P: ?Sized> Postprocess<T, P> for RawRows {
    fn rows(
        &self,
        solution: &Solution<T>,
        _params: &P,
        ids: &[ParticleId],
        _window: TimeWindow<T>,
    ) -> Result<Vec<Row<T>>, IntegrateError> {
        if !(2..=3).contains(&self.dims) || self.state_dim < self.dims {
            return Err(IntegrateError::Postprocess {
                reason: format!(
                    "cannot report {} coordinates from {} state components",
                    self.dims, self.state_dim
                ),
            });
        }
        check_dim(solution, ids, self.state_dim)?;
        let mut rows = Vec::with_capacity(solution.len() * ids.len());
        for (t, state) in solution.iter() {
            for (&id, s) in ids.iter().zip(state.chunks_exact(self.state_dim)) {
                rows.push(Row {
                    z: (self.dims == 3).then(|| s[2]),
                    ..Row::xy(id, s[0], s[1], t)
                });
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_field::{tiles_from_global, ArrayField2, MeshField2};
    use drift_grid::{GeoTransform, TiledMesh};
    use ndarray::Array2;
    use std::sync::Arc;

    fn two_samples(dim: usize, a: &[f64], b: &[f64]) -> Solution<f64> {
        let mut sol = Solution::new(dim);
        sol.push(0.0, a);
        sol.push(1.0, b);
        sol
    }

    fn array_field() -> VelocityField<f64> {
        let z = Array2::zeros((10, 5));
        ArrayField2::stationary(z.clone(), z, (0.0, 1.0))
            .unwrap()
            .into()
    }

    #[test]
    fn array_rows_wrap_into_domain() {
        let ids = ParticleId::sequence(2);
        let sol = two_samples(4, &[1.0, 2.0, 3.0, 4.0], &[11.0, -1.0, 3.5, 4.5]);
        let rows = FieldRows
            .rows(&sol, &array_field(), &ids, TimeWindow::new(0.0, 1.0))
            .unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0], Row::xy(ParticleId(1), 1.0, 2.0, 0.0));
        assert_eq!(rows[1], Row::xy(ParticleId(2), 3.0, 4.0, 0.0));
        assert_eq!(rows[2], Row::xy(ParticleId(1), 1.0, 4.0, 1.0));
        assert_eq!(rows[3].t, 1.0);
    }

    #[test]
    fn mesh_rows_carry_lonlat_and_tile() {
        let tiled = TiledMesh::new(2, 1, 4, 4)
            .unwrap()
            .with_geo(GeoTransform {
                lon0: 10.0,
                lat0: -5.0,
                dlon: 0.5,
                dlat: 0.25,
            })
            .unwrap();
        let z = tiles_from_global(&tiled, &Array2::zeros((8, 4))).unwrap();
        let field: VelocityField<f64> =
            MeshField2::stationary(Arc::new(tiled), z.clone(), z, (0.0, 1.0))
                .unwrap()
                .into();
        let ids = [ParticleId(7)];
        let mut sol = Solution::new(3);
        sol.push(0.0, &[2.0, 2.0, 1.0]);
        let rows = FieldRows
            .rows(&sol, &field, &ids, TimeWindow::new(0.0, 1.0))
            .unwrap();
        let row = &rows[0];
        assert_eq!((row.x, row.y), (2.0, 2.0));
        assert_eq!(row.fid, Some(TileId(1)));
        assert_eq!(row.lon, Some(10.0 + 0.5 * 6.0));
        assert_eq!(row.lat, Some(-5.0 + 0.25 * 2.0));
    }

    #[test]
    fn field_rows_reject_wrong_state_length() {
        let ids = ParticleId::sequence(2);
        let sol = two_samples(3, &[0.0; 3], &[0.0; 3]);
        let err = FieldRows
            .rows(&sol, &array_field(), &ids, TimeWindow::new(0.0, 1.0))
            .unwrap_err();
        assert_eq!(err, IntegrateError::StateShape { expected: 4, got: 3 });
    }

    #[test]
    fn raw_rows_copy_leading_components() {
        let ids = ParticleId::sequence(1);
        let sol = two_samples(4, &[1.0, 2.0, 3.0, 9.0], &[4.0, 5.0, 6.0, 9.0]);
        let raw = RawRows::new(3).with_state_dim(4);
        let window = TimeWindow::new(0.0, 1.0);
        let rows = Postprocess::<f64, ()>::rows(&raw, &sol, &(), &ids, window).unwrap();
        assert_eq!(rows[1].z, Some(6.0));
        assert_eq!((rows[1].x, rows[1].y), (4.0, 5.0));
        assert_eq!(rows[1].fid, None);
    }

    #[test]
    fn raw_rows_reject_bad_dims() {
        let ids = ParticleId::sequence(1);
        let sol = two_samples(1, &[1.0], &[2.0]);
        let window = TimeWindow::new(0.0, 1.0);
        let err =
            Postprocess::<f64, ()>::rows(&RawRows::new(1), &sol, &(), &ids, window).unwrap_err();
        assert!(matches!(err, IntegrateError::Postprocess { .. }));
    }
}
