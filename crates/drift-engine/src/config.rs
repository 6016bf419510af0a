//! Particle set construction, validation, and error types.
//!
//! [`ParticleSetBuilder`] collects the initial states, identifiers and
//! strategy objects for a [`ParticleSet`]. Every default is a value the
//! builder creates; nothing is process-wide.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use drift_core::{ParticleId, Real, Record, TileId};
use drift_field::{FieldInterpolant, VelocityField, VelocityFunction};
use drift_solver::{DormandPrince, Solver};
use indexmap::{IndexMap, IndexSet};
use ndarray::Array2;

use crate::particles::ParticleSet;
use crate::postprocess::{FieldRows, Postprocess};

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected while building or re-positioning a particle set.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// The position array has no columns.
    NoParticles,
    /// The position array has no rows.
    EmptyState,
    /// The position array's row count does not fit the parameters.
    StateShape {
        /// Rows the parameters require.
        expected_rows: usize,
        /// Rows supplied.
        got_rows: usize,
    },
    /// A replacement position array changed the particle count.
    ParticleCount {
        /// Particles in the set.
        expected: usize,
        /// Columns supplied.
        got: usize,
    },
    /// The id list length differs from the particle count.
    IdCountMismatch {
        /// Number of particles.
        expected: usize,
        /// Number of ids supplied.
        got: usize,
    },
    /// The same id was given to two particles.
    DuplicateId {
        /// The repeated id.
        id: ParticleId,
    },
    /// A starting position is NaN or infinite.
    NonFinitePosition {
        /// Column of the offending particle.
        particle: usize,
    },
    /// A mesh particle starts on a tile the mesh does not have.
    InvalidTile {
        /// Column of the offending particle.
        particle: usize,
        /// The tile it names.
        tile: TileId,
        /// Tiles in the mesh.
        tile_count: usize,
    },
    /// A custom parameter bundle needs an explicit velocity function.
    MissingVelocityFunction,
    /// A custom parameter bundle needs an explicit postprocessor.
    MissingPostprocess,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoParticles => write!(f, "position array has no particles"),
            Self::EmptyState => write!(f, "position array has no state rows"),
            Self::StateShape {
                expected_rows,
                got_rows,
            } => write!(
                f,
                "position array has {got_rows} state rows, parameters need {expected_rows}"
            ),
            Self::ParticleCount { expected, got } => {
                write!(f, "position array has {got} particles, set has {expected}")
            }
            Self::IdCountMismatch { expected, got } => {
                write!(f, "{got} ids supplied for {expected} particles")
            }
            Self::DuplicateId { id } => write!(f, "particle id {id} is used twice"),
            Self::NonFinitePosition { particle } => {
                write!(f, "particle {particle} has a non-finite position")
            }
            Self::InvalidTile {
                particle,
                tile,
                tile_count,
            } => write!(
                f,
                "particle {particle} starts on tile {tile}, mesh has {tile_count} tiles"
            ),
            Self::MissingVelocityFunction => {
                write!(f, "custom parameters need an explicit velocity function")
            }
            Self::MissingPostprocess => {
                write!(f, "custom parameters need an explicit postprocessor")
            }
        }
    }
}

impl Error for ConfigError {}

// ── ParticleSetBuilder ─────────────────────────────────────────────

/// Builder for [`ParticleSet`].
///
/// # Defaults
///
/// | Setting | Default |
/// |---------|---------|
/// | ids | `1..=n` ([`ParticleId::sequence`]) |
/// | velocity function | [`FieldInterpolant`] (`build` only) |
/// | solver | [`DormandPrince`] with `rtol = atol = 1e-8`, saving endpoints |
/// | postprocessor | [`FieldRows`] (`build` only) |
/// | diagnostics, metadata | empty |
///
/// Use [`build`](Self::build) with [`VelocityField`] parameters and
/// [`build_custom`](Self::build_custom) with any other bundle, which
/// requires the velocity function and postprocessor to be set.
pub struct ParticleSetBuilder<T, P> {
    params: Arc<P>,
    position: Array2<T>,
    ids: Option<Vec<ParticleId>>,
    velocity_fn: Option<Arc<dyn VelocityFunction<T, P>>>,
    solver: Option<Arc<dyn Solver<T>>>,
    postprocess: Option<Arc<dyn Postprocess<T, P>>>,
    diagnostics: IndexMap<String, String>,
    metadata: IndexMap<String, String>,
}

impl<T, P> fmt::Debug for ParticleSetBuilder<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleSetBuilder")
            .field("shape", &self.position.shape())
            .field("ids", &self.ids.as_ref().map(Vec::len))
            .field("velocity_fn", &self.velocity_fn.is_some())
            .field("solver", &self.solver.as_ref().map(|s| s.name().to_string()))
            .field("postprocess", &self.postprocess.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Real, P: Send + Sync + 'static> ParticleSetBuilder<T, P> {
    /// Start from shared parameters and a `(state_dim, n_particles)`
    /// position array.
    pub fn new(params: Arc<P>, position: Array2<T>) -> Self {
        Self {
            params,
            position,
            ids: None,
            velocity_fn: None,
            solver: None,
            postprocess: None,
            diagnostics: IndexMap::new(),
            metadata: IndexMap::new(),
        }
    }

    /// Explicit particle ids, one per column.
    pub fn ids(mut self, ids: Vec<ParticleId>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// Replace the velocity function.
    pub fn velocity_fn(mut self, velocity_fn: impl VelocityFunction<T, P> + 'static) -> Self {
        self.velocity_fn = Some(Arc::new(velocity_fn));
        self
    }

    /// Replace the solver.
    pub fn solver(mut self, solver: impl Solver<T> + 'static) -> Self {
        self.solver = Some(Arc::new(solver));
        self
    }

    /// Share an existing solver.
    pub fn shared_solver(mut self, solver: Arc<dyn Solver<T>>) -> Self {
        self.solver = Some(solver);
        self
    }

    /// Replace the postprocessor.
    pub fn postprocess(mut self, postprocess: impl Postprocess<T, P> + 'static) -> Self {
        self.postprocess = Some(Arc::new(postprocess));
        self
    }

    /// Add a free-form diagnostic entry. The engine never reads these.
    pub fn diagnostic(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.diagnostics.insert(key.into(), value.into());
        self
    }

    /// Add a free-form metadata entry. The engine never reads these.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Build with explicit strategies for a custom parameter bundle.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the velocity function or postprocessor is unset,
    /// or if the positions or ids fail validation.
    pub fn build_custom(self) -> Result<ParticleSet<T, P>, ConfigError> {
        let velocity_fn = self
            .velocity_fn
            .clone()
            .ok_or(ConfigError::MissingVelocityFunction)?;
        let postprocess = self
            .postprocess
            .clone()
            .ok_or(ConfigError::MissingPostprocess)?;
        self.finish(velocity_fn, postprocess)
    }

    fn finish(
        self,
        velocity_fn: Arc<dyn VelocityFunction<T, P>>,
        postprocess: Arc<dyn Postprocess<T, P>>,
    ) -> Result<ParticleSet<T, P>, ConfigError> {
        let (rows, n) = self.position.dim();
        if rows == 0 {
            return Err(ConfigError::EmptyState);
        }
        if n == 0 {
            return Err(ConfigError::NoParticles);
        }
        if let Some(particle) = self
            .position
            .columns()
            .into_iter()
            .position(|c| c.iter().any(|v| !v.is_finite()))
        {
            return Err(ConfigError::NonFinitePosition { particle });
        }
        let ids = match self.ids {
            Some(ids) => {
                check_ids(&ids, n)?;
                ids
            }
            None => ParticleId::sequence(n),
        };
        let solver = self
            .solver
            .unwrap_or_else(|| Arc::new(DormandPrince::<T>::default()) as Arc<dyn Solver<T>>);
        Ok(ParticleSet::from_parts(
            self.position,
            Record::new(),
            ids,
            self.params,
            velocity_fn,
            solver,
            postprocess,
            self.diagnostics,
            self.metadata,
        ))
    }
}

impl<T: Real> ParticleSetBuilder<T, VelocityField<T>> {
    /// Build for a velocity field, filling in the default strategies.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the position rows do not match the field's state
    /// layout, a mesh particle names a missing tile, or the ids are not
    /// one unique id per particle.
    pub fn build(self) -> Result<ParticleSet<T>, ConfigError> {
        let expected_rows = self.params.state_dim();
        let got_rows = self.position.nrows();
        if got_rows != expected_rows {
            return Err(ConfigError::StateShape {
                expected_rows,
                got_rows,
            });
        }
        check_tiles(&self.params, &self.position)?;
        let velocity_fn = self
            .velocity_fn
            .clone()
            .unwrap_or_else(|| Arc::new(FieldInterpolant) as Arc<dyn VelocityFunction<T, _>>);
        let postprocess = self
            .postprocess
            .clone()
            .unwrap_or_else(|| Arc::new(FieldRows) as Arc<dyn Postprocess<T, _>>);
        self.finish(velocity_fn, postprocess)
    }
}

pub(crate) fn check_ids(ids: &[ParticleId], n: usize) -> Result<(), ConfigError> {
    if ids.len() != n {
        return Err(ConfigError::IdCountMismatch {
            expected: n,
            got: ids.len(),
        });
    }
    let mut seen = IndexSet::with_capacity(n);
    for &id in ids {
        if !seen.insert(id) {
            return Err(ConfigError::DuplicateId { id });
        }
    }
    Ok(())
}

pub(crate) fn check_tiles<T: Real>(
    field: &VelocityField<T>,
    position: &Array2<T>,
) -> Result<(), ConfigError> {
    let tile_count = match field {
        VelocityField::Mesh2D(f) => f.mesh().tile_count(),
        VelocityField::Mesh3D(f) => f.mesh().tile_count(),
        _ => return Ok(()),
    };
    let last = position.nrows() - 1;
    for (particle, &v) in position.row(last).iter().enumerate() {
        let tile = TileId::from_real(v);
        if tile.index() >= tile_count || v < T::ZERO {
            return Err(ConfigError::InvalidTile {
                particle,
                tile,
                tile_count,
            });
        }
    }
    Ok(())
}
