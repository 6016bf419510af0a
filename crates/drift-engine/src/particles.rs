//! The [`ParticleSet`]: particle states, their record, and the strategies
//! that advance them.
//!
//! # Ownership model
//!
//! Parameters and strategies are shared through `Arc`, so many sets can
//! read one velocity field concurrently. Integrating takes `&mut self`,
//! which rules out interleaved integrations of the same set.

use std::fmt;
use std::sync::Arc;

use drift_core::{ParticleId, Real, Record};
use drift_field::{Components, FieldError, VelocityField, VelocityFunction};
use drift_solver::Solver;
use indexmap::IndexMap;
use ndarray::Array2;

use crate::config::{ConfigError, ParticleSetBuilder};
use crate::postprocess::Postprocess;

// Compile-time assertion: a particle set can move to and be shared
// between threads.
const _: () = {
    #[allow(dead_code)]
    fn assert_send_sync<S: Send + Sync>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send_sync::<ParticleSet<f64>>();
        assert_send_sync::<ParticleSet<f32>>();
    }
};

/// A group of particles advected together.
///
/// `position` has shape `(state_dim, n_particles)`: one column per
/// particle, laid out as the velocity function expects (`[x, y]`,
/// `[x, y, z]`, or with a trailing tile-id row on meshes).
pub struct ParticleSet<T, P = VelocityField<T>> {
    pub(crate) position: Array2<T>,
    pub(crate) record: Record<T>,
    pub(crate) ids: Vec<ParticleId>,
    pub(crate) params: Arc<P>,
    pub(crate) velocity_fn: Arc<dyn VelocityFunction<T, P>>,
    pub(crate) solver: Arc<dyn Solver<T>>,
    pub(crate) postprocess: Arc<dyn Postprocess<T, P>>,
    diagnostics: IndexMap<String, String>,
    metadata: IndexMap<String, String>,
}

impl<T: Real, P> fmt::Debug for ParticleSet<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParticleSet")
            .field("shape", &self.position.shape())
            .field("records", &self.record.len())
            .field("solver", &self.solver.name())
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl<T: Real> ParticleSet<T> {
    /// Start building a set around a velocity field.
    ///
    /// Finish with [`build`](ParticleSetBuilder::build) to get the default
    /// strategies.
    pub fn for_field(
        field: impl Into<VelocityField<T>>,
        position: Array2<T>,
    ) -> ParticleSetBuilder<T, VelocityField<T>> {
        ParticleSetBuilder::new(Arc::new(field.into()), position)
    }

    /// Step the forcing: the field's end snapshot becomes its start and
    /// `next` is installed as the new end at `t_next`.
    ///
    /// Position, record and strategies are kept, so the following
    /// [`integrate`](Self::integrate) continues the same trajectories.
    /// Other sets sharing the old field keep reading it.
    ///
    /// # Errors
    ///
    /// As [`VelocityField::next_window`]; the set is unchanged on error.
    pub fn next_window(&mut self, next: Components<T>, t_next: T) -> Result<(), FieldError> {
        let field = VelocityField::clone(&self.params).next_window(next, t_next)?;
        self.params = Arc::new(field);
        Ok(())
    }
}

impl<T: Real, P: Send + Sync + 'static> ParticleSet<T, P> {
    /// Start building a set around `params`.
    pub fn builder(params: P, position: Array2<T>) -> ParticleSetBuilder<T, P> {
        ParticleSetBuilder::new(Arc::new(params), position)
    }

    /// Start building a set around parameters shared with other sets.
    pub fn builder_shared(params: Arc<P>, position: Array2<T>) -> ParticleSetBuilder<T, P> {
        ParticleSetBuilder::new(params, position)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        position: Array2<T>,
        record: Record<T>,
        ids: Vec<ParticleId>,
        params: Arc<P>,
        velocity_fn: Arc<dyn VelocityFunction<T, P>>,
        solver: Arc<dyn Solver<T>>,
        postprocess: Arc<dyn Postprocess<T, P>>,
        diagnostics: IndexMap<String, String>,
        metadata: IndexMap<String, String>,
    ) -> Self {
        Self {
            position,
            record,
            ids,
            params,
            velocity_fn,
            solver,
            postprocess,
            diagnostics,
            metadata,
        }
    }

    /// Current states, `(state_dim, n_particles)`.
    pub fn position(&self) -> &Array2<T> {
        &self.position
    }

    /// Every sample recorded so far.
    pub fn record(&self) -> &Record<T> {
        &self.record
    }

    /// Particle ids in column order.
    pub fn ids(&self) -> &[ParticleId] {
        &self.ids
    }

    /// The parameter bundle.
    pub fn params(&self) -> &Arc<P> {
        &self.params
    }

    /// The solver.
    pub fn solver(&self) -> &Arc<dyn Solver<T>> {
        &self.solver
    }

    /// The velocity function.
    pub fn velocity_fn(&self) -> &Arc<dyn VelocityFunction<T, P>> {
        &self.velocity_fn
    }

    /// The postprocessor.
    pub fn postprocess(&self) -> &Arc<dyn Postprocess<T, P>> {
        &self.postprocess
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always `false`: a set holds at least one particle.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Rows per particle in [`position`](Self::position).
    pub fn state_dim(&self) -> usize {
        self.position.nrows()
    }

    /// Free-form diagnostics.
    pub fn diagnostics(&self) -> &IndexMap<String, String> {
        &self.diagnostics
    }

    /// Mutable diagnostics.
    pub fn diagnostics_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.diagnostics
    }

    /// Free-form metadata.
    pub fn metadata(&self) -> &IndexMap<String, String> {
        &self.metadata
    }

    /// Mutable metadata.
    pub fn metadata_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.metadata
    }

    /// A set with the same ids, parameters and strategies, a zeroed
    /// position of the same shape, and an empty record.
    pub fn similar(&self) -> Self {
        Self::from_parts(
            Array2::from_elem(self.position.dim(), T::ZERO),
            Record::new(),
            self.ids.clone(),
            Arc::clone(&self.params),
            Arc::clone(&self.velocity_fn),
            Arc::clone(&self.solver),
            Arc::clone(&self.postprocess),
            self.diagnostics.clone(),
            self.metadata.clone(),
        )
    }

    /// Replace the current states, keeping the record.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the shape differs from the current position or a
    /// value is not finite.
    pub fn reset_position(&mut self, position: Array2<T>) -> Result<(), ConfigError> {
        let (rows, n) = position.dim();
        if rows != self.state_dim() {
            return Err(ConfigError::StateShape {
                expected_rows: self.state_dim(),
                got_rows: rows,
            });
        }
        if n != self.len() {
            return Err(ConfigError::ParticleCount {
                expected: self.len(),
                got: n,
            });
        }
        if let Some(particle) = position
            .columns()
            .into_iter()
            .position(|c| c.iter().any(|v| !v.is_finite()))
        {
            return Err(ConfigError::NonFinitePosition { particle });
        }
        self.position = position;
        Ok(())
    }

    /// Forget every recorded sample.
    pub fn clear_record(&mut self) {
        self.record.clear();
    }
}
