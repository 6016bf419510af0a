//! The integration driver.
//!
//! One call solves one window for every particle at once: the particle
//! columns are flattened into a single particle-major state vector, the
//! solver advances it, the postprocessor turns the saved samples into
//! rows, the record keeps the rows that are new, and the position is
//! overwritten with the state at the window end.

use std::time::Instant;

use drift_core::{IntegrateError, ParticleId, Real, Row, TimeWindow};
use drift_field::{TimeBounds, VelocityFunction};
use drift_solver::{Problem, Rhs, SolveStats, Solver};
use ndarray::Array2;
use tracing::debug;

use crate::metrics::IntegrateReport;
use crate::particles::ParticleSet;
use crate::postprocess::Postprocess;

/// Adapts a per-particle velocity function to a flat state vector.
struct ParticleRhs<'a, T, P> {
    params: &'a P,
    velocity_fn: &'a dyn VelocityFunction<T, P>,
    dim: usize,
}

impl<T: Real, P> Rhs<T> for ParticleRhs<'_, T, P> {
    fn eval(&self, t: T, u: &mut [T], du: &mut [T]) {
        for (state, out) in u.chunks_exact_mut(self.dim).zip(du.chunks_exact_mut(self.dim)) {
            self.velocity_fn.velocity(self.params, t, state, out);
        }
    }
}

/// Borrowed strategies for one solve; shared by the serial and parallel
/// paths.
pub(crate) struct Integrator<'a, T, P> {
    pub(crate) params: &'a P,
    pub(crate) velocity_fn: &'a dyn VelocityFunction<T, P>,
    pub(crate) solver: &'a dyn Solver<T>,
    pub(crate) postprocess: &'a dyn Postprocess<T, P>,
    pub(crate) dim: usize,
}

/// Outcome of solving one group of particles.
pub(crate) struct Chunk<T> {
    pub(crate) rows: Vec<Row<T>>,
    pub(crate) final_state: Vec<T>,
    pub(crate) times: Vec<T>,
    pub(crate) stats: SolveStats,
}

impl<T: Real, P> Integrator<'_, T, P> {
    pub(crate) fn run(
        &self,
        ids: &[ParticleId],
        u0: &[T],
        window: TimeWindow<T>,
    ) -> Result<Chunk<T>, IntegrateError> {
        let rhs = ParticleRhs {
            params: self.params,
            velocity_fn: self.velocity_fn,
            dim: self.dim,
        };
        let solution = self.solver.solve(&Problem::new(&rhs, u0, window))?;
        let final_state = solution.final_state().map(<[T]>::to_vec).unwrap_or_default();
        if final_state.len() != u0.len() {
            return Err(IntegrateError::StateShape {
                expected: u0.len(),
                got: final_state.len(),
            });
        }
        let rows = self
            .postprocess
            .rows(&solution, self.params, ids, window)?;
        Ok(Chunk {
            rows,
            final_state,
            times: solution.times().to_vec(),
            stats: solution.stats(),
        })
    }
}

/// Particle-major flat copy of a `(dim, n)` position array.
pub(crate) fn flatten<T: Real>(position: &Array2<T>) -> Vec<T> {
    position.t().iter().copied().collect()
}

/// Inverse of [`flatten`].
pub(crate) fn unflatten<T: Real>(
    flat: Vec<T>,
    dim: usize,
    n: usize,
) -> Result<Array2<T>, IntegrateError> {
    let got = flat.len();
    Array2::from_shape_vec((n, dim), flat)
        .map(|a| a.reversed_axes().as_standard_layout().into_owned())
        .map_err(|_| IntegrateError::StateShape {
            expected: dim * n,
            got,
        })
}

impl<T: Real, P: Send + Sync + 'static> ParticleSet<T, P> {
    pub(crate) fn integrator(&self) -> Integrator<'_, T, P> {
        Integrator {
            params: &self.params,
            velocity_fn: self.velocity_fn.as_ref(),
            solver: self.solver.as_ref(),
            postprocess: self.postprocess.as_ref(),
            dim: self.state_dim(),
        }
    }

    /// Advance every particle over `window`.
    ///
    /// Appends the rows that are new for each particle (the window start
    /// is skipped when it was already recorded) and overwrites the
    /// position with the state at `window.end`. On error nothing changes.
    ///
    /// # Errors
    ///
    /// Solver failures are returned unchanged inside
    /// [`IntegrateError::Solve`]; postprocessor failures as
    /// [`IntegrateError::Postprocess`] or [`IntegrateError::StateShape`].
    pub fn integrate(
        &mut self,
        window: impl Into<TimeWindow<T>>,
    ) -> Result<IntegrateReport, IntegrateError> {
        let window = window.into();
        let started = Instant::now();
        let u0 = flatten(&self.position);
        let chunk = self.integrator().run(&self.ids, &u0, window)?;
        let position = unflatten(chunk.final_state, self.state_dim(), self.len())?;

        let rows_appended = self.record.append_new(chunk.rows, window.direction());
        self.position = position;

        let mut report = IntegrateReport {
            samples: chunk.times.len(),
            rows_appended,
            ..IntegrateReport::default()
        };
        report.add_stats(chunk.stats);
        report.elapsed_us = started.elapsed().as_micros() as u64;
        debug!(
            start = window.start.to_f64(),
            end = window.end.to_f64(),
            particles = self.len(),
            samples = report.samples,
            rows_appended,
            accepted = report.accepted_steps,
            rejected = report.rejected_steps,
            solver = self.solver.name(),
            "integrated window"
        );
        Ok(report)
    }

    /// Advance over the parameters' own time bounds.
    ///
    /// # Errors
    ///
    /// [`IntegrateError::MissingTimeBounds`] when the parameters report
    /// none, otherwise as [`integrate`](Self::integrate).
    pub fn integrate_over_bounds(&mut self) -> Result<IntegrateReport, IntegrateError>
    where
        P: TimeBounds<T>,
    {
        let window = self
            .params
            .time_bounds()
            .ok_or(IntegrateError::MissingTimeBounds)?;
        self.integrate(window)
    }
}
