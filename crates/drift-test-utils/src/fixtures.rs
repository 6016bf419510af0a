//! Instrumented strategies for engine tests.
//!
//! - [`CountingInterpolant`]: the default field interpolant plus a shared
//!   per-particle evaluation counter.
//! - [`FailingSolver`]: delegates to a real solver, then fails
//!   deterministically after N successful solves.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use drift_core::{Real, SolveError};
use drift_field::{FieldInterpolant, VelocityField, VelocityFunction};
use drift_solver::{DormandPrince, Problem, Solution, Solver};

/// [`FieldInterpolant`] that counts how often it is called.
#[derive(Clone, Debug, Default)]
pub struct CountingInterpolant {
    pub calls: Arc<AtomicUsize>,
}

impl CountingInterpolant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<T: Real> VelocityFunction<T, VelocityField<T>> for CountingInterpolant {
    fn velocity(&self, field: &VelocityField<T>, t: T, state: &mut [T], out: &mut [T]) {
        self.calls.fetch_add(1, Ordering::Relaxed);
        FieldInterpolant.velocity(field, t, state, out);
    }
}

/// Solves with Dormand-Prince for the first `succeed` calls, then returns
/// [`SolveError::MaxStepsExceeded`].
#[derive(Debug)]
pub struct FailingSolver {
    pub succeed: usize,
    calls: AtomicUsize,
}

impl FailingSolver {
    pub fn new(succeed: usize) -> Self {
        Self {
            succeed,
            calls: AtomicUsize::new(0),
        }
    }
}

impl<T: Real> Solver<T> for FailingSolver {
    fn name(&self) -> &str {
        "failing"
    }

    fn solve(&self, problem: &Problem<'_, T>) -> Result<Solution<T>, SolveError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if n >= self.succeed {
            return Err(SolveError::MaxStepsExceeded {
                t: problem.window.start.to_f64(),
                max_steps: 0,
            });
        }
        DormandPrince::default().solve(problem)
    }
}
