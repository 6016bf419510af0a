//! The [`Solver`] trait.

use crate::problem::Problem;
use crate::solution::Solution;
use drift_core::SolveError;

/// Solves a [`Problem`] over its window.
///
/// # Contract
///
/// - The solution is [finished](Solution::finish) at `window.end` with
///   the state there, whatever the save policy.
/// - A degenerate window yields the single sample `(start, u0)` without
///   calling the right-hand side.
/// - Sample times are strictly monotone in the integration direction.
/// - Failures are reported, never clamped or retried past.
///
/// # Object safety
///
/// This trait is object-safe; particle sets hold `Arc<dyn Solver<T>>`.
pub trait Solver<T>: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &str;

    /// Integrate `problem` and return the saved samples.
    fn solve(&self, problem: &Problem<'_, T>) -> Result<Solution<T>, SolveError>;
}
