//! Per-call integration metrics.

use drift_solver::SolveStats;

/// Work done by one integration call.
///
/// Returned by every [`integrate`](crate::ParticleSet::integrate) variant.
/// Step counters are summed over workers for parallel calls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegrateReport {
    /// Distinct sample times produced by the solver.
    pub samples: usize,
    /// Rows accepted into the record.
    pub rows_appended: usize,
    /// Solver steps accepted.
    pub accepted_steps: usize,
    /// Solver steps rejected.
    pub rejected_steps: usize,
    /// Right-hand-side evaluations (each covers every particle in the solve).
    pub rhs_evals: usize,
    /// Wall-clock time for the call, in microseconds.
    pub elapsed_us: u64,
}

impl IntegrateReport {
    /// Add one solve's counters.
    pub fn add_stats(&mut self, stats: SolveStats) {
        self.accepted_steps += stats.accepted_steps;
        self.rejected_steps += stats.rejected_steps;
        self.rhs_evals += stats.rhs_evals;
    }
}
