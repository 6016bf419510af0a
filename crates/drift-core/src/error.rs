//! Error types for solving and integration.
//!
//! Numerical failures raised by a solver are [`SolveError`]s; the
//! integration driver wraps them unmodified in [`IntegrateError::Solve`].

use std::error::Error;
use std::fmt;

/// Errors from an ODE solve.
#[derive(Clone, Debug, PartialEq)]
pub enum SolveError {
    /// The state or the error estimate became NaN or infinite.
    NonFinite {
        /// Time at which the non-finite value appeared.
        t: f64,
        /// Index of the first offending state component, if known.
        component: Option<usize>,
    },
    /// The adaptive step size shrank below the representable minimum.
    StepSizeUnderflow {
        /// Time at which the solver gave up.
        t: f64,
        /// The rejected step size.
        h: f64,
    },
    /// The solver took more steps than allowed.
    MaxStepsExceeded {
        /// Time reached when the budget ran out.
        t: f64,
        /// The configured step budget.
        max_steps: usize,
    },
    /// Solver options are unusable (non-positive tolerance, zero step, ...).
    InvalidOptions {
        /// What is wrong with the options.
        reason: String,
    },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFinite { t, component } => {
                write!(f, "non-finite state at t={t}")?;
                if let Some(c) = component {
                    write!(f, " (component {c})")?;
                }
                Ok(())
            }
            Self::StepSizeUnderflow { t, h } => {
                write!(f, "step size {h:e} underflowed at t={t}")
            }
            Self::MaxStepsExceeded { t, max_steps } => {
                write!(f, "exceeded {max_steps} steps at t={t}")
            }
            Self::InvalidOptions { reason } => write!(f, "invalid solver options: {reason}"),
        }
    }
}

impl Error for SolveError {}

/// Errors from one integration call on a particle set.
#[derive(Clone, Debug, PartialEq)]
pub enum IntegrateError {
    /// The solver failed; the inner error is passed through unchanged.
    Solve(SolveError),
    /// The default overload was used but the parameter bundle carries no
    /// time bounds.
    MissingTimeBounds,
    /// The solver returned a state whose length does not match the set.
    StateShape {
        /// Expected state length (`state_dim * n_particles`).
        expected: usize,
        /// Length actually returned.
        got: usize,
    },
    /// The postprocessor could not turn the solution into rows.
    Postprocess {
        /// Description of the failure.
        reason: String,
    },
    /// A parallel worker panicked or disappeared before reporting.
    WorkerFailed {
        /// Description of which worker failed.
        reason: String,
    },
}

impl fmt::Display for IntegrateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solve(e) => write!(f, "solve failed: {e}"),
            Self::MissingTimeBounds => write!(f, "parameters carry no time bounds"),
            Self::StateShape { expected, got } => {
                write!(f, "solver state has {got} components, expected {expected}")
            }
            Self::Postprocess { reason } => write!(f, "postprocess failed: {reason}"),
            Self::WorkerFailed { reason } => write!(f, "worker failed: {reason}"),
        }
    }
}

impl Error for IntegrateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Solve(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SolveError> for IntegrateError {
    fn from(e: SolveError) -> Self {
        Self::Solve(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solve_error_is_source_of_integrate_error() {
        let inner = SolveError::NonFinite {
            t: 2.5,
            component: Some(3),
        };
        let outer: IntegrateError = inner.clone().into();
        assert_eq!(outer, IntegrateError::Solve(inner));
        assert!(outer.source().is_some());
        assert_eq!(
            outer.to_string(),
            "solve failed: non-finite state at t=2.5 (component 3)"
        );
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            IntegrateError::MissingTimeBounds.to_string(),
            "parameters carry no time bounds"
        );
        let e = SolveError::MaxStepsExceeded {
            t: 1.0,
            max_steps: 10,
        };
        assert_eq!(e.to_string(), "exceeded 10 steps at t=1");
    }
}
