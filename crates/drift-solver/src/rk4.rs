//! Classic fixed-step fourth-order Runge-Kutta.

use crate::problem::Problem;
use crate::save::{clip_step, SaveAt, Schedule};
use crate::solution::{Solution, SolveStats};
use crate::solver::Solver;
use drift_core::{Real, SolveError};
use tracing::warn;

/// Fixed-step RK4.
///
/// Steps are `dt` long except where shortened to land on a save time or
/// the window end. The derivative at each new state is evaluated before
/// the state is saved, so right-hand-side rewrites are visible in the
/// output.
#[derive(Clone, Debug, PartialEq)]
pub struct Rk4<T> {
    /// Step magnitude.
    pub dt: T,
    /// Which times to record.
    pub save_at: SaveAt<T>,
}

impl<T: Real> Rk4<T> {
    /// Fixed step `dt`, saving the endpoints.
    pub fn new(dt: T) -> Self {
        Self {
            dt,
            save_at: SaveAt::Endpoints,
        }
    }

    /// Replace the save policy.
    pub fn with_save_at(mut self, save_at: SaveAt<T>) -> Self {
        self.save_at = save_at;
        self
    }
}

impl<T: Real> Default for Rk4<T> {
    /// `dt = 0.1`, saving the endpoints.
    fn default() -> Self {
        Self::new(T::from_f64(0.1))
    }
}

fn non_finite<T: Real>(t: T, values: &[T]) -> Result<(), SolveError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(component) => {
            warn!(t = t.to_f64(), component, "non-finite state");
            Err(SolveError::NonFinite {
                t: t.to_f64(),
                component: Some(component),
            })
        }
        None => Ok(()),
    }
}

impl<T: Real> Solver<T> for Rk4<T> {
    fn name(&self) -> &str {
        "rk4"
    }

    fn solve(&self, problem: &Problem<'_, T>) -> Result<Solution<T>, SolveError> {
        if !(self.dt.is_finite() && self.dt > T::ZERO) {
            return Err(SolveError::InvalidOptions {
                reason: format!("dt must be positive and finite, got {}", self.dt),
            });
        }
        let window = problem.window;
        if !window.is_finite() {
            return Err(SolveError::InvalidOptions {
                reason: format!("window [{}, {}] is not finite", window.start, window.end),
            });
        }
        let n = problem.dim();
        let mut sol = Solution::new(n);
        let mut y = problem.u0.to_vec();
        if window.is_degenerate() {
            sol.push(window.start, &y);
            sol.finish(window.start, &y);
            return Ok(sol);
        }

        let rhs = problem.rhs;
        let mut schedule = Schedule::new(&self.save_at, window)?;
        let mut stats = SolveStats::default();
        let [mut k1, mut k2, mut k3, mut k4, mut stage]: [Vec<T>; 5] =
            std::array::from_fn(|_| vec![T::ZERO; n]);
        let half = T::from_f64(0.5);
        let sixth = T::ONE / T::from_f64(6.0);
        let two = T::from_f64(2.0);

        let mut t = window.start;
        rhs.eval(t, &mut y, &mut k1);
        stats.rhs_evals += 1;
        non_finite(t, &k1)?;
        if schedule.reached(t) {
            sol.push(t, &y);
        }

        while t != window.end {
            let target = schedule.target();
            let (h, lands) = clip_step(t, self.dt, target);

            for ((s, &yi), &ki) in stage.iter_mut().zip(&y).zip(&k1) {
                *s = yi + half * h * ki;
            }
            rhs.eval(t + half * h, &mut stage, &mut k2);
            for ((s, &yi), &ki) in stage.iter_mut().zip(&y).zip(&k2) {
                *s = yi + half * h * ki;
            }
            rhs.eval(t + half * h, &mut stage, &mut k3);
            for ((s, &yi), &ki) in stage.iter_mut().zip(&y).zip(&k3) {
                *s = yi + h * ki;
            }
            rhs.eval(t + h, &mut stage, &mut k4);
            for (i, yi) in y.iter_mut().enumerate() {
                *yi += sixth * h * (k1[i] + two * k2[i] + two * k3[i] + k4[i]);
            }

            t = if lands { target } else { t + h };
            non_finite(t, &y)?;
            rhs.eval(t, &mut y, &mut k1);
            non_finite(t, &k1)?;
            stats.rhs_evals += 4;
            stats.accepted_steps += 1;
            if schedule.reached(t) {
                sol.push(t, &y);
            }
        }

        sol.finish(t, &y);
        sol.set_stats(stats);
        Ok(sol)
    }
}
