//! Adaptive Dormand-Prince 5(4) with first-same-as-last stages.

use crate::problem::{Problem, Rhs};
use crate::save::{clip_step, SaveAt, Schedule};
use crate::solution::{Solution, SolveStats};
use crate::solver::Solver;
use drift_core::{Direction, Real, SolveError};
use tracing::{trace, warn};

const C: [f64; 7] = [0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];

const A: [[f64; 6]; 7] = [
    [0.0; 6],
    [1.0 / 5.0, 0.0, 0.0, 0.0, 0.0, 0.0],
    [3.0 / 40.0, 9.0 / 40.0, 0.0, 0.0, 0.0, 0.0],
    [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0, 0.0, 0.0, 0.0],
    [
        19372.0 / 6561.0,
        -25360.0 / 2187.0,
        64448.0 / 6561.0,
        -212.0 / 729.0,
        0.0,
        0.0,
    ],
    [
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
        0.0,
    ],
    // Fifth-order weights; the last stage is evaluated at the new state.
    [
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];

/// Fifth-order minus fourth-order weights.
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;

/// Adaptive explicit Runge-Kutta 5(4) solver.
///
/// The per-component error is scaled by `atol + rtol * max(|y|, |y_new|)`
/// and steps are accepted when the RMS of the scaled error is at most one.
///
/// # Defaults
///
/// | Field | Default |
/// |-------|---------|
/// | `rtol` | `1e-8` |
/// | `atol` | `1e-8` |
/// | `save_at` | [`SaveAt::Endpoints`] |
/// | `max_steps` | `100_000` |
/// | `max_step` | unbounded |
/// | `initial_step` | estimated from the right-hand side |
#[derive(Clone, Debug, PartialEq)]
pub struct DormandPrince<T> {
    /// Relative tolerance.
    pub rtol: T,
    /// Absolute tolerance.
    pub atol: T,
    /// Which times to record.
    pub save_at: SaveAt<T>,
    /// Budget of attempted steps (accepted plus rejected).
    pub max_steps: usize,
    /// Upper bound on the step magnitude.
    pub max_step: Option<T>,
    /// First step magnitude; estimated when `None`.
    pub initial_step: Option<T>,
}

impl<T: Real> Default for DormandPrince<T> {
    fn default() -> Self {
        Self {
            rtol: T::from_f64(1e-8),
            atol: T::from_f64(1e-8),
            save_at: SaveAt::Endpoints,
            max_steps: 100_000,
            max_step: None,
            initial_step: None,
        }
    }
}

impl<T: Real> DormandPrince<T> {
    /// Default options with the given tolerances.
    pub fn with_tolerances(rtol: T, atol: T) -> Self {
        Self {
            rtol,
            atol,
            ..Self::default()
        }
    }

    /// Replace the save policy.
    pub fn with_save_at(mut self, save_at: SaveAt<T>) -> Self {
        self.save_at = save_at;
        self
    }

    fn validate(&self) -> Result<(), SolveError> {
        let positive = |v: T| v.is_finite() && v > T::ZERO;
        let reason = if !positive(self.rtol) || !positive(self.atol) {
            format!(
                "tolerances must be positive and finite, got rtol={} atol={}",
                self.rtol, self.atol
            )
        } else if self.max_steps == 0 {
            "max_steps must be at least 1".to_string()
        } else if self.max_step.is_some_and(|h| !positive(h)) {
            "max_step must be positive".to_string()
        } else if self.initial_step.is_some_and(|h| !positive(h)) {
            "initial_step must be positive".to_string()
        } else {
            return Ok(());
        };
        Err(SolveError::InvalidOptions { reason })
    }
}

fn rms<T: Real>(values: impl Iterator<Item = T>, n: usize) -> T {
    if n == 0 {
        return T::ZERO;
    }
    let sum = values.fold(T::ZERO, |acc, v| acc + v * v);
    (sum / T::from_usize(n)).sqrt()
}

fn first_non_finite<T: Real>(values: &[T]) -> Option<usize> {
    values.iter().position(|v| !v.is_finite())
}

/// Starting step from the size of the state, its derivative and a
/// finite-difference estimate of the second derivative.
#[allow(clippy::too_many_arguments)]
fn initial_step<T: Real>(
    rhs: &dyn Rhs<T>,
    t0: T,
    y0: &[T],
    f0: &[T],
    sign: T,
    rtol: T,
    atol: T,
    span: T,
) -> T {
    let n = y0.len();
    let scale: Vec<T> = y0.iter().map(|y| atol + rtol * y.abs()).collect();
    let d0 = rms(y0.iter().zip(&scale).map(|(&y, &s)| y / s), n);
    let d1 = rms(f0.iter().zip(&scale).map(|(&f, &s)| f / s), n);
    let small = T::from_f64(1e-5);
    let h0 = if d0 < small || d1 < small {
        T::from_f64(1e-6)
    } else {
        T::from_f64(0.01) * d0 / d1
    }
    .min(span);

    let mut y1: Vec<T> = y0
        .iter()
        .zip(f0)
        .map(|(&y, &f)| y + sign * h0 * f)
        .collect();
    let mut f1 = vec![T::ZERO; n];
    rhs.eval(t0 + sign * h0, &mut y1, &mut f1);
    let d2 = rms(
        f1.iter()
            .zip(f0)
            .zip(&scale)
            .map(|((&a, &b), &s)| (a - b) / s),
        n,
    ) / h0;

    let d = d1.max(d2);
    let h1 = if d <= T::from_f64(1e-15) {
        T::from_f64(1e-6).max(h0 * T::from_f64(1e-3))
    } else {
        (T::from_f64(0.01) / d).powf(T::from_f64(0.2))
    };
    (T::from_f64(100.0) * h0).min(h1).min(span)
}

impl<T: Real> Solver<T> for DormandPrince<T> {
    fn name(&self) -> &str {
        "dopri5"
    }

    fn solve(&self, problem: &Problem<'_, T>) -> Result<Solution<T>, SolveError> {
        self.validate()?;
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
        let sign = match window.direction() {
            Direction::Forward => T::ONE,
            Direction::Backward => -T::ONE,
        };
        let mut stats = SolveStats::default();
        let mut k: [Vec<T>; 7] = std::array::from_fn(|_| vec![T::ZERO; n]);
        let mut stage = vec![T::ZERO; n];
        let mut y_new = vec![T::ZERO; n];

        let mut t = window.start;
        rhs.eval(t, &mut y, &mut k[0]);
        stats.rhs_evals += 1;
        if let Some(component) = first_non_finite(&k[0]) {
            warn!(t = t.to_f64(), component, "non-finite derivative at start");
            return Err(SolveError::NonFinite {
                t: t.to_f64(),
                component: Some(component),
            });
        }
        if schedule.reached(t) {
            sol.push(t, &y);
        }

        let mut h = match self.initial_step {
            Some(h) => h,
            None => {
                stats.rhs_evals += 1;
                initial_step(
                    rhs,
                    t,
                    &y,
                    &k[0],
                    sign,
                    self.rtol,
                    self.atol,
                    window.span().abs(),
                )
            }
        };
        if let Some(max) = self.max_step {
            h = h.min(max);
        }
        let min_factor = T::from_f64(MIN_FACTOR);
        let max_factor = T::from_f64(MAX_FACTOR);
        let safety = T::from_f64(SAFETY);
        let mut attempts = 0usize;
        let mut last_rejected = false;

        while t != window.end {
            if attempts >= self.max_steps {
                warn!(t = t.to_f64(), max_steps = self.max_steps, "step budget exhausted");
                return Err(SolveError::MaxStepsExceeded {
                    t: t.to_f64(),
                    max_steps: self.max_steps,
                });
            }
            attempts += 1;
            if !(h > T::epsilon() * T::from_f64(10.0) * t.abs().max(T::ONE)) {
                warn!(t = t.to_f64(), h = h.to_f64(), "step size underflow");
                return Err(SolveError::StepSizeUnderflow {
                    t: t.to_f64(),
                    h: h.to_f64(),
                });
            }

            let target = schedule.target();
            let (step, lands) = clip_step(t, h, target);

            for s in 1..6 {
                let (done, rest) = k.split_at_mut(s);
                for (i, st) in stage.iter_mut().enumerate() {
                    let mut acc = T::ZERO;
                    for (j, kj) in done.iter().enumerate() {
                        acc += T::from_f64(A[s][j]) * kj[i];
                    }
                    *st = y[i] + step * acc;
                }
                rhs.eval(t + T::from_f64(C[s]) * step, &mut stage, &mut rest[0]);
            }
            for (i, yn) in y_new.iter_mut().enumerate() {
                let mut acc = T::ZERO;
                for (j, kj) in k[..6].iter().enumerate() {
                    acc += T::from_f64(A[6][j]) * kj[i];
                }
                *yn = y[i] + step * acc;
            }
            let t_new = if lands { target } else { t + step };
            let (done, rest) = k.split_at_mut(6);
            rhs.eval(t_new, &mut y_new, &mut rest[0]);
            stats.rhs_evals += 6;

            let err = rms(
                (0..n).map(|i| {
                    let mut e = T::ZERO;
                    for (j, kj) in done.iter().chain(rest.iter()).enumerate() {
                        e += T::from_f64(E[j]) * kj[i];
                    }
                    let scale = self.atol + self.rtol * y[i].abs().max(y_new[i].abs());
                    step * e / scale
                }),
                n,
            );
            if !err.is_finite() || first_non_finite(&y_new).is_some() {
                let component = first_non_finite(&y_new);
                warn!(t = t.to_f64(), ?component, "non-finite state");
                return Err(SolveError::NonFinite {
                    t: t.to_f64(),
                    component,
                });
            }

            if err <= T::ONE {
                let mut factor = if err == T::ZERO {
                    max_factor
                } else {
                    (safety * err.powf(T::from_f64(-0.2))).max(min_factor).min(max_factor)
                };
                if last_rejected {
                    factor = factor.min(T::ONE);
                }
                let proposed = step.abs() * factor;
                h = if lands { proposed.max(h) } else { proposed };
                t = t_new;
                std::mem::swap(&mut y, &mut y_new);
                k.swap(0, 6);
                stats.accepted_steps += 1;
                last_rejected = false;
                if schedule.reached(t) {
                    sol.push(t, &y);
                }
            } else {
                let factor = (safety * err.powf(T::from_f64(-0.2))).max(min_factor);
                h = step.abs() * factor;
                stats.rejected_steps += 1;
                last_rejected = true;
                trace!(t = t.to_f64(), err = err.to_f64(), h = h.to_f64(), "step rejected");
            }
            if let Some(max) = self.max_step {
                h = h.min(max);
            }
        }

        sol.finish(t, &y);
        sol.set_stats(stats);
        Ok(sol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drift_core::TimeWindow;
    use std::cell::Cell;
    use std::f64::consts::PI;

    fn solve(
        solver: &DormandPrince<f64>,
        rhs: &dyn Rhs<f64>,
        u0: &[f64],
        window: (f64, f64),
    ) -> Result<Solution<f64>, SolveError> {
        solver.solve(&Problem::new(rhs, u0, window.into()))
    }

    fn decay(_t: f64, u: &mut [f64], du: &mut [f64]) {
        du[0] = -u[0];
    }

    #[test]
    fn exponential_decay_matches_exact() {
        let sol = solve(&DormandPrince::default(), &decay, &[1.0], (0.0, 5.0)).unwrap();
        assert_eq!(sol.times(), &[0.0, 5.0]);
        let y = sol.final_state().unwrap()[0];
        assert!((y - (-5.0f64).exp()).abs() < 1e-7, "y = {y}");
        let stats = sol.stats();
        assert!(stats.accepted_steps > 0);
        assert!(stats.rhs_evals >= 6 * stats.accepted_steps);
    }

    #[test]
    fn oscillator_returns_after_one_period() {
        let osc = |_t: f64, u: &mut [f64], du: &mut [f64]| {
            du[0] = u[1];
            du[1] = -u[0];
        };
        let sol = solve(&DormandPrince::default(), &osc, &[1.0, 0.0], (0.0, 2.0 * PI)).unwrap();
        let y = sol.final_state().unwrap();
        assert!((y[0] - 1.0).abs() < 1e-6);
        assert!(y[1].abs() < 1e-6);
    }

    #[test]
    fn integrates_backwards() {
        let grow = |_t: f64, u: &mut [f64], du: &mut [f64]| du[0] = u[0];
        let e = 1.0f64.exp();
        let sol = solve(&DormandPrince::default(), &grow, &[e], (1.0, 0.0)).unwrap();
        assert_eq!(sol.times(), &[1.0, 0.0]);
        assert!((sol.final_state().unwrap()[0] - 1.0).abs() < 1e-7);
    }

    #[test]
    fn degenerate_window_never_calls_rhs() {
        let calls = Cell::new(0);
        let rhs = |_t: f64, _u: &mut [f64], du: &mut [f64]| {
            calls.set(calls.get() + 1);
            du[0] = 1.0;
        };
        let sol = solve(&DormandPrince::default(), &rhs, &[3.0], (2.0, 2.0)).unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(sol.len(), 1);
        assert_eq!(sol.state(0), Some(&[3.0][..]));
    }

    #[test]
    fn save_every_lands_exactly() {
        let solver = DormandPrince::default().with_save_at(SaveAt::Every(0.5));
        let sol = solve(&solver, &decay, &[1.0], (0.0, 2.0)).unwrap();
        assert_eq!(sol.times(), &[0.0, 0.5, 1.0, 1.5, 2.0]);
        for (t, y) in sol.iter() {
            assert!((y[0] - (-t).exp()).abs() < 1e-7);
        }
    }

    #[test]
    fn save_every_has_no_sliver_before_the_end() {
        let solver = DormandPrince::default().with_save_at(SaveAt::Every(0.3));
        let sol = solve(&solver, &decay, &[1.0], (0.0, 0.9)).unwrap();
        assert_eq!(sol.times(), &[0.0, 0.3, 0.6, 0.9]);
    }

    #[test]
    fn save_steps_is_strictly_monotone() {
        let solver = DormandPrince::default().with_save_at(SaveAt::Steps);
        let sol = solve(&solver, &decay, &[1.0], (0.0, 3.0)).unwrap();
        assert!(sol.len() > 2);
        assert!(sol.times().windows(2).all(|w| w[1] > w[0]));
        assert_eq!(sol.times().last(), Some(&3.0));
        assert_eq!(sol.len(), sol.stats().accepted_steps + 1);
    }

    #[test]
    fn save_times_skips_start_when_unlisted() {
        let solver = DormandPrince::default().with_save_at(SaveAt::Times(vec![0.25, 0.75]));
        let sol = solve(&solver, &decay, &[1.0], (0.0, 1.0)).unwrap();
        assert_eq!(sol.times(), &[0.25, 0.75]);
        assert_eq!(sol.final_time(), Some(1.0));
        assert!((sol.final_state().unwrap()[0] - (-1.0f64).exp()).abs() < 1e-7);
    }

    #[test]
    fn rhs_rewrites_persist() {
        // Unit drift on a unit circle: the rhs folds the state back into [0, 1).
        let fold = |_t: f64, u: &mut [f64], du: &mut [f64]| {
            u[0] = u[0].rem_euclid(1.0);
            du[0] = 1.0;
        };
        let sol = solve(&DormandPrince::default(), &fold, &[0.0], (0.0, 2.5)).unwrap();
        let x = sol.final_state().unwrap()[0];
        assert!((x - 0.5).abs() < 1e-9, "x = {x}");
    }

    #[test]
    fn nan_derivative_is_reported() {
        let bad = |t: f64, _u: &mut [f64], du: &mut [f64]| {
            du[0] = if t > 1.0 { f64::NAN } else { 1.0 };
        };
        let err = solve(&DormandPrince::default(), &bad, &[0.0], (0.0, 3.0)).unwrap_err();
        assert!(matches!(err, SolveError::NonFinite { .. }), "{err:?}");

        let nan_now = |_t: f64, _u: &mut [f64], du: &mut [f64]| du[0] = f64::NAN;
        let err = solve(&DormandPrince::default(), &nan_now, &[0.0], (0.0, 1.0)).unwrap_err();
        assert_eq!(
            err,
            SolveError::NonFinite {
                t: 0.0,
                component: Some(0),
            }
        );
    }

    #[test]
    fn step_budget_is_enforced() {
        let solver = DormandPrince {
            max_steps: 3,
            ..DormandPrince::default()
        };
        let err = solve(&solver, &decay, &[1.0], (0.0, 100.0)).unwrap_err();
        assert!(matches!(err, SolveError::MaxStepsExceeded { max_steps: 3, .. }));
    }

    #[test]
    fn max_step_bounds_every_step() {
        let solver = DormandPrince {
            max_step: Some(0.1),
            save_at: SaveAt::Steps,
            ..DormandPrince::default()
        };
        let sol = solve(&solver, &decay, &[1.0], (0.0, 1.0)).unwrap();
        assert!(sol.times().windows(2).all(|w| w[1] - w[0] <= 0.1 + 1e-12));
    }

    #[test]
    fn invalid_tolerances_are_rejected() {
        let solver = DormandPrince::with_tolerances(0.0, 1e-6);
        assert!(matches!(
            solve(&solver, &decay, &[1.0], (0.0, 1.0)),
            Err(SolveError::InvalidOptions { .. })
        ));
        let window = TimeWindow::new(0.0, f64::INFINITY);
        assert!(DormandPrince::default()
            .solve(&Problem::new(&decay, &[1.0], window))
            .is_err());
    }

    #[test]
    fn runs_in_single_precision() {
        let decay32 = |_t: f32, u: &mut [f32], du: &mut [f32]| du[0] = -u[0];
        let solver = DormandPrince::<f32>::with_tolerances(1e-5, 1e-6);
        let sol = solver
            .solve(&Problem::new(&decay32, &[1.0f32], TimeWindow::new(0.0, 1.0)))
            .unwrap();
        assert!((sol.final_state().unwrap()[0] - (-1.0f32).exp()).abs() < 1e-4);
    }
}
