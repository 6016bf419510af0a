//! Both bundled solvers behind the `Solver` trait object.

use drift_core::{SolveError, TimeWindow};
use drift_solver::{DormandPrince, Problem, Rk4, SaveAt, Solver};
use proptest::prelude::*;
use std::sync::Arc;

fn solvers() -> Vec<Arc<dyn Solver<f64>>> {
    vec![
        Arc::new(DormandPrince::default()),
        Arc::new(Rk4::new(1e-3)),
    ]
}

// ── Shared contract ─────────────────────────────────────────────

#[test]
fn names_are_distinct() {
    let names: Vec<String> = solvers().iter().map(|s| s.name().to_string()).collect();
    assert_eq!(names, vec!["dopri5", "rk4"]);
}

#[test]
fn rotation_preserves_radius() {
    let rotate = |_t: f64, u: &mut [f64], du: &mut [f64]| {
        du[0] = -u[1];
        du[1] = u[0];
    };
    for solver in solvers() {
        let sol = solver
            .solve(&Problem::new(&rotate, &[3.0, 4.0], TimeWindow::new(0.0, 10.0)))
            .unwrap();
        let y = sol.final_state().unwrap();
        let r = (y[0] * y[0] + y[1] * y[1]).sqrt();
        assert!((r - 5.0).abs() < 1e-6, "{}: r = {r}", solver.name());
    }
}

#[test]
fn forward_then_backward_round_trips() {
    let rhs = |t: f64, u: &mut [f64], du: &mut [f64]| du[0] = (t * u[0]).sin();
    for solver in solvers() {
        let fwd = solver
            .solve(&Problem::new(&rhs, &[0.7], TimeWindow::new(0.0, 2.0)))
            .unwrap();
        let mid = fwd.final_state().unwrap().to_vec();
        let back = solver
            .solve(&Problem::new(&rhs, &mid, TimeWindow::new(2.0, 0.0)))
            .unwrap();
        assert!((back.final_state().unwrap()[0] - 0.7).abs() < 1e-6);
    }
}

#[test]
fn infinite_velocity_fails_for_every_solver() {
    let blowup = |_t: f64, _u: &mut [f64], du: &mut [f64]| du[0] = f64::INFINITY;
    for solver in solvers() {
        let err = solver
            .solve(&Problem::new(&blowup, &[0.0], TimeWindow::new(0.0, 1.0)))
            .unwrap_err();
        assert!(matches!(err, SolveError::NonFinite { .. }));
    }
}

#[test]
fn empty_state_is_solved_trivially() {
    let none = |_t: f64, _u: &mut [f64], _du: &mut [f64]| {};
    for solver in solvers() {
        let sol = solver
            .solve(&Problem::new(&none, &[], TimeWindow::new(0.0, 1.0)))
            .unwrap();
        assert_eq!(sol.times(), &[0.0, 1.0]);
        assert_eq!(sol.dim(), 0);
    }
}

// ── Save grids agree ────────────────────────────────────────────

#[test]
fn save_every_grids_match_between_solvers() {
    let decay = |_t: f64, u: &mut [f64], du: &mut [f64]| du[0] = -0.5 * u[0];
    let dopri = DormandPrince::default().with_save_at(SaveAt::Every(0.25));
    let rk4 = Rk4::new(0.05).with_save_at(SaveAt::Every(0.25));
    let window = TimeWindow::new(0.0, 1.0);
    let a = dopri.solve(&Problem::new(&decay, &[2.0], window)).unwrap();
    let b = rk4.solve(&Problem::new(&decay, &[2.0], window)).unwrap();
    assert_eq!(a.times(), b.times());
    for ((_, x), (_, y)) in a.iter().zip(b.iter()) {
        assert!((x[0] - y[0]).abs() < 1e-6);
    }
}

proptest! {
    #[test]
    fn linear_decay_matches_closed_form(rate in -2.0f64..2.0, t1 in 0.1f64..3.0) {
        let rhs = move |_t: f64, u: &mut [f64], du: &mut [f64]| du[0] = rate * u[0];
        let exact = (rate * t1).exp();
        for solver in solvers() {
            let sol = solver
                .solve(&Problem::new(&rhs, &[1.0], TimeWindow::new(0.0, t1)))
                .unwrap();
            let y = sol.final_state().unwrap()[0];
            prop_assert!((y - exact).abs() < 1e-6 * exact.max(1.0));
            prop_assert_eq!(sol.times().last().copied(), Some(t1));
        }
    }
}
