//! ODE solver capability for drift.
//!
//! The integration driver hands a [`Problem`] (right-hand side, initial
//! state, time window) to any [`Solver`] and gets back a [`Solution`]:
//! the states at the times selected by a [`SaveAt`] policy plus
//! [`SolveStats`].
//!
//! Two solvers ship with the crate:
//!
//! | Solver | Order | Step control |
//! |--------|-------|--------------|
//! | [`DormandPrince`] | 5(4) | adaptive, FSAL |
//! | [`Rk4`] | 4 | fixed |
//!
//! Both land exactly on every save time and on the window end. The
//! right-hand side receives the state mutably and solvers keep whatever
//! it writes back, so a particle moved onto another tile during a stage
//! evaluation stays there.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dopri;
pub mod problem;
pub mod rk4;
pub mod save;
pub mod solution;
pub mod solver;

pub use dopri::DormandPrince;
pub use problem::{Problem, Rhs};
pub use rk4::Rk4;
pub use save::SaveAt;
pub use solution::{Solution, SolveStats};
pub use solver::Solver;
