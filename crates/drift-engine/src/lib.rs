//! Particle sets and the trajectory integration driver for drift.
//!
//! A [`ParticleSet`] owns the current particle states, an append-only
//! [`Record`](drift_core::Record) of past samples, and the strategies that
//! advance them: a [`VelocityFunction`](drift_field::VelocityFunction), a
//! [`Solver`](drift_solver::Solver) and a [`Postprocess`]. Each call to
//! [`integrate`](ParticleSet::integrate) solves one time window, appends
//! the samples that are new, and leaves the set positioned at the window
//! end, so consecutive windows chain without duplicate rows.
//!
//! # Quick start
//!
//! ```
//! use drift_engine::ParticleSet;
//! use drift_field::ArrayField2;
//! use ndarray::{array, Array2};
//!
//! let u = Array2::from_elem((8, 8), 1.0f64);
//! let v = Array2::from_elem((8, 8), 0.0f64);
//! let field = ArrayField2::stationary(u, v, (0.0, 2.0)).unwrap();
//!
//! let position = array![[1.0, 6.5], [2.0, 3.0]];
//! let mut set = ParticleSet::for_field(field, position).build().unwrap();
//! let report = set.integrate_over_bounds().unwrap();
//!
//! assert_eq!(report.rows_appended, 4);
//! assert!((set.position()[[0, 1]] - 8.5).abs() < 1e-9);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod batched;
pub mod config;
pub mod integrate;
pub mod metrics;
pub mod particles;
pub mod postprocess;

pub use config::{ConfigError, ParticleSetBuilder};
pub use metrics::IntegrateReport;
pub use particles::ParticleSet;
pub use postprocess::{FieldRows, Postprocess, RawRows};
