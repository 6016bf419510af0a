//! Drift: Lagrangian particle trajectories through gridded velocity fields.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! drift sub-crates. For most users, adding `drift` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use drift::prelude::*;
//! use ndarray::{array, Array2};
//!
//! // Uniform eastward flow of one cell per unit time on a 16x16 grid.
//! let u = Array2::from_elem((16, 16), 1.0);
//! let v = Array2::zeros((16, 16));
//! let field = ArrayField2::stationary(u, v, (0.0, 4.0)).unwrap();
//!
//! let mut set = ParticleSet::for_field(field, array![[14.0, 3.0], [2.0, 2.0]])
//!     .solver(DormandPrince::default().with_save_at(SaveAt::Every(1.0)))
//!     .build()
//!     .unwrap();
//! let report = set.integrate_over_bounds().unwrap();
//!
//! assert_eq!(report.samples, 5);
//! assert_eq!(set.record().len(), 10);
//! // Positions keep accumulating; recorded rows wrap into the grid.
//! assert!((set.position()[[0, 0]] - 18.0).abs() < 1e-9);
//! let last = set.record().trajectory(ParticleId(1)).last().unwrap();
//! assert!((last.x - 2.0).abs() < 1e-9);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `drift-core` | IDs, time windows, the record, errors, `Real` |
//! | [`grid`] | `drift-grid` | Edge handling and the tiled `Mesh` capability |
//! | [`field`] | `drift-field` | Velocity fields and velocity functions |
//! | [`solver`] | `drift-solver` | ODE problems, solutions, and solvers |
//! | [`engine`] | `drift-engine` | Particle sets, integration, postprocessing |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types (`drift-core`).
///
/// Particle and tile ids, [`types::TimeWindow`], the append-only
/// [`types::Record`], and the error enums shared by every layer.
pub use drift_core as types;

/// Grid topology (`drift-grid`).
///
/// Index resolution at grid edges and the [`grid::Mesh`] trait with its
/// rectangular [`grid::TiledMesh`] implementation.
pub use drift_grid as grid;

/// Velocity fields (`drift-field`).
///
/// [`field::VelocityField`] over arrays or meshes, and the
/// [`field::VelocityFunction`] extension point.
pub use drift_field as field;

/// ODE solvers (`drift-solver`).
///
/// The [`solver::Solver`] trait with [`solver::DormandPrince`] and
/// [`solver::Rk4`].
pub use drift_solver as solver;

/// Particle sets and integration (`drift-engine`).
pub use drift_engine as engine;

/// Common imports for typical drift usage.
///
/// ```rust
/// use drift::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use drift_core::{ParticleId, Real, Record, Row, TileId, TimeWindow};

    // Errors
    pub use drift_core::{IntegrateError, SolveError};
    pub use drift_engine::ConfigError;
    pub use drift_field::FieldError;

    // Grids
    pub use drift_grid::{GeoTransform, Mesh, TiledMesh};

    // Fields
    pub use drift_field::{
        ArrayField2, ArrayField3, Components, FieldInterpolant, MeshField2, MeshField3,
        TimeBounds, VelocityField, VelocityFunction,
    };

    // Solvers
    pub use drift_solver::{DormandPrince, Rk4, SaveAt, Solver};

    // Engine
    pub use drift_engine::{FieldRows, IntegrateReport, ParticleSet, Postprocess, RawRows};
}
