//! Gridded velocity fields for drift.
//!
//! A [`VelocityField`] holds velocity components on a staggered (C-grid)
//! layout at two bracketing times and interpolates them to any continuous
//! position and time. It is a closed set of four variants:
//!
//! | Variant | Storage | Horizontal topology |
//! |---------|---------|---------------------|
//! | [`ArrayField2`] | `Array2` per component | doubly periodic |
//! | [`ArrayField3`] | `Array3` per component | doubly periodic, clamped vertical |
//! | [`MeshField2`] | `Array2` per tile | [`Mesh`](drift_grid::Mesh) connectivity |
//! | [`MeshField3`] | `Array3` per tile | mesh connectivity, clamped vertical |
//!
//! [`VelocityFunction`] is the right-hand side handed to the solver; the
//! default [`FieldInterpolant`] looks velocities up in a `VelocityField`
//! and, on meshes, moves particles between tiles as they cross edges.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod error;
pub mod field;
pub(crate) mod interp;
pub mod mesh;
pub mod streamfunction;
pub mod velocity;

pub use array::{ArrayField2, ArrayField3};
pub use error::FieldError;
pub use field::{Components, FieldKind, TimeBounds, Velocity, VelocityField};
pub use mesh::{tiles_from_global, MeshField2, MeshField3};
pub use streamfunction::velocity_from_streamfunction;
pub use velocity::{FieldInterpolant, VelocityFunction};
