//! Core types for the drift particle-tracking engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! real-number abstraction, particle and tile identifiers, time windows,
//! the append-only trajectory [`Record`], and the error types shared by the
//! solver and the integration driver.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod real;
pub mod record;
pub mod window;

pub use error::{IntegrateError, SolveError};
pub use id::{ParticleId, TileId};
pub use real::Real;
pub use record::{Record, Row};
pub use window::{Direction, TimeWindow};
