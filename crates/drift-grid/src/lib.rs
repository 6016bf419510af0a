//! Grid topology for drift.
//!
//! Velocity fields live in grid-index space. This crate answers the
//! topological questions interpolation and particle bookkeeping ask:
//! which cell an out-of-range index maps to ([`resolve_axis`]), which tile
//! lies across an edge ([`Mesh::neighbour`]), where a particle that left
//! its tile ended up ([`Mesh::update_location`]), and what a grid position
//! is in longitude/latitude ([`Mesh::lonlat`]).
//!
//! # Backends
//!
//! - Array grids: a single periodic array, handled with [`EdgeBehavior::Wrap`]
//!   horizontally and [`EdgeBehavior::Clamp`] vertically.
//! - [`TiledMesh`]: a rectangular mosaic of equally-sized tiles with
//!   optional periodicity per axis and an affine [`GeoTransform`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod edge;
pub mod error;
pub mod mesh;
pub mod tiled;

pub use edge::{resolve_axis, wrap_coord, EdgeBehavior};
pub use error::GridError;
pub use mesh::{Location, Mesh, Side};
pub use tiled::{GeoTransform, TiledMesh};
