//! Error types for velocity field construction.

use crate::field::FieldKind;
use std::fmt;

/// Errors detected while building a velocity field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldError {
    /// A component grid has a zero extent.
    EmptyGrid {
        /// Name of the offending component (`"u0"`, `"w1"`, ...).
        component: &'static str,
    },
    /// A component grid's shape differs from `u0`'s.
    ShapeMismatch {
        /// Name of the offending component.
        component: &'static str,
        /// Shape of `u0` (or of the mesh tile).
        expected: Vec<usize>,
        /// Shape actually supplied.
        got: Vec<usize>,
    },
    /// A mesh component does not have one grid per tile.
    TileCountMismatch {
        /// Name of the offending component.
        component: &'static str,
        /// Number of tiles in the mesh.
        expected: usize,
        /// Number of grids supplied.
        got: usize,
    },
    /// Next-window components belong to a different field variant.
    VariantMismatch {
        /// Variant of the field being advanced.
        expected: FieldKind,
        /// Variant of the supplied components.
        got: FieldKind,
    },
    /// Time bounds are non-finite or run backwards.
    InvalidTimeBounds {
        /// Supplied start.
        start: f64,
        /// Supplied end.
        end: f64,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { component } => {
                write!(f, "component '{component}' has a zero-sized grid")
            }
            Self::ShapeMismatch {
                component,
                expected,
                got,
            } => write!(
                f,
                "component '{component}' has shape {got:?}, expected {expected:?}"
            ),
            Self::TileCountMismatch {
                component,
                expected,
                got,
            } => write!(
                f,
                "component '{component}' has {got} tiles, mesh has {expected}"
            ),
            Self::VariantMismatch { expected, got } => {
                write!(f, "{got:?} components cannot advance a {expected:?} field")
            }
            Self::InvalidTimeBounds { start, end } => write!(
                f,
                "time bounds [{start}, {end}] must be finite with start <= end"
            ),
        }
    }
}

impl std::error::Error for FieldError {}
