//! Error types for grid construction.

use std::fmt;

/// Errors arising from grid or mesh construction.
#[derive(Clone, Debug, PartialEq)]
pub enum GridError {
    /// A layout or tile extent is zero.
    EmptyGrid {
        /// Which extent was zero.
        axis: &'static str,
    },
    /// A coordinate transform has a zero or non-finite spacing.
    InvalidTransform {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { axis } => write!(f, "grid extent '{axis}' must be non-zero"),
            Self::InvalidTransform { reason } => write!(f, "invalid transform: {reason}"),
        }
    }
}

impl std::error::Error for GridError {}
