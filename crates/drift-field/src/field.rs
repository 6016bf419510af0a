//! The closed [`VelocityField`] enum and shared validation.

use crate::array::{ArrayField2, ArrayField3};
use crate::error::FieldError;
use crate::mesh::{MeshField2, MeshField3};
use drift_core::{Real, TimeWindow};
use ndarray::{Array2, Array3};
use smallvec::SmallVec;

/// An interpolated velocity vector (2 or 3 components).
pub type Velocity<T> = SmallVec<[T; 3]>;

/// Which [`VelocityField`] variant a value is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Single periodic 2D array.
    Array2D,
    /// Single 3D array, periodic horizontally.
    Array3D,
    /// Multi-tile 2D mesh.
    Mesh2D,
    /// Multi-tile 3D mesh.
    Mesh3D,
}

impl FieldKind {
    /// Number of spatial dimensions.
    pub fn dims(self) -> usize {
        match self {
            Self::Array2D | Self::Mesh2D => 2,
            Self::Array3D | Self::Mesh3D => 3,
        }
    }

    /// `true` for the multi-tile variants.
    pub fn is_mesh(self) -> bool {
        matches!(self, Self::Mesh2D | Self::Mesh3D)
    }

    /// Rows per particle in the state array: the spatial dimensions plus
    /// a trailing tile-id row on meshes.
    pub fn state_dim(self) -> usize {
        self.dims() + usize::from(self.is_mesh())
    }
}

/// One snapshot of velocity components, shaped for a [`VelocityField`]
/// variant. Used to advance a field to its next window.
#[derive(Clone, Debug)]
pub enum Components<T> {
    /// Components for [`ArrayField2`].
    Array2D {
        /// Zonal component.
        u: Array2<T>,
        /// Meridional component.
        v: Array2<T>,
    },
    /// Components for [`ArrayField3`].
    Array3D {
        /// Zonal component.
        u: Array3<T>,
        /// Meridional component.
        v: Array3<T>,
        /// Vertical component.
        w: Array3<T>,
    },
    /// Per-tile components for [`MeshField2`].
    Mesh2D {
        /// Zonal component, one grid per tile.
        u: Vec<Array2<T>>,
        /// Meridional component, one grid per tile.
        v: Vec<Array2<T>>,
    },
    /// Per-tile components for [`MeshField3`].
    Mesh3D {
        /// Zonal component, one grid per tile.
        u: Vec<Array3<T>>,
        /// Meridional component, one grid per tile.
        v: Vec<Array3<T>>,
        /// Vertical component, one grid per tile.
        w: Vec<Array3<T>>,
    },
}

impl<T> Components<T> {
    /// The variant these components fit.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Array2D { .. } => FieldKind::Array2D,
            Self::Array3D { .. } => FieldKind::Array3D,
            Self::Mesh2D { .. } => FieldKind::Mesh2D,
            Self::Mesh3D { .. } => FieldKind::Mesh3D,
        }
    }
}

/// Parameter bundles that know their own bracketing time window.
///
/// Used by the default integration overload, which integrates over the
/// bundle's window when the caller gives none.
pub trait TimeBounds<T> {
    /// The bracketing window, or `None` if the bundle has none.
    fn time_bounds(&self) -> Option<TimeWindow<T>>;
}

/// Velocity components at two bracketing times on one of four grid kinds.
///
/// Immutable once built. Advancing to another window produces a new value
/// ([`with_time_bounds`](Self::with_time_bounds), or `next_window` on the
/// concrete variants).
#[derive(Clone, Debug)]
pub enum VelocityField<T> {
    /// See [`ArrayField2`].
    Array2D(ArrayField2<T>),
    /// See [`ArrayField3`].
    Array3D(ArrayField3<T>),
    /// See [`MeshField2`].
    Mesh2D(MeshField2<T>),
    /// See [`MeshField3`].
    Mesh3D(MeshField3<T>),
}

impl<T: Real> VelocityField<T> {
    /// The variant tag.
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Array2D(_) => FieldKind::Array2D,
            Self::Array3D(_) => FieldKind::Array3D,
            Self::Mesh2D(_) => FieldKind::Mesh2D,
            Self::Mesh3D(_) => FieldKind::Mesh3D,
        }
    }

    /// Rows per particle in the state array.
    pub fn state_dim(&self) -> usize {
        self.kind().state_dim()
    }

    /// The bracketing window `[t0, t1]`.
    pub fn window(&self) -> TimeWindow<T> {
        match self {
            Self::Array2D(f) => f.time_bounds(),
            Self::Array3D(f) => f.time_bounds(),
            Self::Mesh2D(f) => f.time_bounds(),
            Self::Mesh3D(f) => f.time_bounds(),
        }
    }

    /// The same velocities bracketed by a different window.
    pub fn with_time_bounds(self, window: TimeWindow<T>) -> Result<Self, FieldError> {
        Ok(match self {
            Self::Array2D(f) => Self::Array2D(f.with_time_bounds(window)?),
            Self::Array3D(f) => Self::Array3D(f.with_time_bounds(window)?),
            Self::Mesh2D(f) => Self::Mesh2D(f.with_time_bounds(window)?),
            Self::Mesh3D(f) => Self::Mesh3D(f.with_time_bounds(window)?),
        })
    }

    /// Advance to `[t1, t_next]`: the end snapshot becomes the start and
    /// `next` becomes the end.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `next` is for another variant or has the wrong
    /// shape, or if `t_next` precedes the current end.
    pub fn next_window(self, next: Components<T>, t_next: T) -> Result<Self, FieldError> {
        Ok(match (self, next) {
            (Self::Array2D(f), Components::Array2D { u, v }) => {
                Self::Array2D(f.next_window(u, v, t_next)?)
            }
            (Self::Array3D(f), Components::Array3D { u, v, w }) => {
                Self::Array3D(f.next_window(u, v, w, t_next)?)
            }
            (Self::Mesh2D(f), Components::Mesh2D { u, v }) => {
                Self::Mesh2D(f.next_window(u, v, t_next)?)
            }
            (Self::Mesh3D(f), Components::Mesh3D { u, v, w }) => {
                Self::Mesh3D(f.next_window(u, v, w, t_next)?)
            }
            (field, next) => {
                return Err(FieldError::VariantMismatch {
                    expected: field.kind(),
                    got: next.kind(),
                })
            }
        })
    }

    /// Resolve a particle state onto the tile that holds it.
    ///
    /// Rewrites `state` in place on mesh variants when the particle has
    /// crossed a tile edge; a no-op on array variants.
    pub fn locate(&self, state: &mut [T]) {
        match self {
            Self::Array2D(_) | Self::Array3D(_) => {}
            Self::Mesh2D(f) => f.locate(state),
            Self::Mesh3D(f) => f.locate(state),
        }
    }

    /// Interpolated velocity at a particle state and time.
    ///
    /// `state` is laid out as `[x, y]`, `[x, y, z]`, `[x, y, fid]` or
    /// `[x, y, z, fid]` depending on the variant.
    pub fn velocity(&self, state: &[T], t: T) -> Velocity<T> {
        match self {
            Self::Array2D(f) => SmallVec::from_slice(&f.velocity(state[0], state[1], t)),
            Self::Array3D(f) => {
                SmallVec::from_slice(&f.velocity(state[0], state[1], state[2], t))
            }
            Self::Mesh2D(f) => SmallVec::from_slice(&f.velocity(state, t)),
            Self::Mesh3D(f) => SmallVec::from_slice(&f.velocity(state, t)),
        }
    }
}

impl<T: Real> TimeBounds<T> for VelocityField<T> {
    fn time_bounds(&self) -> Option<TimeWindow<T>> {
        Some(self.window())
    }
}

impl<T> From<ArrayField2<T>> for VelocityField<T> {
    fn from(f: ArrayField2<T>) -> Self {
        Self::Array2D(f)
    }
}

impl<T> From<ArrayField3<T>> for VelocityField<T> {
    fn from(f: ArrayField3<T>) -> Self {
        Self::Array3D(f)
    }
}

impl<T> From<MeshField2<T>> for VelocityField<T> {
    fn from(f: MeshField2<T>) -> Self {
        Self::Mesh2D(f)
    }
}

impl<T> From<MeshField3<T>> for VelocityField<T> {
    fn from(f: MeshField3<T>) -> Self {
        Self::Mesh3D(f)
    }
}

/// Reject non-finite or backwards time bounds.
pub(crate) fn check_window<T: Real>(w: &TimeWindow<T>) -> Result<(), FieldError> {
    if !w.is_finite() || w.end < w.start {
        return Err(FieldError::InvalidTimeBounds {
            start: w.start.to_f64(),
            end: w.end.to_f64(),
        });
    }
    Ok(())
}

/// Check every named component against the expected shape.
pub(crate) fn check_shapes(
    expected: &[usize],
    components: &[(&'static str, &[usize])],
) -> Result<(), FieldError> {
    for &(component, shape) in components {
        if shape.contains(&0) {
            return Err(FieldError::EmptyGrid { component });
        }
        if shape != expected {
            return Err(FieldError::ShapeMismatch {
                component,
                expected: expected.to_vec(),
                got: shape.to_vec(),
            });
        }
    }
    Ok(())
}
