//! Axis resolution for out-of-range grid indices.

use drift_core::Real;

/// How an axis treats indices beyond its extent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeBehavior {
    /// Periodic: index `len` is index `0`.
    Wrap,
    /// Closed: indices saturate at `0` and `len - 1`.
    Clamp,
}

/// Resolve a single axis index under the given edge behavior.
///
/// `len` must be non-zero; grids validate that at construction.
#[inline]
pub fn resolve_axis(val: i64, len: usize, edge: EdgeBehavior) -> usize {
    let n = len as i64;
    if val >= 0 && val < n {
        return val as usize;
    }
    match edge {
        EdgeBehavior::Clamp => val.clamp(0, n - 1) as usize,
        EdgeBehavior::Wrap => val.rem_euclid(n) as usize,
    }
}

/// Wrap a continuous coordinate into `[0, len)`.
#[inline]
pub fn wrap_coord<T: Real>(x: T, len: usize) -> T {
    x.rem_euclid(T::from_usize(len))
}
