//! Non-divergent velocities from a streamfunction.

use crate::array::ArrayField2;
use crate::error::FieldError;
use drift_core::{Real, TimeWindow};
use drift_grid::{resolve_axis, EdgeBehavior};
use ndarray::Array2;

/// Staggered `(u, v)` from a periodic streamfunction sampled at cell corners.
///
/// `psi[i,j]` sits at index position `(i, j)`. The differences
/// `u = -dpsi/dy` and `v = dpsi/dx` land exactly on the C-grid faces, so
/// the discrete divergence of every cell is zero.
pub fn velocity_from_streamfunction<T: Real>(psi: &Array2<T>) -> (Array2<T>, Array2<T>) {
    let (nx, ny) = psi.dim();
    let at = |i: usize, j: usize| {
        psi[[
            resolve_axis(i as i64, nx, EdgeBehavior::Wrap),
            resolve_axis(j as i64, ny, EdgeBehavior::Wrap),
        ]]
    };
    let u = Array2::from_shape_fn((nx, ny), |(i, j)| at(i, j) - at(i, j + 1));
    let v = Array2::from_shape_fn((nx, ny), |(i, j)| at(i + 1, j) - at(i, j));
    (u, v)
}

impl<T: Real> ArrayField2<T> {
    /// A stationary field derived from a corner streamfunction.
    ///
    /// # Errors
    ///
    /// Returns `Err` if `psi` is empty or the window is invalid.
    pub fn from_streamfunction(
        psi: &Array2<T>,
        time_bounds: impl Into<TimeWindow<T>>,
    ) -> Result<Self, FieldError> {
        if psi.is_empty() {
            return Err(FieldError::EmptyGrid { component: "psi" });
        }
        let (u, v) = velocity_from_streamfunction(psi);
        Self::stationary(u, v, time_bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn gyre(n: usize) -> Array2<f64> {
        Array2::from_shape_fn((n, n), |(i, j)| {
            let x = 2.0 * PI * i as f64 / n as f64;
            let y = 2.0 * PI * j as f64 / n as f64;
            x.sin() * y.sin()
        })
    }

    #[test]
    fn discrete_divergence_vanishes() {
        let n = 12;
        let (u, v) = velocity_from_streamfunction(&gyre(n));
        for i in 0..n {
            for j in 0..n {
                let div = u[[(i + 1) % n, j]] - u[[i, j]] + v[[i, (j + 1) % n]] - v[[i, j]];
                assert!(div.abs() < 1e-12, "cell ({i},{j}) divergence {div}");
            }
        }
    }

    #[test]
    fn constant_streamfunction_is_at_rest() {
        let psi = Array2::from_elem((5, 4), 3.0f64);
        let (u, v) = velocity_from_streamfunction(&psi);
        assert!(u.iter().chain(v.iter()).all(|&c| c == 0.0));
    }

    #[test]
    fn linear_streamfunction_gives_uniform_flow() {
        // psi = -j inside the array; the wrap seam is excluded.
        let psi = Array2::from_shape_fn((6, 6), |(_, j)| -(j as f64));
        let (u, v) = velocity_from_streamfunction(&psi);
        for i in 0..6 {
            for j in 0..5 {
                assert_eq!(u[[i, j]], 1.0);
            }
        }
        assert!(v.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn field_from_streamfunction_interpolates() {
        let field = ArrayField2::from_streamfunction(&gyre(16), (0.0, 1.0)).unwrap();
        let vel = field.velocity(4.0, 8.5, 0.5);
        assert!(vel[0].is_finite() && vel[1].is_finite());
        assert_eq!(field.shape(), (16, 16));
    }

    #[test]
    fn empty_streamfunction_is_rejected() {
        let psi = Array2::<f64>::zeros((0, 3));
        assert_eq!(
            ArrayField2::from_streamfunction(&psi, (0.0, 1.0)).unwrap_err(),
            FieldError::EmptyGrid { component: "psi" }
        );
    }
}
