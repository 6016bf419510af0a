//! Single-array velocity fields on a doubly periodic domain.

use crate::error::FieldError;
use crate::field::{check_shapes, check_window};
use crate::interp::{bilinear, in_time, trilinear, Snapshot, CENTRE, FACE};
use drift_core::{Real, TimeWindow};
use drift_grid::{resolve_axis, wrap_coord, EdgeBehavior};
use ndarray::{Array2, Array3};

fn periodic2<T: Real>(a: &Array2<T>) -> impl Fn(i64, i64) -> T + '_ {
    let (nx, ny) = a.dim();
    move |i, j| {
        a[[
            resolve_axis(i, nx, EdgeBehavior::Wrap),
            resolve_axis(j, ny, EdgeBehavior::Wrap),
        ]]
    }
}

fn periodic3<T: Real>(a: &Array3<T>) -> impl Fn(i64, i64, i64) -> T + '_ {
    let (nx, ny, nz) = a.dim();
    move |i, j, k| {
        a[[
            resolve_axis(i, nx, EdgeBehavior::Wrap),
            resolve_axis(j, ny, EdgeBehavior::Wrap),
            resolve_axis(k, nz, EdgeBehavior::Clamp),
        ]]
    }
}

/// 2D velocity on a single doubly periodic C-grid array.
///
/// `u[i,j]` sits at index position `(i, j + 0.5)` and `v[i,j]` at
/// `(i + 0.5, j)`. Velocities are in grid cells per unit time.
///
/// # Examples
///
/// ```
/// use drift_field::ArrayField2;
/// use ndarray::Array2;
///
/// let u = Array2::from_elem((8, 8), 0.5f64);
/// let v = Array2::from_elem((8, 8), -0.25f64);
/// let field = ArrayField2::stationary(u, v, (0.0, 10.0)).unwrap();
/// assert_eq!(field.velocity(3.0, 7.5, 0.0), [0.5, -0.25]);
/// ```
#[derive(Clone, Debug)]
pub struct ArrayField2<T> {
    u0: Array2<T>,
    v0: Array2<T>,
    u1: Array2<T>,
    v1: Array2<T>,
    time_bounds: TimeWindow<T>,
}

impl<T: Real> ArrayField2<T> {
    /// Build from the two bracketing snapshots.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a component is empty, shapes differ from `u0`'s,
    /// or the window is non-finite or backwards.
    pub fn new(
        u0: Array2<T>,
        v0: Array2<T>,
        u1: Array2<T>,
        v1: Array2<T>,
        time_bounds: impl Into<TimeWindow<T>>,
    ) -> Result<Self, FieldError> {
        let time_bounds = time_bounds.into();
        check_window(&time_bounds)?;
        let expected = u0.shape().to_vec();
        check_shapes(
            &expected,
            &[
                ("u0", u0.shape()),
                ("v0", v0.shape()),
                ("u1", u1.shape()),
                ("v1", v1.shape()),
            ],
        )?;
        Ok(Self {
            u0,
            v0,
            u1,
            v1,
            time_bounds,
        })
    }

    /// A field whose two snapshots are the same.
    pub fn stationary(
        u: Array2<T>,
        v: Array2<T>,
        time_bounds: impl Into<TimeWindow<T>>,
    ) -> Result<Self, FieldError> {
        Self::new(u.clone(), v.clone(), u, v, time_bounds)
    }

    /// Grid extent `(nx, ny)`.
    pub fn shape(&self) -> (usize, usize) {
        self.u0.dim()
    }

    /// The bracketing window.
    pub fn time_bounds(&self) -> TimeWindow<T> {
        self.time_bounds
    }

    /// `(u, v)` at the start of the window.
    pub fn start(&self) -> (&Array2<T>, &Array2<T>) {
        (&self.u0, &self.v0)
    }

    /// `(u, v)` at the end of the window.
    pub fn end(&self) -> (&Array2<T>, &Array2<T>) {
        (&self.u1, &self.v1)
    }

    /// The same snapshots bracketed by another window.
    pub fn with_time_bounds(mut self, window: TimeWindow<T>) -> Result<Self, FieldError> {
        check_window(&window)?;
        self.time_bounds = window;
        Ok(self)
    }

    /// Slide forward one window: the end snapshot becomes the start and
    /// `(u_next, v_next)` at `t_next` becomes the end.
    pub fn next_window(
        self,
        u_next: Array2<T>,
        v_next: Array2<T>,
        t_next: T,
    ) -> Result<Self, FieldError> {
        let window = TimeWindow::new(self.time_bounds.end, t_next);
        Self::new(self.u1, self.v1, u_next, v_next, window)
    }

    /// Interpolated `[u, v]` at index position `(x, y)` and time `t`.
    pub fn velocity(&self, x: T, y: T, t: T) -> [T; 2] {
        let (nx, ny) = self.shape();
        let (x, y) = (wrap_coord(x, nx), wrap_coord(y, ny));
        in_time(&self.time_bounds, t, |s| {
            let (u, v) = match s {
                Snapshot::Start => (&self.u0, &self.v0),
                Snapshot::End => (&self.u1, &self.v1),
            };
            [
                bilinear(x, y, [FACE, CENTRE], periodic2(u)),
                bilinear(x, y, [CENTRE, FACE], periodic2(v)),
            ]
        })
    }
}

/// 3D velocity on a single C-grid array, periodic in `x` and `y`.
///
/// `u` sits at `(i, j+.5, k+.5)`, `v` at `(i+.5, j, k+.5)` and `w` at
/// `(i+.5, j+.5, k)`. The vertical axis is closed: stencils reaching past
/// the top or bottom level reuse the outermost level.
#[derive(Clone, Debug)]
pub struct ArrayField3<T> {
    u0: Array3<T>,
    v0: Array3<T>,
    w0: Array3<T>,
    u1: Array3<T>,
    v1: Array3<T>,
    w1: Array3<T>,
    time_bounds: TimeWindow<T>,
}

impl<T: Real> ArrayField3<T> {
    /// Build from the two bracketing snapshots.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        u0: Array3<T>,
        v0: Array3<T>,
        w0: Array3<T>,
        u1: Array3<T>,
        v1: Array3<T>,
        w1: Array3<T>,
        time_bounds: impl Into<TimeWindow<T>>,
    ) -> Result<Self, FieldError> {
        let time_bounds = time_bounds.into();
        check_window(&time_bounds)?;
        let expected = u0.shape().to_vec();
        check_shapes(
            &expected,
            &[
                ("u0", u0.shape()),
                ("v0", v0.shape()),
                ("w0", w0.shape()),
                ("u1", u1.shape()),
                ("v1", v1.shape()),
                ("w1", w1.shape()),
            ],
        )?;
        Ok(Self {
            u0,
            v0,
            w0,
            u1,
            v1,
            w1,
            time_bounds,
        })
    }

    /// A field whose two snapshots are the same.
    pub fn stationary(
        u: Array3<T>,
        v: Array3<T>,
        w: Array3<T>,
        time_bounds: impl Into<TimeWindow<T>>,
    ) -> Result<Self, FieldError> {
        Self::new(u.clone(), v.clone(), w.clone(), u, v, w, time_bounds)
    }

    /// Grid extent `(nx, ny, nz)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        self.u0.dim()
    }

    /// The bracketing window.
    pub fn time_bounds(&self) -> TimeWindow<T> {
        self.time_bounds
    }

    /// The same snapshots bracketed by another window.
    pub fn with_time_bounds(mut self, window: TimeWindow<T>) -> Result<Self, FieldError> {
        check_window(&window)?;
        self.time_bounds = window;
        Ok(self)
    }

    /// Slide forward one window, installing `(u, v, w)` at `t_next`.
    pub fn next_window(
        self,
        u_next: Array3<T>,
        v_next: Array3<T>,
        w_next: Array3<T>,
        t_next: T,
    ) -> Result<Self, FieldError> {
        let window = TimeWindow::new(self.time_bounds.end, t_next);
        Self::new(
            self.u1, self.v1, self.w1, u_next, v_next, w_next, window,
        )
    }

    /// Interpolated `[u, v, w]` at `(x, y, z)` and time `t`.
    pub fn velocity(&self, x: T, y: T, z: T, t: T) -> [T; 3] {
        let (nx, ny, _) = self.u0.dim();
        let (x, y) = (wrap_coord(x, nx), wrap_coord(y, ny));
        in_time(&self.time_bounds, t, |s| {
            let (u, v, w) = match s {
                Snapshot::Start => (&self.u0, &self.v0, &self.w0),
                Snapshot::End => (&self.u1, &self.v1, &self.w1),
            };
            [
                trilinear(x, y, z, [FACE, CENTRE, CENTRE], periodic3(u)),
                trilinear(x, y, z, [CENTRE, FACE, CENTRE], periodic3(v)),
                trilinear(x, y, z, [CENTRE, CENTRE, FACE], periodic3(w)),
            ]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ramp(nx: usize, ny: usize, scale: f64) -> Array2<f64> {
        Array2::from_shape_fn((nx, ny), |(i, j)| scale * ((i * 7 + j * 3) % 11) as f64)
    }

    #[test]
    fn rejects_mismatched_shapes() {
        let err = ArrayField2::new(
            ramp(4, 4, 1.0),
            ramp(4, 5, 1.0),
            ramp(4, 4, 1.0),
            ramp(4, 4, 1.0),
            (0.0, 1.0),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FieldError::ShapeMismatch {
                component: "v0",
                expected: vec![4, 4],
                got: vec![4, 5],
            }
        );
    }

    #[test]
    fn rejects_empty_grid() {
        let e = Array2::<f64>::zeros((0, 4));
        let err = ArrayField2::stationary(e.clone(), e, (0.0, 1.0)).unwrap_err();
        assert_eq!(err, FieldError::EmptyGrid { component: "u0" });
    }

    #[test]
    fn rejects_backwards_or_nan_bounds() {
        let u = ramp(3, 3, 1.0);
        assert!(matches!(
            ArrayField2::stationary(u.clone(), u.clone(), (2.0, 1.0)),
            Err(FieldError::InvalidTimeBounds { .. })
        ));
        assert!(matches!(
            ArrayField2::stationary(u.clone(), u, (0.0, f64::NAN)),
            Err(FieldError::InvalidTimeBounds { .. })
        ));
    }

    #[test]
    fn degenerate_window_returns_start_snapshot_exactly() {
        let u0 = ramp(6, 6, 1.0);
        let v0 = ramp(6, 6, -2.0);
        let nan = Array2::from_elem((6, 6), f64::NAN);
        let f = ArrayField2::new(u0.clone(), v0.clone(), nan.clone(), nan, (5.0, 5.0)).unwrap();
        // Exactly on a u sample and a v sample.
        let [u, _] = f.velocity(2.0, 3.5, 123.0);
        assert_eq!(u, u0[[2, 3]]);
        let [_, v] = f.velocity(2.5, 3.0, -4.0);
        assert_eq!(v, v0[[2, 3]]);
        let [u, v] = f.velocity(1.7, 4.2, 5.0);
        assert!(u.is_finite() && v.is_finite());
    }

    #[test]
    fn temporal_blend_is_linear() {
        let z = Array2::from_elem((4, 4), 0.0);
        let one = Array2::from_elem((4, 4), 1.0);
        let f = ArrayField2::new(z.clone(), z, one.clone(), one, (0.0, 4.0)).unwrap();
        assert_eq!(f.velocity(1.0, 1.0, 1.0), [0.25, 0.25]);
        // Extrapolates past the window.
        assert_eq!(f.velocity(1.0, 1.0, 8.0), [2.0, 2.0]);
    }

    #[test]
    fn interpolates_across_the_periodic_seam() {
        let mut u = Array2::from_elem((4, 4), 0.0);
        u[[3, 0]] = 1.0;
        let v = Array2::from_elem((4, 4), 0.0);
        let f = ArrayField2::stationary(u, v, (0.0, 1.0)).unwrap();
        // Halfway between u[3,*] at x=3 and u[0,*] at x=4 (wrapped).
        let [a, _] = f.velocity(3.5, 0.5, 0.0);
        assert!((a - 0.5).abs() < 1e-12);
    }

    #[test]
    fn far_away_coordinates_wrap_instead_of_overflowing() {
        let u = ramp(4, 4, 0.5);
        let v = ramp(4, 4, -0.25);
        let f = ArrayField2::stationary(u, v, (0.0, 1.0)).unwrap();
        // A multiple of the period with room left for the fraction.
        let far = (1u64 << 42) as f64;
        assert_eq!(f.velocity(far + 1.5, 2.5, 0.0), f.velocity(1.5, 2.5, 0.0));
        let [a, b] = f.velocity(1e30, -1e30, 0.0);
        assert!(a.is_finite() && b.is_finite());

        let g = Array3::from_elem((4, 4, 2), 1.0);
        let f = ArrayField3::stationary(g.clone(), g.clone(), g, (0.0, 1.0)).unwrap();
        assert_eq!(f.velocity(1e30, 1e30, 1e30, 0.0), [1.0, 1.0, 1.0]);
    }

    #[test]
    fn next_window_promotes_end_snapshot() {
        let a = Array2::from_elem((2, 2), 1.0);
        let b = Array2::from_elem((2, 2), 2.0);
        let c = Array2::from_elem((2, 2), 3.0);
        let f = ArrayField2::new(a.clone(), a, b.clone(), b, (0.0, 1.0)).unwrap();
        let f = f.next_window(c.clone(), c, 3.0).unwrap();
        assert_eq!(f.time_bounds(), TimeWindow::new(1.0, 3.0));
        assert_eq!(f.velocity(0.5, 0.5, 1.0), [2.0, 2.0]);
        assert_eq!(f.velocity(0.5, 0.5, 2.0), [2.5, 2.5]);
    }

    #[test]
    fn vertical_axis_is_clamped_not_wrapped() {
        let (nx, ny, nz) = (4, 4, 3);
        let zero = Array3::from_elem((nx, ny, nz), 0.0);
        let w = Array3::from_shape_fn((nx, ny, nz), |(_, _, k)| k as f64);
        let f = ArrayField3::stationary(zero.clone(), zero, w, (0.0, 1.0)).unwrap();
        assert!((f.velocity(1.5, 1.5, 1.5, 0.0)[2] - 1.5).abs() < 1e-12);
        // Above the top level the stencil saturates at k = nz - 1.
        assert_eq!(f.velocity(1.5, 1.5, 10.0, 0.0)[2], 2.0);
        assert_eq!(f.velocity(1.5, 1.5, -3.0, 0.0)[2], 0.0);
    }

    proptest! {
        #[test]
        fn interpolation_is_periodic(
            x in 0.0f64..16.0,
            y in 0.0f64..16.0,
            kx in -2i32..3,
            ky in -2i32..3,
        ) {
            let u = ramp(16, 16, 0.1);
            let v = ramp(16, 16, -0.3);
            let f = ArrayField2::stationary(u, v, (0.0, 1.0)).unwrap();
            let a = f.velocity(x, y, 0.5);
            let b = f.velocity(x + 16.0 * kx as f64, y + 16.0 * ky as f64, 0.5);
            prop_assert!((a[0] - b[0]).abs() < 1e-9);
            prop_assert!((a[1] - b[1]).abs() < 1e-9);
        }

        #[test]
        fn interpolation_3d_is_horizontally_periodic(
            x in 0.0f64..8.0,
            y in 0.0f64..8.0,
            z in 0.0f64..4.0,
        ) {
            let g = Array3::from_shape_fn((8, 8, 4), |(i, j, k)| ((i * 5 + j * 3 + k) % 7) as f64);
            let f = ArrayField3::stationary(g.clone(), g.clone(), g, (0.0, 1.0)).unwrap();
            let a = f.velocity(x, y, z, 0.0);
            let b = f.velocity(x + 8.0, y - 8.0, z, 0.0);
            for c in 0..3 {
                prop_assert!((a[c] - b[c]).abs() < 1e-9);
            }
        }
    }
}
