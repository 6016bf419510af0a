//! Staggered-grid spatial stencils and linear temporal blending.
//!
//! Positions are continuous grid-index coordinates. A component stored at
//! offset `o` along an axis has its sample `i` at coordinate `i + o`, so
//! the stencil for coordinate `x` starts at `floor(x - o)`.

use drift_core::{Real, TimeWindow};

/// Which bracketing snapshot to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Snapshot {
    Start,
    End,
}

/// Face-centred axis.
pub(crate) const FACE: f64 = 0.0;
/// Cell-centred axis.
pub(crate) const CENTRE: f64 = 0.5;

/// Stencil origin and fraction. Origins beyond `i64` saturate, so callers
/// step to the neighbour with `saturating_add`.
#[inline]
fn cell<T: Real>(x: T, offset: f64) -> (i64, T) {
    let s = x - T::from_f64(offset);
    let f = s.floor();
    (f.to_f64() as i64, s - f)
}

/// Bilinear interpolation of a 2D staggered component.
#[inline]
pub(crate) fn bilinear<T: Real>(
    x: T,
    y: T,
    offset: [f64; 2],
    sample: impl Fn(i64, i64) -> T,
) -> T {
    let (i, fx) = cell(x, offset[0]);
    let (j, fy) = cell(y, offset[1]);
    let gx = T::ONE - fx;
    let gy = T::ONE - fy;
    let (i1, j1) = (i.saturating_add(1), j.saturating_add(1));
    gx * gy * sample(i, j)
        + fx * gy * sample(i1, j)
        + gx * fy * sample(i, j1)
        + fx * fy * sample(i1, j1)
}

/// Trilinear interpolation of a 3D staggered component.
#[inline]
pub(crate) fn trilinear<T: Real>(
    x: T,
    y: T,
    z: T,
    offset: [f64; 3],
    sample: impl Fn(i64, i64, i64) -> T,
) -> T {
    let (k, fz) = cell(z, offset[2]);
    let lower = bilinear(x, y, [offset[0], offset[1]], |i, j| sample(i, j, k));
    let upper = bilinear(x, y, [offset[0], offset[1]], |i, j| sample(i, j, k.saturating_add(1)));
    (T::ONE - fz) * lower + fz * upper
}

/// Blend the two snapshots linearly in time.
///
/// A degenerate window only evaluates the start snapshot.
#[inline]
pub(crate) fn in_time<T: Real, const N: usize>(
    window: &TimeWindow<T>,
    t: T,
    at: impl Fn(Snapshot) -> [T; N],
) -> [T; N] {
    let v0 = at(Snapshot::Start);
    let Some(a) = window.fraction(t) else {
        return v0;
    };
    let v1 = at(Snapshot::End);
    let mut out = v0;
    for (o, (a0, a1)) in out.iter_mut().zip(v0.into_iter().zip(v1)) {
        *o = (T::ONE - a) * a0 + a * a1;
    }
    out
}
