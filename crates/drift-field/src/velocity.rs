//! Right-hand-side functions evaluated per particle by the solver.

use crate::field::VelocityField;
use drift_core::Real;

/// Velocity of one particle: `out = d(state)/dt` at time `t`.
///
/// `state` is mutable so implementations may re-express the particle's
/// position (for example after it crosses onto another tile). The solver
/// keeps such rewrites. `out` has the same length as `state`.
///
/// Any `Fn(&P, T, &mut [T], &mut [T])` closure is a velocity function.
pub trait VelocityFunction<T, P: ?Sized>: Send + Sync {
    /// Write the derivative of `state` into `out`.
    fn velocity(&self, params: &P, t: T, state: &mut [T], out: &mut [T]);
}

impl<T, P: ?Sized, F> VelocityFunction<T, P> for F
where
    F: Fn(&P, T, &mut [T], &mut [T]) + Send + Sync,
{
    fn velocity(&self, params: &P, t: T, state: &mut [T], out: &mut [T]) {
        self(params, t, state, out)
    }
}

/// The default velocity function for [`VelocityField`] parameters.
///
/// Mesh variants first move the particle onto the tile holding it, then
/// interpolate. The tile-id row has zero derivative.
#[derive(Clone, Copy, Debug, Default)]
pub struct FieldInterpolant;

impl<T: Real> VelocityFunction<T, VelocityField<T>> for FieldInterpolant {
    fn velocity(&self, field: &VelocityField<T>, t: T, state: &mut [T], out: &mut [T]) {
        field.locate(state);
        let vel = field.velocity(state, t);
        let (head, tail) = out.split_at_mut(vel.len());
        head.copy_from_slice(&vel);
        tail.fill(T::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArrayField2;
    use crate::mesh::{tiles_from_global, MeshField2};
    use drift_grid::TiledMesh;
    use ndarray::Array2;
    use std::sync::Arc;

    #[test]
    fn closures_are_velocity_functions() {
        let decay = |k: &f64, _t: f64, s: &mut [f64], out: &mut [f64]| {
            for (o, x) in out.iter_mut().zip(s.iter()) {
                *o = -k * x;
            }
        };
        let mut state = [2.0, -4.0];
        let mut out = [0.0; 2];
        decay.velocity(&0.5, 0.0, &mut state, &mut out);
        assert_eq!(out, [-1.0, 2.0]);
    }

    #[test]
    fn array_field_leaves_state_untouched() {
        let field: VelocityField<f64> = ArrayField2::stationary(
            Array2::from_elem((4, 4), 1.0),
            Array2::from_elem((4, 4), -1.0),
            (0.0, 1.0),
        )
        .unwrap()
        .into();
        let mut state = [7.5, -2.0];
        let mut out = [0.0; 2];
        FieldInterpolant.velocity(&field, 0.0, &mut state, &mut out);
        assert_eq!(state, [7.5, -2.0]);
        assert_eq!(out, [1.0, -1.0]);
    }

    #[test]
    fn mesh_field_moves_particle_and_zeroes_tile_rate() {
        let tiled = TiledMesh::new(2, 1, 4, 4).unwrap();
        let u = tiles_from_global(&tiled, &Array2::from_elem((8, 4), 0.5)).unwrap();
        let v = tiles_from_global(&tiled, &Array2::from_elem((8, 4), 0.25)).unwrap();
        let field: VelocityField<f64> = MeshField2::stationary(Arc::new(tiled), u, v, (0.0, 1.0))
            .unwrap()
            .into();
        let mut state = [4.5, 1.0, 0.0];
        let mut out = [9.0; 3];
        FieldInterpolant.velocity(&field, 0.0, &mut state, &mut out);
        assert_eq!(state, [0.5, 1.0, 1.0]);
        assert_eq!(out, [0.5, 0.25, 0.0]);
    }
}
