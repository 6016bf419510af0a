//! The initial value problem handed to a solver.

use drift_core::TimeWindow;

/// Right-hand side `du/dt = f(t, u)` of a flat state vector.
///
/// `u` is mutable: implementations may re-express the state (for example
/// a tile crossing) and the solver continues from the rewritten values.
/// Any `Fn(T, &mut [T], &mut [T])` closure is an `Rhs`.
pub trait Rhs<T> {
    /// Write `f(t, u)` into `du`.
    fn eval(&self, t: T, u: &mut [T], du: &mut [T]);
}

impl<T, F> Rhs<T> for F
where
    F: Fn(T, &mut [T], &mut [T]),
{
    fn eval(&self, t: T, u: &mut [T], du: &mut [T]) {
        self(t, u, du)
    }
}

/// An initial value problem over one time window.
pub struct Problem<'a, T> {
    /// The right-hand side.
    pub rhs: &'a dyn Rhs<T>,
    /// State at `window.start`.
    pub u0: &'a [T],
    /// Integration span; `end < start` integrates backwards.
    pub window: TimeWindow<T>,
}

impl<'a, T> Problem<'a, T> {
    /// Bundle a right-hand side, initial state and window.
    pub fn new(rhs: &'a dyn Rhs<T>, u0: &'a [T], window: TimeWindow<T>) -> Self {
        Self { rhs, u0, window }
    }

    /// Length of the state vector.
    pub fn dim(&self) -> usize {
        self.u0.len()
    }
}
