//! Which times a solver records.

use drift_core::{Direction, Real, SolveError, TimeWindow};
use std::cmp::Ordering;

/// Save policy for a solve.
///
/// Every policy except [`SaveAt::Times`] records both window endpoints.
/// Solvers shorten steps to land exactly on each save time.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum SaveAt<T> {
    /// Only the start and end of the window.
    #[default]
    Endpoints,
    /// The start and every accepted step.
    Steps,
    /// The start, every `dt` after it, and the end.
    Every(T),
    /// The listed times that fall inside the window, in integration order.
    Times(Vec<T>),
}

/// Save times resolved against one window.
#[derive(Debug)]
pub(crate) struct Schedule<T> {
    stops: Option<Vec<T>>,
    next: usize,
    end: T,
}

impl<T: Real> Schedule<T> {
    pub(crate) fn new(save_at: &SaveAt<T>, window: TimeWindow<T>) -> Result<Self, SolveError> {
        let dir = window.direction();
        let stops = match save_at {
            SaveAt::Steps => None,
            SaveAt::Endpoints => Some(vec![window.start, window.end]),
            SaveAt::Every(dt) => {
                if !(dt.is_finite() && *dt > T::ZERO) {
                    return Err(SolveError::InvalidOptions {
                        reason: format!("save interval must be positive and finite, got {dt}"),
                    });
                }
                let step = match dir {
                    Direction::Forward => *dt,
                    Direction::Backward => -*dt,
                };
                let mut stops = Vec::new();
                let mut k = 0usize;
                loop {
                    let t = window.start + T::from_usize(k) * step;
                    if !dir.is_beyond(window.end, t) || (k > 0 && near(t, window.end)) {
                        break;
                    }
                    stops.push(t);
                    k += 1;
                }
                stops.push(window.end);
                Some(stops)
            }
            SaveAt::Times(times) => {
                if let Some(bad) = times.iter().find(|t| !t.is_finite()) {
                    return Err(SolveError::InvalidOptions {
                        reason: format!("save time {bad} is not finite"),
                    });
                }
                let mut stops: Vec<T> =
                    times.iter().copied().filter(|&t| window.contains(t)).collect();
                stops.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                if dir == Direction::Backward {
                    stops.reverse();
                }
                stops.dedup();
                Some(stops)
            }
        };
        Ok(Self {
            stops,
            next: 0,
            end: window.end,
        })
    }

    /// The next time a step must land on exactly.
    pub(crate) fn target(&self) -> T {
        self.stops
            .as_ref()
            .and_then(|s| s.get(self.next).copied())
            .unwrap_or(self.end)
    }

    /// Note that the solver reached `t`; `true` if `t` is to be saved.
    pub(crate) fn reached(&mut self, t: T) -> bool {
        match &self.stops {
            None => true,
            Some(stops) => {
                if stops.get(self.next) == Some(&t) {
                    self.next += 1;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// `true` if `a` and `b` differ only by accumulated rounding.
fn near<T: Real>(a: T, b: T) -> bool {
    let scale = a.abs().max(b.abs()).max(T::ONE);
    (b - a).abs() <= T::from_f64(10.0) * T::epsilon() * scale
}

/// Shorten `h` so a step from `t` does not pass `target`.
///
/// Returns the step and whether it lands on `target`. A step that would
/// stop a rounding error short of `target` is stretched onto it.
pub(crate) fn clip_step<T: Real>(t: T, h: T, target: T) -> (T, bool) {
    let remaining = target - t;
    if h.abs() >= remaining.abs() || near(t + h.abs() * remaining.signum(), target) {
        (remaining, true)
    } else {
        (h.abs() * remaining.signum(), false)
    }
}
