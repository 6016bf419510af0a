//! Time windows and integration direction.

use crate::real::Real;

/// Direction of integration through time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// `start <= end`. Degenerate windows count as forward.
    Forward,
    /// `start > end`.
    Backward,
}

impl Direction {
    /// `true` if `later` lies strictly beyond `earlier` in this direction.
    pub fn is_beyond<T: Real>(self, later: T, earlier: T) -> bool {
        match self {
            Self::Forward => later > earlier,
            Self::Backward => later < earlier,
        }
    }
}

/// An ordered pair of times `[start, end]`.
///
/// Used both as the bracketing interval of a velocity field (linear
/// interpolation between two snapshots) and as the span of one
/// integration call. `end < start` is a valid backward window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeWindow<T> {
    /// First time of the window.
    pub start: T,
    /// Last time of the window.
    pub end: T,
}

impl<T: Real> TimeWindow<T> {
    /// Create a window from its two endpoints.
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    /// Signed length `end - start`.
    pub fn span(&self) -> T {
        self.end - self.start
    }

    /// `true` when `start == end`.
    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// `true` when both endpoints are finite.
    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    /// Forward unless `end < start`.
    pub fn direction(&self) -> Direction {
        if self.end < self.start {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    /// Fractional position of `t` within the window.
    ///
    /// `0` at `start`, `1` at `end`, linear continuation outside. Returns
    /// `None` for a degenerate window instead of dividing by zero.
    pub fn fraction(&self, t: T) -> Option<T> {
        if self.is_degenerate() {
            None
        } else {
            Some((t - self.start) / self.span())
        }
    }

    /// `true` if `t` lies between the endpoints (inclusive, either direction).
    pub fn contains(&self, t: T) -> bool {
        let lo = self.start.min(self.end);
        let hi = self.start.max(self.end);
        t >= lo && t <= hi
    }
}

impl<T: Real> From<(T, T)> for TimeWindow<T> {
    fn from((start, end): (T, T)) -> Self {
        Self::new(start, end)
    }
}

impl<T: Real> From<[T; 2]> for TimeWindow<T> {
    fn from([start, end]: [T; 2]) -> Self {
        Self::new(start, end)
    }
}
