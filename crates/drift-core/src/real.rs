//! The [`Real`] scalar abstraction.
//!
//! Particle states, velocities and times are generic over `Real` so a
//! simulation can run in `f32` (large ensembles) or `f64` (tight tolerances).

use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Floating-point scalar used for positions, velocities and time.
///
/// Implemented for `f32` and `f64`. The method set is the minimum the
/// interpolation and solver code needs.
pub trait Real:
    Copy
    + Debug
    + Display
    + Default
    + PartialEq
    + PartialOrd
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + SubAssign
    + MulAssign
{
    /// Additive identity.
    const ZERO: Self;
    /// Multiplicative identity.
    const ONE: Self;

    /// Lossy conversion from `f64`.
    fn from_f64(v: f64) -> Self;
    /// Widening conversion to `f64`.
    fn to_f64(self) -> f64;
    /// Conversion from a grid extent or count.
    fn from_usize(n: usize) -> Self;

    /// Largest integer value not greater than `self`.
    fn floor(self) -> Self;
    /// Nearest integer, ties away from zero.
    fn round(self) -> Self;
    /// Absolute value.
    fn abs(self) -> Self;
    /// Square root.
    fn sqrt(self) -> Self;
    /// `self` raised to a real power.
    fn powf(self, e: Self) -> Self;
    /// Euclidean remainder, always in `[0, m)` for positive `m`.
    fn rem_euclid(self, m: Self) -> Self;
    /// Sign of `self` (`1`, `-1`, or NaN).
    fn signum(self) -> Self;
    /// Maximum, ignoring NaN.
    fn max(self, other: Self) -> Self;
    /// Minimum, ignoring NaN.
    fn min(self, other: Self) -> Self;
    /// `true` unless NaN or infinite.
    fn is_finite(self) -> bool;
    /// Machine epsilon.
    fn epsilon() -> Self;
}

macro_rules! impl_real {
    ($t:ty) => {
        impl Real for $t {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }
            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }
            #[inline]
            fn from_usize(n: usize) -> Self {
                n as $t
            }
            #[inline]
            fn floor(self) -> Self {
                <$t>::floor(self)
            }
            #[inline]
            fn round(self) -> Self {
                <$t>::round(self)
            }
            #[inline]
            fn abs(self) -> Self {
                <$t>::abs(self)
            }
            #[inline]
            fn sqrt(self) -> Self {
                <$t>::sqrt(self)
            }
            #[inline]
            fn powf(self, e: Self) -> Self {
                <$t>::powf(self, e)
            }
            #[inline]
            fn rem_euclid(self, m: Self) -> Self {
                let r = <$t>::rem_euclid(self, m);
                // rem_euclid can round up to exactly `m` for tiny negative inputs.
                if r >= m {
                    0.0
                } else {
                    r
                }
            }
            #[inline]
            fn signum(self) -> Self {
                <$t>::signum(self)
            }
            #[inline]
            fn max(self, other: Self) -> Self {
                <$t>::max(self, other)
            }
            #[inline]
            fn min(self, other: Self) -> Self {
                <$t>::min(self, other)
            }
            #[inline]
            fn is_finite(self) -> bool {
                <$t>::is_finite(self)
            }
            #[inline]
            fn epsilon() -> Self {
                <$t>::EPSILON
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);
