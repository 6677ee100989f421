//! Time representation for the presentation timeline.
//!
//! Block start times and durations are rational seconds rather than floats,
//! so positions stay exact no matter how long a session runs. A float clock
//! accumulates error frame by frame; a rational one does not.

use num_rational::Rational64;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A position or span on the presentation timeline, in rational seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Time value as a rational number (seconds)
    value: Rational64,
}

impl Timestamp {
    /// Zero time constant.
    pub const ZERO: Self = Self {
        value: Rational64::new_raw(0, 1),
    };

    /// Create a timestamp of `numerator / denominator` seconds.
    /// The denominator must be nonzero.
    #[inline]
    pub fn new(numerator: i64, denominator: i64) -> Self {
        Self {
            value: Rational64::new(numerator, denominator),
        }
    }

    /// Create a timestamp from whole milliseconds.
    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        Self {
            value: Rational64::new(millis, 1000),
        }
    }

    /// Create a timestamp from seconds as a float.
    /// Note: May introduce small precision errors.
    pub fn from_seconds_f64(seconds: f64) -> Self {
        const PRECISION: i64 = 1_000_000;
        Self {
            value: Rational64::new((seconds * PRECISION as f64).round() as i64, PRECISION),
        }
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn to_seconds_f64(self) -> f64 {
        *self.value.numer() as f64 / *self.value.denom() as f64
    }

    /// Whole milliseconds, truncated toward zero.
    #[inline]
    pub fn as_millis(self) -> i64 {
        (self.value * 1000).to_integer()
    }

    /// Check if this timestamp is zero.
    #[inline]
    pub fn is_zero(self) -> bool {
        *self.value.numer() == 0
    }

    /// Check if this timestamp lies before the timeline origin.
    #[inline]
    pub fn is_negative(self) -> bool {
        *self.value.numer() < 0
    }

    /// Whole number of times `divisor` fits into `self`, truncated.
    /// Returns `None` when `divisor` is zero.
    ///
    /// This is how a display picture number is recovered from a start time
    /// when the decoder does not supply one.
    pub fn checked_div(self, divisor: Timestamp) -> Option<i64> {
        if *divisor.value.numer() == 0 {
            return None;
        }
        Some((self.value / divisor.value).to_integer())
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Add for Timestamp {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            value: self.value + rhs.value,
        }
    }
}

impl Sub for Timestamp {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self {
            value: self.value - rhs.value,
        }
    }
}

impl Mul<i64> for Timestamp {
    type Output = Self;
    fn mul(self, rhs: i64) -> Self {
        Self {
            value: self.value * rhs,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.to_seconds_f64())
    }
}

/// A presentation interval with inclusive start and exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start time (inclusive)
    pub start: Timestamp,
    /// Duration of the range
    pub duration: Timestamp,
}

impl TimeRange {
    /// Create a new time range from start and duration.
    #[inline]
    pub fn new(start: Timestamp, duration: Timestamp) -> Self {
        Self { start, duration }
    }

    /// End time (exclusive).
    #[inline]
    pub fn end(self) -> Timestamp {
        self.start + self.duration
    }

    /// Check if a time falls within `[start, end)`.
    #[inline]
    pub fn contains(self, time: Timestamp) -> bool {
        time >= self.start && time < self.end()
    }

    /// Check if two ranges overlap.
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            start: Timestamp::ZERO,
            duration: Timestamp::ZERO,
        }
    }
}
