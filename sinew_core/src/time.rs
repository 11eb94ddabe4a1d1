// Copyright 2026 the Sinew Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Monotonic host time for the auto-update path.
//!
//! [`SkeletonView::tick`](crate::view::SkeletonView::tick) takes the host's
//! monotonic clock reading as a [`HostTime`] in platform ticks, plus the
//! [`Timebase`] that converts those ticks to nanoseconds. The elapsed
//! [`Duration`] between ticks becomes the frame's delta time in seconds.
//! Conversions use `u128` intermediates to avoid overflow.

use core::fmt;

/// A point in time expressed as platform-native monotonic ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HostTime(pub u64);

impl HostTime {
    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Returns the time elapsed since `earlier`, or zero if `earlier` is
    /// later than `self`.
    #[inline]
    #[must_use]
    pub const fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }
}

impl fmt::Debug for HostTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostTime({})", self.0)
    }
}

/// Rational conversion factor from ticks to nanoseconds:
/// `nanoseconds = ticks * numer / denom`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timebase {
    /// Numerator of the ticks-to-nanoseconds ratio.
    pub numer: u32,
    /// Denominator of the ticks-to-nanoseconds ratio.
    pub denom: u32,
}

impl Timebase {
    /// Ticks are nanoseconds.
    pub const NANOS: Self = Self { numer: 1, denom: 1 };

    /// Ticks are milliseconds, as with `Date.now()`-style clocks.
    pub const MILLIS: Self = Self {
        numer: 1_000_000,
        denom: 1,
    };

    /// Creates a timebase.
    ///
    /// # Panics
    ///
    /// Panics if `denom` is zero.
    #[inline]
    #[must_use]
    pub const fn new(numer: u32, denom: u32) -> Self {
        assert!(denom != 0, "timebase denominator must not be zero");
        Self { numer, denom }
    }

    /// Converts a tick count to nanoseconds.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn ticks_to_nanos(self, ticks: u64) -> u64 {
        let wide = ticks as u128 * self.numer as u128 / self.denom as u128;
        wide as u64
    }

    /// Converts nanoseconds to a tick count.
    ///
    /// # Panics
    ///
    /// Panics if `numer` is zero.
    #[inline]
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "u128 intermediate avoids overflow; truncation back to u64 is intentional"
    )]
    pub const fn nanos_to_ticks(self, nanos: u64) -> u64 {
        let wide = nanos as u128 * self.denom as u128 / self.numer as u128;
        wide as u64
    }
}

impl fmt::Debug for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timebase({}/{})", self.numer, self.denom)
    }
}

/// A duration in platform-native ticks.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    /// A zero-length duration.
    pub const ZERO: Self = Self(0);

    /// Returns the raw tick value.
    #[inline]
    #[must_use]
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Converts this duration to nanoseconds.
    #[inline]
    #[must_use]
    pub const fn to_nanos(self, timebase: Timebase) -> u64 {
        timebase.ticks_to_nanos(self.0)
    }

    /// Converts this duration to seconds, the unit of frame delta time.
    #[inline]
    #[must_use]
    pub fn as_secs_f64(self, timebase: Timebase) -> f64 {
        self.to_nanos(timebase) as f64 * 1e-9
    }

    /// Creates a duration from seconds, saturating at the representable
    /// range. Negative or NaN input yields zero.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "float-to-int casts saturate; precision below one nanosecond is dropped"
    )]
    pub fn from_secs_f64(secs: f64, timebase: Timebase) -> Self {
        let nanos = (secs * 1e9) as u64;
        Self(timebase.nanos_to_ticks(nanos))
    }
}

impl fmt::Debug for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duration({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_from_macos_style_ticks() {
        // 24 MHz tick rate.
        let tb = Timebase::new(125, 3);
        let secs = Duration(24_000_000).as_secs_f64(tb);
        assert!((secs - 1.0).abs() < 1e-12, "24M ticks is one second");
    }

    #[test]
    fn millisecond_timebase() {
        let d = HostTime(1_250).saturating_duration_since(HostTime(1_000));
        assert!((d.as_secs_f64(Timebase::MILLIS) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn duration_since_later_time_is_zero() {
        assert_eq!(
            HostTime(10).saturating_duration_since(HostTime(20)),
            Duration::ZERO
        );
    }

    #[test]
    fn from_secs_round_trips_through_nanos() {
        let d = Duration::from_secs_f64(0.5, Timebase::NANOS);
        assert_eq!(d.ticks(), 500_000_000);
        assert_eq!(Duration::from_secs_f64(-1.0, Timebase::NANOS), Duration::ZERO);
    }

    #[test]
    fn overflow_safe_conversion() {
        let tb = Timebase::new(125, 3);
        let _nanos = tb.ticks_to_nanos(u64::MAX / 2);
    }
}
