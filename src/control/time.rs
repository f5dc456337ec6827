//! Monotonic cycle timestamps.
//!
//! The engine never reads a clock itself; callers pass a [`Timestamp`]
//! obtained from a [`ClockPort`](crate::app::ports::ClockPort) so tests can
//! drive time explicitly.

use core::fmt;
use core::ops::Add;
use core::time::Duration;

/// Milliseconds since an arbitrary, fixed origin (boot on the device).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Self = Self(0);

    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1000))
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, or zero if `earlier` is in the future.
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        let ms = u64::try_from(rhs.as_millis()).unwrap_or(u64::MAX);
        Timestamp(self.0.saturating_add(ms))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}s", self.0 / 1000, self.0 % 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_since_never_underflows() {
        let early = Timestamp::from_secs(5);
        let late = Timestamp::from_secs(8);
        assert_eq!(late.saturating_duration_since(early), Duration::from_secs(3));
        assert_eq!(early.saturating_duration_since(late), Duration::ZERO);
    }

    #[test]
    fn add_duration_saturates() {
        let t = Timestamp::from_millis(u64::MAX - 1) + Duration::from_secs(10);
        assert_eq!(t.as_millis(), u64::MAX);
    }

    #[test]
    fn display_shows_seconds_and_millis() {
        assert_eq!(Timestamp::from_millis(12_045).to_string(), "12.045s");
    }
}
