//! Time values accepted by [`select`] and [`pselect`], and their conversion
//! into the deadline representation of the polling primitive.
//!
//! [`select`]: crate::select()
//! [`pselect`]: crate::pselect()

use std::time::Duration;

/// Nanoseconds, the time representation used by clock subscriptions.
pub type Timestamp = u64;

const NSEC_PER_SEC: i64 = 1_000_000_000;
const USEC_PER_SEC: i64 = 1_000_000;
const NSEC_PER_USEC: i64 = 1_000;

/// A time interval in seconds and nanoseconds, `struct timespec`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Timespec {
    pub tv_sec: i64,
    pub tv_nsec: i64,
}

/// A time interval in seconds and microseconds, `struct timeval`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Timeval {
    pub tv_sec: i64,
    pub tv_usec: i64,
}

impl Timespec {
    pub const fn new(tv_sec: i64, tv_nsec: i64) -> Timespec {
        Timespec { tv_sec, tv_nsec }
    }

    /// Convert into a [`Timestamp`], clamping it into the representable
    /// range.
    ///
    /// Returns `None` if the nanoseconds field is outside `0..1_000_000_000`,
    /// this value can't be represented at all. Negative seconds, which
    /// would be before the epoch, clamp to zero and values too large for a
    /// `Timestamp` saturate at `Timestamp::MAX`.
    pub fn to_timestamp_clamp(&self) -> Option<Timestamp> {
        if self.tv_nsec < 0 || self.tv_nsec >= NSEC_PER_SEC {
            return None;
        }
        if self.tv_sec < 0 {
            return Some(0);
        }
        // Both fields are non-negative here.
        let timestamp = (self.tv_sec as u64)
            .checked_mul(NSEC_PER_SEC as u64)
            .and_then(|ns| ns.checked_add(self.tv_nsec as u64))
            .unwrap_or(Timestamp::MAX);
        Some(timestamp)
    }
}

impl From<Duration> for Timespec {
    fn from(duration: Duration) -> Timespec {
        Timespec {
            tv_sec: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
            tv_nsec: i64::from(duration.subsec_nanos()),
        }
    }
}

impl Timeval {
    pub const fn new(tv_sec: i64, tv_usec: i64) -> Timeval {
        Timeval { tv_sec, tv_usec }
    }

    /// Convert into a [`Timespec`], `None` if the microseconds field is
    /// outside `0..1_000_000`.
    pub fn to_timespec(&self) -> Option<Timespec> {
        if self.tv_usec < 0 || self.tv_usec >= USEC_PER_SEC {
            return None;
        }
        Some(Timespec {
            tv_sec: self.tv_sec,
            tv_nsec: self.tv_usec * NSEC_PER_USEC,
        })
    }
}

impl From<Duration> for Timeval {
    fn from(duration: Duration) -> Timeval {
        Timeval {
            tv_sec: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
            tv_usec: i64::from(duration.subsec_micros()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_from_timespec() {
        assert_eq!(Timespec::new(0, 0).to_timestamp_clamp(), Some(0));
        assert_eq!(
            Timespec::new(2, 500).to_timestamp_clamp(),
            Some(2_000_000_500)
        );
        assert_eq!(
            Timespec::new(0, 999_999_999).to_timestamp_clamp(),
            Some(999_999_999)
        );
    }

    #[test]
    fn timestamp_invalid_nanoseconds() {
        assert_eq!(Timespec::new(0, -1).to_timestamp_clamp(), None);
        assert_eq!(Timespec::new(0, 1_000_000_000).to_timestamp_clamp(), None);
        assert_eq!(Timespec::new(-5, i64::MAX).to_timestamp_clamp(), None);
    }

    #[test]
    fn timestamp_clamps_before_epoch() {
        assert_eq!(Timespec::new(-1, 0).to_timestamp_clamp(), Some(0));
        assert_eq!(Timespec::new(i64::MIN, 10).to_timestamp_clamp(), Some(0));
    }

    #[test]
    fn timestamp_saturates() {
        assert_eq!(
            Timespec::new(i64::MAX, 0).to_timestamp_clamp(),
            Some(Timestamp::MAX)
        );
        // 18446744073 seconds fits, adding the nanoseconds overflows.
        assert_eq!(
            Timespec::new(18_446_744_073, 999_999_999).to_timestamp_clamp(),
            Some(Timestamp::MAX)
        );
    }

    #[test]
    fn timeval_to_timespec() {
        assert_eq!(
            Timeval::new(1, 250_000).to_timespec(),
            Some(Timespec::new(1, 250_000_000))
        );
        assert_eq!(Timeval::new(1, -1).to_timespec(), None);
        assert_eq!(Timeval::new(1, 1_000_000).to_timespec(), None);
    }

    #[test]
    fn from_duration() {
        let duration = Duration::new(3, 1_500);
        assert_eq!(Timespec::from(duration), Timespec::new(3, 1_500));
        assert_eq!(Timeval::from(duration), Timeval::new(3, 1));
        assert_eq!(
            Timespec::from(Duration::MAX).to_timestamp_clamp(),
            Some(Timestamp::MAX)
        );
    }
}
