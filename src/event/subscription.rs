use crate::time::Timestamp;
use crate::RawFd;

/// Opaque value attached to a [`Subscription`] and echoed back in the
/// [`Event`] it produces.
///
/// [`Event`]: crate::event::Event
pub type Userdata = u64;

/// Identifier of the clock a [`Subscription::Clock`] is measured against.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ClockId {
    /// Wall-clock time.
    Realtime,
    /// Clock that can't be set and only moves forward.
    Monotonic,
}

/// Readiness direction of a descriptor subscription.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Read,
    Write,
}

/// A request registered with a [`Poller`].
///
/// The poller produces an [`Event`] carrying the same [`Userdata`] once the
/// condition of the subscription is met.
///
/// [`Poller`]: crate::Poller
/// [`Event`]: crate::event::Event
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Subscription {
    /// Notify when `fd` is ready in `direction`.
    Fd {
        userdata: Userdata,
        fd: RawFd,
        direction: Direction,
    },
    /// Notify when `clock` reaches `timeout`.
    Clock {
        userdata: Userdata,
        clock: ClockId,
        /// Nanoseconds, relative to the current time unless `absolute`.
        timeout: Timestamp,
        /// Amount of time the poller may delay the notification by.
        precision: Timestamp,
        absolute: bool,
    },
}

impl Subscription {
    /// Subscription for `fd` becoming readable, tagged with the descriptor
    /// itself.
    ///
    /// # Panics
    ///
    /// With debug assertions enabled, panics if `fd` is negative.
    pub fn fd_read(fd: RawFd) -> Subscription {
        Subscription::Fd {
            userdata: fd_userdata(fd),
            fd,
            direction: Direction::Read,
        }
    }

    /// Subscription for `fd` becoming writable, tagged with the descriptor
    /// itself.
    ///
    /// # Panics
    ///
    /// With debug assertions enabled, panics if `fd` is negative.
    pub fn fd_write(fd: RawFd) -> Subscription {
        Subscription::Fd {
            userdata: fd_userdata(fd),
            fd,
            direction: Direction::Write,
        }
    }

    /// Relative realtime clock subscription firing after `timeout`
    /// nanoseconds.
    pub fn timeout(timeout: Timestamp) -> Subscription {
        Subscription::Clock {
            userdata: 0,
            clock: ClockId::Realtime,
            timeout,
            precision: 0,
            absolute: false,
        }
    }

    pub fn userdata(&self) -> Userdata {
        match *self {
            Subscription::Fd { userdata, .. } | Subscription::Clock { userdata, .. } => userdata,
        }
    }

    /// Returns the descriptor if this is a descriptor subscription.
    pub fn fd(&self) -> Option<RawFd> {
        match *self {
            Subscription::Fd { fd, .. } => Some(fd),
            Subscription::Clock { .. } => None,
        }
    }

    pub fn is_clock(&self) -> bool {
        matches!(self, Subscription::Clock { .. })
    }
}

/// Descriptors are non-negative, so they always fit a 64 bit tag.
fn fd_userdata(fd: RawFd) -> Userdata {
    debug_assert!(fd >= 0, "negative file descriptor: {}", fd);
    fd as u32 as Userdata
}
