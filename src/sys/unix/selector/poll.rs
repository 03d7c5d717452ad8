//! Emulation of the subscription based polling primitive on `poll(2)`.
//!
//! Every descriptor subscription becomes its own `pollfd`, so a descriptor
//! subscribed for both reading and writing appears twice in the array. The
//! earliest clock subscription becomes the `poll(2)` timeout.

use std::io;
use std::mem;

use libc::{c_int, c_short, nfds_t};
use libc::{POLLERR, POLLHUP, POLLIN, POLLNVAL, POLLOUT};

use crate::event::{ClockId, Direction, Event, Events, Subscription, Userdata};
use crate::time::Timestamp;
use crate::Poller;

const NSEC_PER_SEC: u64 = 1_000_000_000;
const NSEC_PER_MSEC: u64 = 1_000_000;

/// The platform [`Poller`], backed by `poll(2)`.
#[derive(Debug)]
pub struct Selector {
    _priv: (),
}

impl Selector {
    pub fn new() -> io::Result<Selector> {
        Ok(Selector { _priv: () })
    }
}

/// Metadata for the `pollfd` at the same index.
#[derive(Debug, Copy, Clone)]
struct FdMetadata {
    userdata: Userdata,
    direction: Direction,
}

impl Poller for Selector {
    fn poll(&self, subscriptions: &[Subscription], events: &mut Events) -> io::Result<()> {
        let mut fdarr = Vec::with_capacity(subscriptions.len());
        let mut fdmeta = Vec::with_capacity(subscriptions.len());
        // Userdata and remaining nanoseconds of the earliest clock.
        let mut clock: Option<(Userdata, Timestamp)> = None;

        for subscription in subscriptions {
            match *subscription {
                Subscription::Fd {
                    userdata,
                    fd,
                    direction,
                } => {
                    fdarr.push(libc::pollfd {
                        fd,
                        events: direction_to_poll(direction),
                        revents: 0,
                    });
                    fdmeta.push(FdMetadata {
                        userdata,
                        direction,
                    });
                }
                Subscription::Clock {
                    userdata,
                    clock: id,
                    timeout,
                    absolute,
                    ..
                } => {
                    let remaining = if absolute {
                        timeout.saturating_sub(now(id)?)
                    } else {
                        timeout
                    };
                    match clock {
                        Some((_, earliest)) if earliest <= remaining => {}
                        _ => clock = Some((userdata, remaining)),
                    }
                }
            }
        }

        let started = match clock {
            Some(_) => now(ClockId::Monotonic)?,
            None => 0,
        };
        let mut timeout = clock
            .map(|(_, remaining)| timeout_millis(remaining))
            .unwrap_or(-1);

        loop {
            let n_events = syscall!(poll(fdarr.as_mut_ptr(), fdarr.len() as nfds_t, timeout))?;
            if n_events != 0 {
                break;
            }

            // Timed out, which is only possible with a clock subscription.
            let (userdata, total) = match clock {
                Some(clock) => clock,
                None => continue,
            };
            let elapsed = now(ClockId::Monotonic)?.saturating_sub(started);
            match next_timeout(total, elapsed, timeout) {
                Some(next) => timeout = next,
                None => {
                    events.push(Event::clock(userdata));
                    return Ok(());
                }
            }
        }

        for (pollfd, meta) in fdarr.iter().zip(fdmeta.iter()) {
            if let Some(event) = poll_to_event(pollfd.revents, *meta) {
                if !events.push(event) {
                    break;
                }
            }
        }
        Ok(())
    }
}

fn direction_to_poll(direction: Direction) -> c_short {
    match direction {
        Direction::Read => POLLIN,
        Direction::Write => POLLOUT,
    }
}

fn poll_to_event(revents: c_short, meta: FdMetadata) -> Option<Event> {
    if revents == 0 {
        return None;
    }

    let event = match meta.direction {
        Direction::Read => Event::fd_read(meta.userdata),
        Direction::Write => Event::fd_write(meta.userdata),
    };

    if revents & POLLNVAL != 0 {
        return Some(event.with_error(libc::EBADF));
    }

    // Errors and hang ups are reported as ready, the following read or
    // write will return them.
    let ready = match meta.direction {
        Direction::Read => revents & (POLLIN | POLLHUP | POLLERR) != 0,
        Direction::Write => revents & (POLLOUT | POLLERR) != 0,
    };
    if ready {
        Some(event.with_hangup(revents & POLLHUP != 0))
    } else {
        None
    }
}

/// Nanoseconds to a `poll(2)` timeout.
///
/// Rounds up, so that sub-millisecond timeouts don't turn into a zero
/// timeout unless the caller explicitly requests that by specifying zero.
fn timeout_millis(nanos: Timestamp) -> c_int {
    let millis = nanos / NSEC_PER_MSEC + u64::from(nanos % NSEC_PER_MSEC != 0);
    c_int::try_from(millis).unwrap_or(c_int::MAX)
}

/// Timeout for another wait on a `total` nanosecond clock after `elapsed`
/// nanoseconds spent in a wait of `waited` milliseconds.
///
/// `poll(2)` can't wait longer than `c_int::MAX` milliseconds, so longer
/// clocks take multiple waits. Returns `None` once the clock expired.
fn next_timeout(total: Timestamp, elapsed: Timestamp, waited: c_int) -> Option<c_int> {
    if waited != c_int::MAX {
        return None;
    }
    match total.saturating_sub(elapsed) {
        0 => None,
        remaining => Some(timeout_millis(remaining)),
    }
}

/// Current time of `clock` in nanoseconds.
fn now(clock: ClockId) -> io::Result<Timestamp> {
    let id = match clock {
        ClockId::Realtime => libc::CLOCK_REALTIME,
        ClockId::Monotonic => libc::CLOCK_MONOTONIC,
    };
    // SAFETY: all zeros is a valid `timespec`.
    let mut ts: libc::timespec = unsafe { mem::zeroed() };
    syscall!(clock_gettime(id, &mut ts))?;
    let secs = u64::try_from(ts.tv_sec).unwrap_or(0);
    let nanos = u64::try_from(ts.tv_nsec).unwrap_or(0);
    Ok(secs.saturating_mul(NSEC_PER_SEC).saturating_add(nanos))
}
