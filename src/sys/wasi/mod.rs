//! # Notes
//!
//! WASI has no descriptor sets, `poll_oneoff` is the only way to wait for
//! readiness. Subscriptions map one to one onto `wasi::Subscription`s.

use std::io;

use crate::event::{ClockId, Direction, Event, EventKind, Events, Subscription, Userdata};
use crate::time::Timestamp;
use crate::Poller;

/// Userdata of the clock that stands in for an empty subscription list, it
/// never expires in practice.
const SUSPEND_USERDATA: Userdata = Userdata::MAX;

/// The platform [`Poller`], backed by `poll_oneoff`.
#[derive(Debug)]
pub struct Selector {
    _priv: (),
}

impl Selector {
    pub fn new() -> io::Result<Selector> {
        Ok(Selector { _priv: () })
    }
}

impl Poller for Selector {
    fn poll(&self, subscriptions: &[Subscription], events: &mut Events) -> io::Result<()> {
        let raw_subscriptions = to_wasi_subscriptions(subscriptions);
        let mut raw_events: Vec<wasi::Event> = Vec::with_capacity(raw_subscriptions.len());
        let res = unsafe {
            wasi::poll_oneoff(
                raw_subscriptions.as_ptr(),
                raw_events.as_mut_ptr(),
                raw_subscriptions.len(),
            )
        };

        match res {
            Ok(n_events) => {
                // This is safe because `poll_oneoff` ensures that `n_events`
                // are assigned, never more than the number of subscriptions.
                unsafe { raw_events.set_len(n_events) };
                push_events(&raw_events, subscriptions.is_empty(), events);
                Ok(())
            }
            Err(err) => Err(io_err(err)),
        }
    }
}

fn to_wasi_subscriptions(subscriptions: &[Subscription]) -> Vec<wasi::Subscription> {
    let mut raw_subscriptions: Vec<wasi::Subscription> =
        subscriptions.iter().map(to_wasi_subscription).collect();

    // `poll_oneoff` rejects an empty list with `EINVAL`, while waiting
    // for nothing should suspend the caller.
    if raw_subscriptions.is_empty() {
        raw_subscriptions.push(clock_subscription(
            SUSPEND_USERDATA,
            ClockId::Monotonic,
            Timestamp::MAX,
            0,
            true,
        ));
    }
    raw_subscriptions
}

/// Convert `raw_events` into `events`, `suspended` is true if the suspend
/// clock stood in for an empty subscription list.
fn push_events(raw_events: &[wasi::Event], suspended: bool, events: &mut Events) {
    for raw in raw_events {
        if suspended && raw.userdata == SUSPEND_USERDATA {
            continue;
        }
        match from_wasi_event(raw) {
            Some(event) => {
                if !events.push(event) {
                    break;
                }
            }
            None => {
                warn!("ignoring event of unknown type: {}", raw.type_.raw());
            }
        }
    }
}

fn to_wasi_subscription(subscription: &Subscription) -> wasi::Subscription {
    match *subscription {
        Subscription::Fd {
            userdata,
            fd,
            direction,
        } => {
            let fd_readwrite = wasi::SubscriptionFdReadwrite {
                file_descriptor: fd as wasi::Fd,
            };
            let (tag, u) = match direction {
                Direction::Read => (
                    wasi::EVENTTYPE_FD_READ,
                    wasi::SubscriptionUU {
                        fd_read: fd_readwrite,
                    },
                ),
                Direction::Write => (
                    wasi::EVENTTYPE_FD_WRITE,
                    wasi::SubscriptionUU {
                        fd_write: fd_readwrite,
                    },
                ),
            };
            wasi::Subscription {
                userdata,
                u: wasi::SubscriptionU {
                    tag: tag.raw(),
                    u,
                },
            }
        }
        Subscription::Clock {
            userdata,
            clock,
            timeout,
            precision,
            absolute,
        } => clock_subscription(userdata, clock, timeout, precision, absolute),
    }
}

fn clock_subscription(
    userdata: Userdata,
    clock: ClockId,
    timeout: Timestamp,
    precision: Timestamp,
    absolute: bool,
) -> wasi::Subscription {
    wasi::Subscription {
        userdata,
        u: wasi::SubscriptionU {
            tag: wasi::EVENTTYPE_CLOCK.raw(),
            u: wasi::SubscriptionUU {
                clock: wasi::SubscriptionClock {
                    id: match clock {
                        ClockId::Realtime => wasi::CLOCKID_REALTIME,
                        ClockId::Monotonic => wasi::CLOCKID_MONOTONIC,
                    },
                    // Timestamp is in nanoseconds.
                    timeout,
                    precision,
                    // Zero means the `timeout` is considered relative to the
                    // current time.
                    flags: if absolute {
                        wasi::SUBCLOCKFLAGS_SUBSCRIPTION_CLOCK_ABSTIME
                    } else {
                        0
                    },
                },
            },
        },
    }
}

fn event_kind(type_: u8) -> Option<EventKind> {
    if type_ == wasi::EVENTTYPE_CLOCK.raw() {
        Some(EventKind::Clock)
    } else if type_ == wasi::EVENTTYPE_FD_READ.raw() {
        Some(EventKind::FdRead)
    } else if type_ == wasi::EVENTTYPE_FD_WRITE.raw() {
        Some(EventKind::FdWrite)
    } else {
        None
    }
}

fn from_wasi_event(raw: &wasi::Event) -> Option<Event> {
    let event = match event_kind(raw.type_.raw())? {
        EventKind::Clock => return Some(Event::clock(raw.userdata)),
        kind => Event::new(raw.userdata, kind),
    };

    let event = event
        .with_nbytes(raw.fd_readwrite.nbytes)
        .with_hangup(raw.fd_readwrite.flags & wasi::EVENTRWFLAGS_FD_READWRITE_HANGUP != 0);
    if raw.error == wasi::ERRNO_SUCCESS {
        Some(event)
    } else {
        Some(event.with_error(i32::from(raw.error.raw())))
    }
}

/// Convert a WASI error into an `io::Error`.
fn io_err(errno: wasi::Errno) -> io::Error {
    io::Error::from_raw_os_error(i32::from(errno.raw()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_event(userdata: Userdata, type_: wasi::Eventtype) -> wasi::Event {
        wasi::Event {
            userdata,
            error: wasi::ERRNO_SUCCESS,
            type_,
            fd_readwrite: wasi::EventFdReadwrite {
                nbytes: 0,
                flags: 0,
            },
        }
    }

    #[test]
    fn empty_list_suspends() {
        let raw = to_wasi_subscriptions(&[]);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].userdata, SUSPEND_USERDATA);
        assert_eq!(raw[0].u.tag, wasi::EVENTTYPE_CLOCK.raw());
        let clock = unsafe { raw[0].u.u.clock };
        assert_eq!(clock.id, wasi::CLOCKID_MONOTONIC);
        assert_eq!(clock.timeout, Timestamp::MAX);
        assert_eq!(clock.flags, wasi::SUBCLOCKFLAGS_SUBSCRIPTION_CLOCK_ABSTIME);
    }

    #[test]
    fn suspend_event_is_skipped() {
        let raw = [raw_event(SUSPEND_USERDATA, wasi::EVENTTYPE_CLOCK)];
        let mut events = Events::with_capacity(1);
        push_events(&raw, true, &mut events);
        assert!(events.is_empty());

        // Only when standing in for an empty list.
        push_events(&raw, false, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn descriptor_subscriptions() {
        let raw = to_wasi_subscriptions(&[Subscription::fd_read(3), Subscription::fd_write(4)]);
        assert_eq!(raw.len(), 2);

        assert_eq!(raw[0].userdata, 3);
        assert_eq!(raw[0].u.tag, wasi::EVENTTYPE_FD_READ.raw());
        assert_eq!(unsafe { raw[0].u.u.fd_read }.file_descriptor, 3);

        assert_eq!(raw[1].userdata, 4);
        assert_eq!(raw[1].u.tag, wasi::EVENTTYPE_FD_WRITE.raw());
        assert_eq!(unsafe { raw[1].u.u.fd_write }.file_descriptor, 4);
    }

    #[test]
    fn relative_timeout_subscription() {
        let raw = to_wasi_subscriptions(&[Subscription::timeout(1_000)]);
        assert_eq!(raw[0].u.tag, wasi::EVENTTYPE_CLOCK.raw());
        let clock = unsafe { raw[0].u.u.clock };
        assert_eq!(clock.id, wasi::CLOCKID_REALTIME);
        assert_eq!(clock.timeout, 1_000);
        assert_eq!(clock.flags, 0);
    }

    #[test]
    fn unknown_event_type() {
        assert_eq!(event_kind(wasi::EVENTTYPE_FD_WRITE.raw()), Some(EventKind::FdWrite));
        assert_eq!(event_kind(u8::MAX), None);
    }

    #[test]
    fn event_error() {
        let mut raw = raw_event(5, wasi::EVENTTYPE_FD_READ);
        raw.error = wasi::ERRNO_BADF;
        let event = from_wasi_event(&raw).unwrap();
        assert!(event.is_readable());
        assert_eq!(event.raw_os_error(), Some(i32::from(wasi::ERRNO_BADF.raw())));
    }

    #[test]
    fn event_hangup_and_nbytes() {
        let mut raw = raw_event(6, wasi::EVENTTYPE_FD_WRITE);
        raw.fd_readwrite.nbytes = 10;
        raw.fd_readwrite.flags = wasi::EVENTRWFLAGS_FD_READWRITE_HANGUP;
        let event = from_wasi_event(&raw).unwrap();
        assert!(event.is_writable());
        assert!(event.is_hangup());
        assert_eq!(event.nbytes(), 10);
        assert_eq!(event.raw_os_error(), None);
    }

    #[test]
    fn clock_event() {
        let event = from_wasi_event(&raw_event(0, wasi::EVENTTYPE_CLOCK)).unwrap();
        assert!(event.is_clock());
        assert_eq!(event.userdata(), 0);
    }
}
