use std::io;

use crate::event::{EventKind, Events, Subscription};
use crate::sys::{self, EBADF, EINVAL, ENOSYS};
use crate::time::{Timespec, Timeval};
use crate::{FdSet, Poller, RawFd};

/// Readiness multiplexing in the shape of POSIX `select(2)` and
/// `pselect(2)`, on top of a [`Poller`].
///
/// `Select` holds no state besides its poller: every call builds a fresh
/// list of subscriptions from the descriptor sets, polls exactly once and
/// writes the ready descriptors back into the same sets. All storage used by
/// a call is released before it returns, on success and on every error.
///
/// # Examples
///
/// Waiting for a pipe to become readable, using the platform poller.
///
#[cfg_attr(all(unix, feature = "os-poll"), doc = "```")]
#[cfg_attr(not(all(unix, feature = "os-poll")), doc = "```ignore")]
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use fdselect::{FdSet, Select, Timespec};
///
/// let mut fds = [0; 2];
/// assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);
/// let [receiver, sender] = fds;
///
/// let select = Select::new()?;
/// let mut readfds = FdSet::new();
/// readfds.insert(receiver);
///
/// // Nothing written yet, so the call times out.
/// let timeout = Timespec::new(0, 10_000_000);
/// let n = select.pselect(receiver + 1, Some(&mut readfds), None, None, Some(&timeout))?;
/// assert_eq!(n, 0);
/// assert!(readfds.is_empty());
///
/// assert_eq!(unsafe { libc::write(sender, b"x".as_ptr().cast(), 1) }, 1);
///
/// readfds.insert(receiver);
/// let n = select.pselect(receiver + 1, Some(&mut readfds), None, None, None)?;
/// assert_eq!(n, 1);
/// assert!(readfds.contains(receiver));
/// #     unsafe { libc::close(receiver); libc::close(sender); }
/// #     Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Select<P = sys::Selector> {
    poller: P,
}

cfg_os_poll! {
    impl Select {
        /// Create a `Select` backed by the platform poller.
        pub fn new() -> io::Result<Select> {
            sys::Selector::new().map(Select::with_poller)
        }
    }
}

impl<P: Poller> Select<P> {
    /// Create a `Select` backed by `poller`.
    pub fn with_poller(poller: P) -> Select<P> {
        Select { poller }
    }

    pub fn poller(&self) -> &P {
        &self.poller
    }

    pub fn into_poller(self) -> P {
        self.poller
    }

    /// Wait until a descriptor in `readfds` is readable, one in `writefds`
    /// is writable, or `timeout` expires.
    ///
    /// Only descriptors below `nfds` are considered, others are ignored.
    /// `None` sets are treated as empty. With a `None` timeout the call
    /// blocks until a descriptor is ready, forever if there are none.
    ///
    /// On success both sets are overwritten with the descriptors found
    /// ready and the total number of ready descriptors is returned. A
    /// descriptor in both sets counts twice.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    ///
    /// * `EINVAL`: `nfds` is negative.
    /// * `ENOSYS`: `errorfds` is non-empty. Exceptional conditions can't be
    ///   polled for.
    /// * `EINVAL`: the nanoseconds of `timeout` are outside
    ///   `0..1_000_000_000`.
    /// * Any error returned by the poller itself.
    /// * `EBADF`: one of the descriptors is invalid. No partial results are
    ///   written in this case.
    ///
    /// On error the contents of `readfds` and `writefds` are unspecified.
    pub fn pselect(
        &self,
        nfds: RawFd,
        readfds: Option<&mut FdSet>,
        writefds: Option<&mut FdSet>,
        errorfds: Option<&FdSet>,
        timeout: Option<&Timespec>,
    ) -> io::Result<usize> {
        // Negative file descriptor upper bound.
        if nfds < 0 {
            return Err(io::Error::from_raw_os_error(EINVAL));
        }

        if errorfds.map_or(false, |set| !set.is_empty()) {
            return Err(io::Error::from_raw_os_error(ENOSYS));
        }

        // Zero capacity sets don't allocate.
        let mut no_readfds = FdSet::with_capacity(0);
        let mut no_writefds = FdSet::with_capacity(0);
        let readfds = readfds.unwrap_or(&mut no_readfds);
        let writefds = writefds.unwrap_or(&mut no_writefds);

        let subscriptions = subscriptions(nfds, readfds, writefds, timeout)?;
        trace!(
            "pselect: nfds={}, readfds={}, writefds={}, timeout={:?}, subscriptions={}",
            nfds,
            readfds.len(),
            writefds.len(),
            timeout,
            subscriptions.len()
        );
        if subscriptions.is_empty() {
            warn!("pselect called without descriptors or timeout; blocking indefinitely");
        }

        let mut events = Events::with_capacity(subscriptions.len());
        self.poller.poll(&subscriptions, &mut events)?;
        trace!("pselect: poller returned {} events", events.len());

        // A single invalid descriptor fails the entire call, so look at all
        // events before touching the sets.
        let bad_descriptor = events.iter().any(|event| {
            !event.is_clock() && event.raw_os_error() == Some(EBADF)
        });
        if bad_descriptor {
            return Err(io::Error::from_raw_os_error(EBADF));
        }

        let dropped = readfds.replace_with(ready_fds(&events, EventKind::FdRead))
            + writefds.replace_with(ready_fds(&events, EventKind::FdWrite));
        if dropped != 0 {
            warn!("descriptor set full, dropped {} ready descriptors", dropped);
        }

        Ok(readfds.len() + writefds.len())
    }

    /// [`pselect`] with a microsecond timeout.
    ///
    /// # Errors
    ///
    /// `EINVAL` if the microseconds of `timeout` are outside `0..1_000_000`,
    /// checked before anything else. Otherwise see [`pselect`].
    ///
    /// [`pselect`]: Select::pselect
    pub fn select(
        &self,
        nfds: RawFd,
        readfds: Option<&mut FdSet>,
        writefds: Option<&mut FdSet>,
        errorfds: Option<&FdSet>,
        timeout: Option<&Timeval>,
    ) -> io::Result<usize> {
        match timeout {
            Some(timeout) => {
                let timeout = timeout
                    .to_timespec()
                    .ok_or_else(|| io::Error::from_raw_os_error(EINVAL))?;
                self.pselect(nfds, readfds, writefds, errorfds, Some(&timeout))
            }
            None => self.pselect(nfds, readfds, writefds, errorfds, None),
        }
    }
}

/// Descriptors of the `kind` events, decoded from their userdata.
fn ready_fds(events: &Events, kind: EventKind) -> impl Iterator<Item = RawFd> + '_ {
    events
        .iter()
        .filter(move |event| event.kind() == kind)
        .filter_map(|event| match RawFd::try_from(event.userdata()) {
            Ok(fd) => Some(fd),
            Err(_) => {
                warn!("ignoring event with unknown userdata: {:?}", event);
                None
            }
        })
}

/// Build the subscriptions for all descriptors below `nfds`, plus one for
/// `timeout` if any.
///
/// A descriptor in both sets gets two subscriptions.
fn subscriptions(
    nfds: RawFd,
    readfds: &FdSet,
    writefds: &FdSet,
    timeout: Option<&Timespec>,
) -> io::Result<Vec<Subscription>> {
    let in_range = |fd: &RawFd| *fd < nfds;
    let capacity = readfds.iter().filter(in_range).count()
        + writefds.iter().filter(in_range).count()
        + usize::from(timeout.is_some());

    let mut subscriptions = Vec::with_capacity(capacity);
    subscriptions.extend(readfds.iter().filter(in_range).map(Subscription::fd_read));
    subscriptions.extend(writefds.iter().filter(in_range).map(Subscription::fd_write));

    if let Some(timeout) = timeout {
        let timeout = timeout
            .to_timestamp_clamp()
            .ok_or_else(|| io::Error::from_raw_os_error(EINVAL))?;
        subscriptions.push(Subscription::timeout(timeout));
    }

    debug_assert_eq!(subscriptions.len(), capacity);
    Ok(subscriptions)
}
