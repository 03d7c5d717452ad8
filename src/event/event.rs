use std::fmt;

use crate::event::Userdata;

/// The condition an [`Event`] reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A clock subscription expired.
    Clock,
    /// A descriptor became readable.
    FdRead,
    /// A descriptor became writable.
    FdWrite,
}

/// A notification produced by a [`Poller`] for a [`Subscription`].
///
/// [`Poller`]: crate::Poller
/// [`Subscription`]: crate::event::Subscription
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Event {
    userdata: Userdata,
    kind: EventKind,
    error: Option<i32>,
    nbytes: u64,
    hangup: bool,
}

impl Event {
    pub fn new(userdata: Userdata, kind: EventKind) -> Event {
        Event {
            userdata,
            kind,
            error: None,
            nbytes: 0,
            hangup: false,
        }
    }

    pub fn fd_read(userdata: Userdata) -> Event {
        Event::new(userdata, EventKind::FdRead)
    }

    pub fn fd_write(userdata: Userdata) -> Event {
        Event::new(userdata, EventKind::FdWrite)
    }

    pub fn clock(userdata: Userdata) -> Event {
        Event::new(userdata, EventKind::Clock)
    }

    /// Attach a raw OS error code to the event, e.g. `EBADF` for an invalid
    /// descriptor.
    pub fn with_error(mut self, errno: i32) -> Event {
        self.error = Some(errno);
        self
    }

    /// Set the number of bytes available for reading or writing, if known.
    pub fn with_nbytes(mut self, nbytes: u64) -> Event {
        self.nbytes = nbytes;
        self
    }

    /// Mark the peer as hung up.
    pub fn with_hangup(mut self, hangup: bool) -> Event {
        self.hangup = hangup;
        self
    }

    /// The [`Userdata`] of the subscription that produced this event.
    pub fn userdata(&self) -> Userdata {
        self.userdata
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn is_readable(&self) -> bool {
        self.kind == EventKind::FdRead
    }

    pub fn is_writable(&self) -> bool {
        self.kind == EventKind::FdWrite
    }

    pub fn is_clock(&self) -> bool {
        self.kind == EventKind::Clock
    }

    /// The raw OS error code of the event, if any.
    pub fn raw_os_error(&self) -> Option<i32> {
        self.error
    }

    pub fn nbytes(&self) -> u64 {
        self.nbytes
    }

    pub fn is_hangup(&self) -> bool {
        self.hangup
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("Event");
        d.field("userdata", &self.userdata).field("kind", &self.kind);
        if let Some(errno) = self.error {
            d.field("error", &errno);
        }
        d.field("nbytes", &self.nbytes)
            .field("hangup", &self.hangup)
            .finish()
    }
}
