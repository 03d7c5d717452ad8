// Not all functions are used by all tests.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fmt;
use std::io;
use std::sync::Once;

use fdselect::event::{Event, Events, Subscription};
use fdselect::{FdSet, Poller, RawFd};

pub fn init() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        env_logger::try_init().expect("unable to initialise logger");
    })
}

pub fn fd_set<I: IntoIterator<Item = RawFd>>(fds: I) -> FdSet {
    fds.into_iter().collect()
}

/// Sorted descriptors of `set`, for comparisons.
pub fn sorted(set: &FdSet) -> Vec<RawFd> {
    let mut fds: Vec<RawFd> = set.iter().collect();
    fds.sort_unstable();
    fds
}

/// Assert that `result` is an error with the raw OS error code `errno`.
pub fn assert_errno<T: fmt::Debug>(result: io::Result<T>, errno: i32) {
    match result {
        Ok(value) => panic!("unexpected OK result: {:?}, expected errno {}", value, errno),
        Err(err) => assert_eq!(
            err.raw_os_error(),
            Some(errno),
            "unexpected error: {}, expected errno {}",
            err,
            errno
        ),
    }
}

type Respond = Box<dyn Fn(&[Subscription]) -> io::Result<Vec<Event>>>;

/// A [`Poller`] that records its calls and answers them from a closure.
pub struct MockPoller {
    respond: Respond,
    calls: RefCell<Vec<Vec<Subscription>>>,
    dropped: Cell<usize>,
}

impl MockPoller {
    pub fn new<F>(respond: F) -> MockPoller
    where
        F: Fn(&[Subscription]) -> io::Result<Vec<Event>> + 'static,
    {
        MockPoller {
            respond: Box::new(respond),
            calls: RefCell::new(Vec::new()),
            dropped: Cell::new(0),
        }
    }

    /// Reports every subscription as ready.
    pub fn all_ready() -> MockPoller {
        MockPoller::new(|subscriptions| Ok(subscriptions.iter().map(ready).collect()))
    }

    /// Reports the given events, whatever the subscriptions.
    pub fn events(events: Vec<Event>) -> MockPoller {
        MockPoller::new(move |_| Ok(events.clone()))
    }

    /// Fails every call with `errno`.
    pub fn error(errno: i32) -> MockPoller {
        MockPoller::new(move |_| Err(io::Error::from_raw_os_error(errno)))
    }

    /// Panics when called.
    pub fn unreachable() -> MockPoller {
        MockPoller::new(|subscriptions| panic!("unexpected poll: {:?}", subscriptions))
    }

    /// Subscriptions passed to each call so far.
    pub fn calls(&self) -> Vec<Vec<Subscription>> {
        self.calls.borrow().clone()
    }

    /// Subscriptions of the only call so far.
    pub fn single_call(&self) -> Vec<Subscription> {
        let calls = self.calls.borrow();
        assert_eq!(calls.len(), 1, "expected a single call: {:?}", calls);
        calls[0].clone()
    }

    /// Number of events `Events` refused because it was full.
    pub fn dropped(&self) -> usize {
        self.dropped.get()
    }
}

impl Poller for MockPoller {
    fn poll(&self, subscriptions: &[Subscription], events: &mut Events) -> io::Result<()> {
        assert!(events.is_empty(), "events not empty: {:?}", events);
        assert_eq!(events.capacity(), subscriptions.len());
        self.calls.borrow_mut().push(subscriptions.to_vec());

        for event in (self.respond)(subscriptions)? {
            if !events.push(event) {
                self.dropped.set(self.dropped.get() + 1);
            }
        }
        Ok(())
    }
}

/// The event reporting `subscription` as ready.
pub fn ready(subscription: &Subscription) -> Event {
    match *subscription {
        Subscription::Fd {
            userdata,
            direction: fdselect::event::Direction::Read,
            ..
        } => Event::fd_read(userdata),
        Subscription::Fd { userdata, .. } => Event::fd_write(userdata),
        Subscription::Clock { userdata, .. } => Event::clock(userdata),
    }
}

#[cfg(unix)]
pub use self::pipe::Pipe;

#[cfg(unix)]
mod pipe {
    use fdselect::RawFd;

    /// Both ends of a `pipe(2)`, closed on drop.
    #[derive(Debug)]
    pub struct Pipe {
        pub receiver: RawFd,
        pub sender: RawFd,
    }

    impl Pipe {
        pub fn new() -> Pipe {
            let mut fds = [-1; 2];
            assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0, "pipe failed");
            Pipe {
                receiver: fds[0],
                sender: fds[1],
            }
        }

        pub fn write(&self, buf: &[u8]) {
            let n = unsafe { libc::write(self.sender, buf.as_ptr().cast(), buf.len()) };
            assert_eq!(n, buf.len() as isize, "write failed");
        }

        /// Close the sending end, the receiving end will see a hang up.
        pub fn close_sender(&mut self) {
            unsafe { libc::close(self.sender) };
            self.sender = -1;
        }
    }

    impl Drop for Pipe {
        fn drop(&mut self) {
            for fd in [self.receiver, self.sender] {
                if fd >= 0 {
                    unsafe { libc::close(fd) };
                }
            }
        }
    }
}
