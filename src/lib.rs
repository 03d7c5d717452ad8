#![deny(
    missing_debug_implementations,
    rust_2018_idioms,
    unused_imports,
    dead_code
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! POSIX `select(2)` and `pselect(2)` for platforms whose only readiness
//! primitive is a subscription based poll, such as WASI's `poll_oneoff`.
//!
//! Such a primitive takes a list of subscriptions, each either "notify me
//! when descriptor D is readable/writable" or "notify me when the clock
//! reaches T", and returns a list of events correlating back to them. This
//! crate builds that list from [`FdSet`]s, invokes the primitive once, and
//! writes the ready descriptors back into the same sets, keeping the POSIX
//! semantics of the `nfds` bound, timeout handling, error precedence and
//! in-place set mutation.
//!
//! The primitive is abstracted by the [`Poller`] trait. [`Select`] combines
//! a poller with the translation; the free functions [`select`] and
//! [`pselect`] use the platform poller.
//!
//! Polling for exceptional conditions, e.g. out-of-band data, is not
//! supported and rejected with `ENOSYS`.
//!
//! # Examples
//!
//! A zero timeout with no descriptors returns immediately.
//!
#![cfg_attr(feature = "os-poll", doc = "```")]
#![cfg_attr(not(feature = "os-poll"), doc = "```ignore")]
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use fdselect::{pselect, FdSet, Timespec};
//!
//! let mut readfds = FdSet::new();
//! let n = pselect(0, Some(&mut readfds), None, None, Some(&Timespec::new(0, 0)))?;
//! assert_eq!(n, 0);
//! #     Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! * `os-poll` (default): enables the platform poller, [`Select::new`],
//!   [`select`] and [`pselect`]. Without it only [`Select::with_poller`] can
//!   be used.
//! * `log` (default): emits diagnostics using the `log` crate.

#[macro_use]
mod macros;

mod fd_set;
mod poller;
mod select;
mod sys;

pub mod event;
pub mod start;
pub mod time;

pub use fd_set::{FdSet, Iter, FD_SETSIZE};
pub use poller::Poller;
pub use select::Select;
pub use sys::Selector;
pub use time::{Timespec, Timestamp, Timeval};

/// Descriptor identifier, a non-negative C `int`.
pub type RawFd = std::os::raw::c_int;

cfg_os_poll! {
    /// [`Select::pselect`] using the platform poller.
    pub fn pselect(
        nfds: RawFd,
        readfds: Option<&mut FdSet>,
        writefds: Option<&mut FdSet>,
        errorfds: Option<&FdSet>,
        timeout: Option<&Timespec>,
    ) -> std::io::Result<usize> {
        Select::new()?.pselect(nfds, readfds, writefds, errorfds, timeout)
    }

    /// [`Select::select`] using the platform poller.
    pub fn select(
        nfds: RawFd,
        readfds: Option<&mut FdSet>,
        writefds: Option<&mut FdSet>,
        errorfds: Option<&FdSet>,
        timeout: Option<&Timeval>,
    ) -> std::io::Result<usize> {
        Select::new()?.select(nfds, readfds, writefds, errorfds, timeout)
    }
}
