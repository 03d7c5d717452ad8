//! Process entry sequencing.
//!
//! A program entered through [`Startup::start`] runs its constructors, then
//! its entry function, then its at-exit hooks, and terminates with the
//! status of the entry function if that is non-zero.
//!
//! # Examples
//!
//! ```
//! use fdselect::start::Startup;
//!
//! let status = Startup::new()
//!     .constructor(|| println!("init"))
//!     .at_exit(|| println!("cleanup"))
//!     .run(|| 0);
//! assert!(status.is_ok());
//! ```

use std::fmt;
#[cfg(any(unix, target_os = "wasi"))]
use std::io::{self, Write};
use std::num::NonZeroI32;
#[cfg(not(any(unix, target_os = "wasi")))]
use std::process;

type Hook = Box<dyn FnOnce()>;

/// Builder for the entry sequence of a program.
#[derive(Default)]
pub struct Startup {
    constructors: Vec<Hook>,
    at_exit: Vec<Hook>,
}

impl Startup {
    pub fn new() -> Startup {
        Startup::default()
    }

    /// Add a hook that runs before the entry function, constructors run in
    /// the order they are added.
    pub fn constructor<F>(mut self, f: F) -> Startup
    where
        F: FnOnce() + 'static,
    {
        self.constructors.push(Box::new(f));
        self
    }

    /// Add a hook that runs after the entry function, at-exit hooks run in
    /// the reverse order they are added.
    pub fn at_exit<F>(mut self, f: F) -> Startup
    where
        F: FnOnce() + 'static,
    {
        self.at_exit.push(Box::new(f));
        self
    }

    /// Run the entry sequence with `main` as entry function.
    ///
    /// Returns `Err` with the status of `main` if it is non-zero.
    pub fn run<F>(self, main: F) -> Result<(), NonZeroI32>
    where
        F: FnOnce() -> i32,
    {
        let Startup {
            constructors,
            at_exit,
        } = self;

        trace!("running {} constructors", constructors.len());
        for constructor in constructors {
            constructor();
        }

        let status = main();

        trace!("running {} at-exit hooks, status={}", at_exit.len(), status);
        for hook in at_exit.into_iter().rev() {
            hook();
        }

        match NonZeroI32::new(status) {
            Some(status) => Err(status),
            None => Ok(()),
        }
    }

    /// Like [`run`], but exits the process if `main` returns a non-zero
    /// status.
    ///
    /// The process terminates immediately after the at-exit hooks: on unix
    /// and WASI exit handlers registered with the C runtime (`atexit`) are
    /// not run, as the at-exit hooks already took their place. Standard
    /// output is flushed first.
    ///
    /// [`run`]: Startup::run
    pub fn start<F>(self, main: F)
    where
        F: FnOnce() -> i32,
    {
        if let Err(status) = self.run(main) {
            exit(status.get());
        }
    }
}

#[cfg(any(unix, target_os = "wasi"))]
fn exit(status: i32) -> ! {
    let _ = io::stdout().flush();
    // SAFETY: `_exit` has no preconditions.
    unsafe { libc::_exit(status) }
}

#[cfg(not(any(unix, target_os = "wasi")))]
fn exit(status: i32) -> ! {
    process::exit(status)
}

impl fmt::Debug for Startup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Startup")
            .field("constructors", &self.constructors.len())
            .field("at_exit", &self.at_exit.len())
            .finish()
    }
}
