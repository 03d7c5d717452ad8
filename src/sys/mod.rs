//! Module with system specific types.
//!
//! Required types:
//!
//! * `Selector`: the platform implementation of [`Poller`], created with
//!   `Selector::new() -> io::Result<Selector>`.
//!
//! Required constants, raw OS error codes as `i32`:
//!
//! * `EBADF`: invalid descriptor.
//! * `EINVAL`: invalid argument.
//! * `ENOSYS`: operation not supported.
//!
//! [`Poller`]: crate::Poller

#[cfg(any(unix, target_os = "wasi"))]
pub(crate) use libc::{EBADF, EINVAL, ENOSYS};

// Values as defined by POSIX for platforms without `libc`.
#[cfg(not(any(unix, target_os = "wasi")))]
pub(crate) const EBADF: i32 = 9;
#[cfg(not(any(unix, target_os = "wasi")))]
pub(crate) const EINVAL: i32 = 22;
#[cfg(not(any(unix, target_os = "wasi")))]
pub(crate) const ENOSYS: i32 = 38;

cfg_os_poll! {
    #[cfg(unix)]
    mod unix;
    #[cfg(unix)]
    pub use self::unix::Selector;

    #[cfg(target_os = "wasi")]
    mod wasi;
    #[cfg(target_os = "wasi")]
    pub use self::wasi::Selector;

    #[cfg(not(any(unix, target_os = "wasi")))]
    mod shell;
    #[cfg(not(any(unix, target_os = "wasi")))]
    pub use self::shell::Selector;
}

cfg_not_os_poll! {
    mod shell;
    pub use self::shell::Selector;
}
