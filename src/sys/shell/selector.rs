use std::io;

use crate::event::{Events, Subscription};
use crate::Poller;

/// Stand-in for platforms without a poller, or builds without the
/// `os-poll` feature. Every operation fails with `Unsupported`.
#[derive(Debug)]
pub struct Selector {
    _priv: (),
}

impl Selector {
    #[allow(dead_code)]
    pub fn new() -> io::Result<Selector> {
        Err(os_required())
    }
}

impl Poller for Selector {
    fn poll(&self, _: &[Subscription], _: &mut Events) -> io::Result<()> {
        Err(os_required())
    }
}

fn os_required() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "fdselect must be compiled with `os-poll` on a supported platform to poll",
    )
}
