use std::io;

use crate::event::{Events, Subscription};

/// The event-polling primitive [`Select`] is built on.
///
/// A poller blocks until at least one of `subscriptions` is satisfied, or an
/// error occurs, and then pushes one [`Event`] per satisfied subscription
/// into `events`. `events` is empty on entry and has a capacity equal to
/// `subscriptions.len()`.
///
/// An error returned from `poll` is reported by [`Select`] as is. Errors
/// concerning a single descriptor, such as it being invalid, should instead
/// be reported on the event of that descriptor, see [`Event::with_error`].
///
/// [`Select`]: crate::Select
/// [`Event`]: crate::event::Event
/// [`Event::with_error`]: crate::event::Event::with_error
pub trait Poller {
    fn poll(&self, subscriptions: &[Subscription], events: &mut Events) -> io::Result<()>;
}

impl<P: Poller + ?Sized> Poller for &P {
    fn poll(&self, subscriptions: &[Subscription], events: &mut Events) -> io::Result<()> {
        (**self).poll(subscriptions, events)
    }
}

impl<P: Poller + ?Sized> Poller for Box<P> {
    fn poll(&self, subscriptions: &[Subscription], events: &mut Events) -> io::Result<()> {
        (**self).poll(subscriptions, events)
    }
}
