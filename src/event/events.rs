use std::fmt;
use std::slice;

use crate::event::Event;

/// A fixed capacity collection of [`Event`]s filled in by a [`Poller`].
///
/// The capacity is set once, to the number of subscriptions passed to the
/// poller, and [`push`] refuses events beyond it. A poller can therefore
/// never report more events than it was given subscriptions.
///
/// # Examples
///
/// ```
/// use fdselect::event::{Event, Events};
///
/// let mut events = Events::with_capacity(1);
/// assert!(events.push(Event::fd_read(4)));
/// assert!(!events.push(Event::fd_write(4)));
///
/// assert_eq!(events.len(), 1);
/// assert!(events.iter().all(|event| event.is_readable()));
/// ```
///
/// [`Poller`]: crate::Poller
/// [`push`]: Events::push
pub struct Events {
    inner: Vec<Event>,
    capacity: usize,
}

/// [`Events`] iterator.
///
/// This struct is created by the [`iter`] method on [`Events`].
///
/// [`iter`]: Events::iter
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: slice::Iter<'a, Event>,
}

impl Events {
    /// Return a new `Events` capable of holding up to `capacity` events.
    pub fn with_capacity(capacity: usize) -> Events {
        Events {
            inner: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Returns the number of `Event` values that `self` can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if `self` contains no `Event` values.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns `true` if no more events can be pushed.
    pub fn is_full(&self) -> bool {
        self.inner.len() >= self.capacity
    }

    /// Append `event`, returns `false` (dropping the event) if `self` is
    /// full.
    pub fn push(&mut self, event: Event) -> bool {
        if self.is_full() {
            return false;
        }
        self.inner.push(event);
        true
    }

    /// Returns an iterator over the `Event` values.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.inner.iter(),
        }
    }
}

impl<'a> IntoIterator for &'a Events {
    type Item = &'a Event;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Event;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl fmt::Debug for Events {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.inner).finish()
    }
}
