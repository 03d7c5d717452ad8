use std::fmt;
use std::slice;

use crate::RawFd;

/// Default capacity of an [`FdSet`], matching `FD_SETSIZE`.
pub const FD_SETSIZE: usize = 1024;

/// A set of file descriptors, the `fd_set` of [`select`] and [`pselect`].
///
/// Unlike the bitmap found on most platforms this set stores the
/// descriptors themselves, up to a fixed capacity chosen at construction.
/// Inserting into a full set does nothing, just like `FD_SET`.
///
/// The same set is used as input, the descriptors to watch, and as output,
/// the descriptors found ready. See [`Select::pselect`].
///
/// Sets are unordered: two sets are equal if they hold the same
/// descriptors, regardless of insertion order or capacity.
///
/// # Examples
///
/// ```
/// use fdselect::FdSet;
///
/// let mut set = FdSet::new();
/// set.insert(3);
/// set.insert(3);
/// set.insert(7);
///
/// assert_eq!(set.len(), 2);
/// assert!(set.contains(7));
///
/// set.remove(3);
/// assert_eq!(set.iter().collect::<Vec<_>>(), vec![7]);
/// ```
///
/// [`select`]: crate::select()
/// [`pselect`]: crate::pselect()
/// [`Select::pselect`]: crate::Select::pselect
#[derive(Clone)]
pub struct FdSet {
    fds: Vec<RawFd>,
    capacity: usize,
}

impl FdSet {
    /// Create an empty set holding up to [`FD_SETSIZE`] descriptors.
    pub fn new() -> FdSet {
        FdSet::with_capacity(FD_SETSIZE)
    }

    /// Create an empty set holding up to `capacity` descriptors.
    pub fn with_capacity(capacity: usize) -> FdSet {
        FdSet {
            fds: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Add `fd` to the set (`FD_SET`).
    ///
    /// Returns `true` if `fd` is in the set afterwards, that is `false` is
    /// only returned if the set is full. Negative descriptors are never
    /// added.
    pub fn insert(&mut self, fd: RawFd) -> bool {
        if self.contains(fd) {
            return true;
        }
        if fd < 0 || self.fds.len() >= self.capacity {
            return false;
        }
        self.fds.push(fd);
        true
    }

    /// Remove `fd` from the set (`FD_CLR`), returns `true` if it was
    /// present.
    ///
    /// The order of the remaining descriptors is not preserved.
    pub fn remove(&mut self, fd: RawFd) -> bool {
        match self.fds.iter().position(|&f| f == fd) {
            Some(pos) => {
                self.fds.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    /// Returns `true` if `fd` is in the set (`FD_ISSET`).
    pub fn contains(&self, fd: RawFd) -> bool {
        self.fds.contains(&fd)
    }

    /// Remove all descriptors (`FD_ZERO`), the capacity is unchanged.
    pub fn clear(&mut self) {
        self.fds.clear();
    }

    /// Number of descriptors in the set.
    pub fn len(&self) -> usize {
        self.fds.len()
    }

    /// Returns `true` if the set holds no descriptors.
    pub fn is_empty(&self) -> bool {
        self.fds.is_empty()
    }

    /// Maximum number of descriptors the set can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if no more descriptors can be added.
    pub fn is_full(&self) -> bool {
        self.fds.len() >= self.capacity
    }

    /// Iterate over the descriptors, in no particular order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.fds.iter(),
        }
    }

    /// Replace the contents with `fds`, skipping duplicates and negative
    /// descriptors.
    ///
    /// Returns the number of descriptors that didn't fit.
    pub(crate) fn replace_with<I>(&mut self, fds: I) -> usize
    where
        I: IntoIterator<Item = RawFd>,
    {
        self.fds.clear();
        self.fds.extend(fds.into_iter().filter(|fd| *fd >= 0));
        self.fds.sort_unstable();
        self.fds.dedup();
        let overflow = self.fds.len().saturating_sub(self.capacity);
        self.fds.truncate(self.capacity);
        overflow
    }
}

impl Default for FdSet {
    fn default() -> FdSet {
        FdSet::new()
    }
}

impl PartialEq for FdSet {
    fn eq(&self, other: &FdSet) -> bool {
        self.len() == other.len() && self.iter().all(|fd| other.contains(fd))
    }
}

impl Eq for FdSet {}

impl fmt::Debug for FdSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.fds.iter()).finish()
    }
}

impl FromIterator<RawFd> for FdSet {
    /// Collects into a set of capacity [`FD_SETSIZE`]; descriptors past the
    /// capacity are dropped.
    fn from_iter<I: IntoIterator<Item = RawFd>>(iter: I) -> FdSet {
        let mut set = FdSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<RawFd> for FdSet {
    fn extend<I: IntoIterator<Item = RawFd>>(&mut self, iter: I) {
        for fd in iter {
            self.insert(fd);
        }
    }
}

impl<'a> IntoIterator for &'a FdSet {
    type Item = RawFd;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// [`FdSet`] iterator.
///
/// This struct is created by the [`iter`] method on [`FdSet`].
///
/// [`iter`]: FdSet::iter
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    inner: slice::Iter<'a, RawFd>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = RawFd;

    fn next(&mut self) -> Option<RawFd> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_with_drops_duplicates() {
        let mut set = FdSet::with_capacity(4);
        set.insert(9);
        let overflow = set.replace_with(vec![3, 1, 3, -1, 1]);
        assert_eq!(overflow, 0);
        assert_eq!(set.len(), 2);
        assert!(set.contains(1) && set.contains(3));
        assert!(!set.contains(9));
    }

    #[test]
    fn replace_with_respects_capacity() {
        let mut set = FdSet::with_capacity(2);
        let overflow = set.replace_with(vec![4, 5, 6]);
        assert_eq!(overflow, 1);
        assert_eq!(set.len(), 2);
        assert!(set.is_full());
    }
}
