use std::cmp::Ordering;
use std::fmt::{self, Debug, Formatter};

/// A total order over `T`, used by [`OrderTree`](super::OrderTree) to place its elements.
///
/// Implementations must be consistent: `compare(a, b)` and `compare(b, a)` must be opposites, and
/// the order must be transitive. Trees built over an inconsistent comparator won't misbehave
/// memory-wise, but lookups may miss elements.
pub trait Comparator<T: ?Sized> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// Orders elements by their [`Ord`] implementation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord + ?Sized> Comparator<T> for Natural {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

/// Orders elements with an arbitrary comparison closure.
#[derive(Clone, Copy)]
pub struct FnComparator<F>(pub F);

impl<T: ?Sized, F: Fn(&T, &T) -> Ordering> Comparator<T> for FnComparator<F> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.0)(a, b)
    }
}

impl<F> Debug for FnComparator<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("FnComparator")
    }
}

/// Orders elements by a key extracted from each of them. Two elements with the same key compare
/// equal, which is what a [`Chained`](super::Chained) tree uses to group them.
#[derive(Clone, Copy)]
pub struct KeyComparator<F>(pub F);

impl<T: ?Sized, K: Ord, F: Fn(&T) -> K> Comparator<T> for KeyComparator<F> {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        (self.0)(a).cmp(&(self.0)(b))
    }
}

impl<F> Debug for KeyComparator<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("KeyComparator")
    }
}
