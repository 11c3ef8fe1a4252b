use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Chained, Comparator, KeyPolicy, Natural, OrderTree, Unique};
use crate::collections::traits::Set;
use crate::util::error::IndexOutOfBounds;

/// An [`OrderTree`] that can be shared between threads.
///
/// Every mutation takes the write lock and every read takes the read lock, so readers never see
/// a tree halfway through a rotation and a completed `add` or `remove` is visible to every
/// operation that starts after it. For reads that must see several elements consistently, hold
/// the guard returned by [`read`](ConcurrentOrderTree::read) for their duration.
pub struct ConcurrentOrderTree<T, C = Natural, P = Unique> {
    pub(crate) inner: RwLock<OrderTree<T, C, P>>,
}

impl<T: Ord> ConcurrentOrderTree<T> {
    pub const fn new() -> ConcurrentOrderTree<T> {
        ConcurrentOrderTree::from_tree(OrderTree::new())
    }
}

impl<T: Ord> ConcurrentOrderTree<T, Natural, Chained> {
    pub const fn chained() -> ConcurrentOrderTree<T, Natural, Chained> {
        ConcurrentOrderTree::from_tree(OrderTree::chained())
    }
}

impl<T, C, P> ConcurrentOrderTree<T, C, P> {
    pub const fn with_comparator(cmp: C) -> ConcurrentOrderTree<T, C, P> {
        ConcurrentOrderTree::from_tree(OrderTree::with_comparator(cmp))
    }

    pub const fn from_tree(tree: OrderTree<T, C, P>) -> ConcurrentOrderTree<T, C, P> {
        ConcurrentOrderTree {
            inner: RwLock::new(tree),
        }
    }

    pub fn into_inner(self) -> OrderTree<T, C, P> {
        self.inner.into_inner()
    }

    /// Locks the tree for reading, blocking until no writer holds it.
    pub fn read(&self) -> RwLockReadGuard<'_, OrderTree<T, C, P>> {
        self.inner.read()
    }

    /// Locks the tree for writing, blocking until no other guard is held.
    pub fn write(&self) -> RwLockWriteGuard<'_, OrderTree<T, C, P>> {
        self.inner.write()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn clear(&self) {
        self.write().clear()
    }

    /// Copies out every element, in ascending order, from a single consistent snapshot.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.read().iter().cloned().collect()
    }
}

impl<T, C: Comparator<T>, P: KeyPolicy> ConcurrentOrderTree<T, C, P> {
    pub fn add(&self, item: T) -> bool {
        self.write().add(item)
    }

    pub fn add_all<I: IntoIterator<Item = T>>(&self, items: I) -> bool {
        self.write().add_all(items)
    }

    /// Returns a copy of the `index`-th smallest element.
    pub fn get(&self, index: usize) -> Result<T, IndexOutOfBounds>
    where
        T: Clone,
    {
        self.read().get(index).cloned()
    }

    pub fn remove_at(&self, index: usize) -> Result<T, IndexOutOfBounds> {
        self.write().remove_at(index)
    }

    pub fn retain<F: FnMut(&T) -> bool>(&self, keep: F) -> bool {
        self.write().retain(keep)
    }

    pub fn retain_all<S: Set<T>>(&self, set: &S) -> bool {
        self.write().retain_all(set)
    }

    pub fn validate(&self) -> Result<(), super::InvariantViolation> {
        self.read().validate()
    }
}

impl<T: Eq, C: Comparator<T>, P: KeyPolicy> ConcurrentOrderTree<T, C, P> {
    pub fn contains(&self, item: &T) -> bool {
        self.read().contains(item)
    }

    pub fn remove(&self, item: &T) -> bool {
        self.write().remove(item)
    }

    pub fn take(&self, item: &T) -> Option<T> {
        self.write().take(item)
    }

    pub fn remove_all<'a, I>(&self, items: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        self.write().remove_all(items)
    }

    pub fn index_of(&self, item: &T) -> Option<usize> {
        self.read().index_of(item)
    }
}

impl<T, C: Default, P> Default for ConcurrentOrderTree<T, C, P> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T, C, P> From<OrderTree<T, C, P>> for ConcurrentOrderTree<T, C, P> {
    fn from(tree: OrderTree<T, C, P>) -> Self {
        ConcurrentOrderTree::from_tree(tree)
    }
}
