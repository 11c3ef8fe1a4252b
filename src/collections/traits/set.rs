use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};
use std::iter::{Chain, FusedIterator};

use crate::collections::order_tree::{Comparator, Iter as TreeIter, KeyPolicy, OrderTree};

/// Membership and iteration over a collection of elements. This is what
/// [`OrderTree::retain_all`] filters against.
///
/// Elements are usually distinct, but an [`OrderTree`] with the
/// [`Chained`](crate::collections::order_tree::Chained) policy is a multiset: its `iter` yields
/// every copy, and so do `difference`, `intersection` and `union` when it is `self`.
pub trait Set<T> {
    type Iter<'a>: Iterator<Item = &'a T> where Self: 'a, T: 'a;

    fn contains(&self, item: &T) -> bool;

    /// Returns an iterator over all elements of the set, as references.
    fn iter<'a>(&'a self) -> Self::Iter<'a>;

    /// Creates a borrowed iterator over all items that are in `self` but not `other`.
    /// (`self \ other`)
    fn difference<'a, S: Set<T>>(&'a self, other: &'a S) -> Difference<'a, Self, S, T>
    where
        Self: Sized,
        T: 'a,
    {
        Difference {
            inner: self.iter(),
            other,
        }
    }

    /// Creates a borrowed iterator over all items that are in both `self` and `other`.
    /// (`self ∩ other`)
    fn intersection<'a, S: Set<T>>(&'a self, other: &'a S) -> Intersection<'a, Self, S, T>
    where
        Self: Sized,
        T: 'a,
    {
        Intersection {
            inner: self.iter(),
            other,
        }
    }

    /// Creates a borrowed iterator over all items that are in either `self` or `other`.
    /// (`self ∪ other`)
    fn union<'a, S: Set<T>>(&'a self, other: &'a S) -> Union<'a, Self, S, T>
    where
        Self: Sized,
        T: 'a,
    {
        Union {
            inner: self.iter().chain(other.difference(self)),
        }
    }

    /// Returns true if `other` contains all elements of `self`. (`self ⊆ other`)
    fn is_subset<S: Set<T>>(&self, other: &S) -> bool {
        self.iter().all(|item| other.contains(item))
    }

    /// Returns true if `self` contains all elements of `other`. (`self ⊇ other`)
    fn is_superset<S: Set<T>>(&self, other: &S) -> bool {
        other.iter().all(|item| self.contains(item))
    }
}

pub struct Difference<'a, A: Set<T> + 'a, B: Set<T>, T: 'a> {
    pub(crate) inner: A::Iter<'a>,
    pub(crate) other: &'a B,
}

impl<'a, A: Set<T>, B: Set<T>, T: 'a> Iterator for Difference<'a, A, B, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let mut next = self.inner.next();
        while let Some(item) = &next
            && self.other.contains(item)
        {
            next = self.inner.next();
        }
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl<'a, A: Set<T>, B: Set<T>, T: 'a> FusedIterator for Difference<'a, A, B, T> {}

pub struct Intersection<'a, A: Set<T> + 'a, B: Set<T>, T: 'a> {
    pub(crate) inner: A::Iter<'a>,
    pub(crate) other: &'a B,
}

impl<'a, A: Set<T>, B: Set<T>, T: 'a> Iterator for Intersection<'a, A, B, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let mut next = self.inner.next();
        while let Some(item) = &next
            && !self.other.contains(item)
        {
            next = self.inner.next();
        }
        next
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl<'a, A: Set<T>, B: Set<T>, T: 'a> FusedIterator for Intersection<'a, A, B, T> {}

pub struct Union<'a, A: Set<T> + 'a, B: Set<T> + 'a, T: 'a> {
    pub(crate) inner: Chain<A::Iter<'a>, Difference<'a, B, A, T>>,
}

impl<'a, A: Set<T>, B: Set<T>, T: 'a> Iterator for Union<'a, A, B, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, A: Set<T>, B: Set<T>, T: 'a> FusedIterator for Union<'a, A, B, T> {}

impl<T: Eq, C: Comparator<T>, P: KeyPolicy> Set<T> for OrderTree<T, C, P> {
    type Iter<'a> = TreeIter<'a, T> where Self: 'a, T: 'a;

    fn contains(&self, item: &T) -> bool {
        OrderTree::contains(self, item)
    }

    fn iter<'a>(&'a self) -> Self::Iter<'a> {
        OrderTree::iter(self)
    }
}

impl<T: Hash + Eq, S: BuildHasher> Set<T> for HashSet<T, S> {
    type Iter<'a> = std::collections::hash_set::Iter<'a, T> where Self: 'a, T: 'a;

    fn contains(&self, item: &T) -> bool {
        HashSet::contains(self, item)
    }

    fn iter<'a>(&'a self) -> Self::Iter<'a> {
        HashSet::iter(self)
    }
}

impl<T: Ord> Set<T> for BTreeSet<T> {
    type Iter<'a> = std::collections::btree_set::Iter<'a, T> where Self: 'a, T: 'a;

    fn contains(&self, item: &T) -> bool {
        BTreeSet::contains(self, item)
    }

    fn iter<'a>(&'a self) -> Self::Iter<'a> {
        BTreeSet::iter(self)
    }
}
