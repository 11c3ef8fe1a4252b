use std::iter::FusedIterator;
use std::marker::PhantomData;

use super::OrderTree;
use super::node::{Link, NodeRef};

impl<T, C, P> IntoIterator for OrderTree<T, C, P> {
    type Item = T;

    type IntoIter = IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        let entries: Vec<T> = self
            .drain_chains()
            .into_iter()
            .flat_map(|chain| chain.into_vec())
            .collect();
        IntoIter(entries.into_iter())
    }
}

/// An owning iterator over the elements of an [`OrderTree`], in ascending order.
pub struct IntoIter<T>(std::vec::IntoIter<T>);

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<'a, T, C, P> IntoIterator for &'a OrderTree<T, C, P> {
    type Item = &'a T;

    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        Iter {
            front: self.root.map(|root| (root.minimum(), 0)),
            back: self.root.map(|root| {
                let last = root.maximum();
                (last, last.chain().len() - 1)
            }),
            remaining: self.len(),
            _phantom: PhantomData,
        }
    }
}

/// A borrowed iterator over the elements of an [`OrderTree`], in ascending order.
///
/// Walks the tree through its parent links, so it holds no stack and each step is `O(1)`
/// amortized.
pub struct Iter<'a, T> {
    pub(crate) front: Option<(NodeRef<T>, usize)>,
    pub(crate) back: Option<(NodeRef<T>, usize)>,
    pub(crate) remaining: usize,
    pub(crate) _phantom: PhantomData<&'a T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            None?
        }
        let (node, offset) = self.front?;
        let chain = node.chain();

        self.front = if offset + 1 < chain.len() {
            Some((node, offset + 1))
        } else {
            first_of(node.next())
        };
        self.remaining -= 1;

        chain.get(offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            None?
        }
        let (node, offset) = self.back?;

        self.back = match offset {
            0 => last_of(node.prev()),
            _ => Some((node, offset - 1)),
        };
        self.remaining -= 1;

        node.chain().get(offset)
    }
}

impl<'a, T> ExactSizeIterator for Iter<'a, T> {}

impl<'a, T> FusedIterator for Iter<'a, T> {}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            front: self.front,
            back: self.back,
            remaining: self.remaining,
            _phantom: PhantomData,
        }
    }
}

fn first_of<T>(link: Link<T>) -> Option<(NodeRef<T>, usize)> {
    link.map(|node| (node, 0))
}

fn last_of<T>(link: Link<T>) -> Option<(NodeRef<T>, usize)> {
    link.map(|node| (node, node.chain().len() - 1))
}

// SAFETY: Iter only hands out shared references to the elements, like a slice iterator.
unsafe impl<T: Sync> Send for Iter<'_, T> {}

// SAFETY: As above.
unsafe impl<T: Sync> Sync for Iter<'_, T> {}
