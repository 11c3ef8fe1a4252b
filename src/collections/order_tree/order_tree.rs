use std::cmp::Ordering;
use std::fmt::{self, Debug, Display, Formatter};
use std::marker::PhantomData;
use std::ops::Index;

use super::node::{self, Chain, Color, Link, NodeRef};
use super::{Chained, Comparator, Iter, KeyPolicy, Natural, Unique};
use crate::collections::traits::Set;
use crate::util::error::IndexOutOfBounds;
use crate::util::fmt::DebugRaw;
use crate::util::log::trace_log;
use crate::util::option::OptionExtension;
use crate::util::result::ResultExtension;

/// A red-black tree augmented with subtree sizes, giving `O(log n)` insertion, removal, lookup,
/// rank and select.
///
/// Elements are placed by a [`Comparator`] (by default their [`Ord`] implementation) and
/// identified by [`Eq`]. The [`KeyPolicy`] decides what happens to an element that compares equal
/// to one already present: [`Unique`] trees reject it, [`Chained`] trees keep both, in insertion
/// order, inside a single node.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of elements in the tree.
/// - `c`: The length of the collision chain holding the element in question (`1` for [`Unique`]).
///
/// | Method | Complexity |
/// |-|-|
/// | `len` | `O(1)` |
/// | `add` | `O(log n)` |
/// | `remove` | `O(log n + c)` |
/// | `contains` | `O(log n + c)` |
/// | `get` | `O(log n)` |
/// | `index_of` | `O(log n + c)` |
/// | `floor` / `ceiling` / `lower` / `higher` | `O(log n)` |
/// | `retain_all` | `O(n)` set lookups |
/// | `iter().next()` | `O(1)` amortized |
pub struct OrderTree<T, C = Natural, P = Unique> {
    pub(crate) root: Link<T>,
    pub(crate) cmp: C,
    pub(crate) _phantom: PhantomData<(T, fn() -> P)>,
}

// SAFETY: The tree exclusively owns its nodes, the same way a Box<T> would, and only hands out
// references tied to its own borrow.
unsafe impl<T: Send, C: Send, P> Send for OrderTree<T, C, P> {}

// SAFETY: Shared references only ever read through the nodes.
unsafe impl<T: Sync, C: Sync, P> Sync for OrderTree<T, C, P> {}

impl<T: Ord> OrderTree<T> {
    /// Creates an empty ordered set, using the natural order of `T`.
    pub const fn new() -> OrderTree<T> {
        OrderTree::with_comparator(Natural)
    }
}

impl<T: Ord> OrderTree<T, Natural, Chained> {
    /// Creates an empty tree that keeps colliding elements, using the natural order of `T`.
    pub const fn chained() -> OrderTree<T, Natural, Chained> {
        OrderTree::with_comparator(Natural)
    }
}

impl<T, C, P> OrderTree<T, C, P> {
    pub const fn with_comparator(cmp: C) -> OrderTree<T, C, P> {
        OrderTree {
            root: None,
            cmp,
            _phantom: PhantomData,
        }
    }

    /// The number of elements, counting every element of every collision chain.
    pub fn len(&self) -> usize {
        node::size_of(self.root)
    }

    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub const fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns a lazy ascending iterator. Colliding elements are yielded in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        self.into_iter()
    }

    pub fn first(&self) -> Option<&T> {
        self.root.map(|root| root.minimum().chain().key())
    }

    pub fn last(&self) -> Option<&T> {
        self.root.map(|root| root.maximum().chain().last())
    }

    pub fn clear(&mut self) {
        node::free(self.root.take());
    }

    /// Moves every chain out of the tree, in order, leaving it empty.
    pub(crate) fn drain_chains(&mut self) -> Vec<Chain<T>> {
        let mut chains = Vec::with_capacity(self.len());
        drain_into(self.root.take(), &mut chains);
        chains
    }

    /// Replaces the (empty) tree with a perfectly balanced one holding `chains`, which must
    /// already be in ascending order.
    pub(crate) fn rebuild(&mut self, chains: Vec<Chain<T>>) {
        debug_assert!(self.root.is_none());
        let count = chains.len();
        // Every level above this one is full and black, the partial last level is red.
        let red_depth = (count + 1).ilog2();
        self.root = build(&mut chains.into_iter(), count, 0, red_depth);
    }

    /// Replaces `old` with `new` in `old`'s parent, or at the root.
    fn transplant(&mut self, old: NodeRef<T>, new: Link<T>) {
        let parent = old.parent();
        match parent {
            None => self.root = new,
            Some(p) if p.left() == Some(old) => p.set_left(new),
            Some(p) => p.set_right(new),
        }
        if let Some(new) = new {
            new.set_parent(parent);
        }
    }

    fn rotate_left(&mut self, x: NodeRef<T>) {
        // SAFETY: Rotations are only performed towards an existing child.
        let y = unsafe { x.right().unreachable() };
        x.set_right(y.left());
        if let Some(inner) = y.left() {
            inner.set_parent(Some(x));
        }
        self.transplant(x, Some(y));
        y.set_left(Some(x));
        x.set_parent(Some(y));

        // y now spans exactly what x used to.
        y.set_size(x.size());
        x.update_size();
    }

    fn rotate_right(&mut self, x: NodeRef<T>) {
        // SAFETY: Rotations are only performed towards an existing child.
        let y = unsafe { x.left().unreachable() };
        x.set_left(y.right());
        if let Some(inner) = y.right() {
            inner.set_parent(Some(x));
        }
        self.transplant(x, Some(y));
        y.set_right(Some(x));
        x.set_parent(Some(y));

        y.set_size(x.size());
        x.update_size();
    }

    fn insert_fixup(&mut self, mut node: NodeRef<T>) {
        while let Some(parent) = node.parent()
            && parent.is_red()
        {
            // SAFETY: The root is black, so a red parent always has a parent of its own.
            let grand = unsafe { parent.parent().unreachable() };

            if grand.left() == Some(parent) {
                match grand.right() {
                    Some(uncle) if uncle.is_red() => {
                        parent.set_color(Color::Black);
                        uncle.set_color(Color::Black);
                        grand.set_color(Color::Red);
                        node = grand;
                    },
                    _ => {
                        let mut parent = parent;
                        if parent.right() == Some(node) {
                            node = parent;
                            self.rotate_left(node);
                            // SAFETY: The rotation made the old child node's parent.
                            parent = unsafe { node.parent().unreachable() };
                        }
                        parent.set_color(Color::Black);
                        grand.set_color(Color::Red);
                        self.rotate_right(grand);
                    },
                }
            } else {
                match grand.left() {
                    Some(uncle) if uncle.is_red() => {
                        parent.set_color(Color::Black);
                        uncle.set_color(Color::Black);
                        grand.set_color(Color::Red);
                        node = grand;
                    },
                    _ => {
                        let mut parent = parent;
                        if parent.left() == Some(node) {
                            node = parent;
                            self.rotate_right(node);
                            // SAFETY: Mirror of the branch above.
                            parent = unsafe { node.parent().unreachable() };
                        }
                        parent.set_color(Color::Black);
                        grand.set_color(Color::Red);
                        self.rotate_left(grand);
                    },
                }
            }
        }

        if let Some(root) = self.root {
            root.set_color(Color::Black);
        }
    }

    /// Detaches `target` from the tree and rebalances. Sizes are restored before returning, the
    /// node itself is left for the caller to free.
    fn unlink(&mut self, target: NodeRef<T>) {
        let mut removed_color = target.color();
        let child: Link<T>;
        let child_parent: Link<T>;

        match (target.left(), target.right()) {
            (None, right) => {
                child = right;
                child_parent = target.parent();
                self.transplant(target, right);
            },
            (left, None) => {
                child = left;
                child_parent = target.parent();
                self.transplant(target, left);
            },
            (Some(left), Some(right)) => {
                let successor = right.minimum();
                removed_color = successor.color();
                child = successor.right();

                if successor.parent() == Some(target) {
                    child_parent = Some(successor);
                } else {
                    child_parent = successor.parent();
                    self.transplant(successor, successor.right());
                    successor.set_right(Some(right));
                    right.set_parent(Some(successor));
                }

                self.transplant(target, Some(successor));
                successor.set_left(Some(left));
                left.set_parent(Some(successor));
                successor.set_color(target.color());
            },
        }

        // Every subtree that lost an entry is rooted on the path from child_parent upwards.
        let mut current = child_parent;
        while let Some(node) = current {
            node.update_size();
            current = node.parent();
        }

        if removed_color == Color::Black {
            self.remove_fixup(child, child_parent);
        }
    }

    fn remove_fixup(&mut self, mut node: Link<T>, mut parent: Link<T>) {
        while node != self.root && !node::is_red(node) {
            // SAFETY: node isn't the root, so it has a parent.
            let p = unsafe { parent.unreachable() };

            if p.left() == node {
                // SAFETY: node is doubly black, so its sibling's subtree has a black height of at
                // least one and can't be empty.
                let mut sibling = unsafe { p.right().unreachable() };
                if sibling.is_red() {
                    sibling.set_color(Color::Black);
                    p.set_color(Color::Red);
                    self.rotate_left(p);
                    // SAFETY: As above, the new sibling is one of the old sibling's black children.
                    sibling = unsafe { p.right().unreachable() };
                }

                if !node::is_red(sibling.left()) && !node::is_red(sibling.right()) {
                    sibling.set_color(Color::Red);
                    node = Some(p);
                    parent = p.parent();
                } else {
                    if !node::is_red(sibling.right()) {
                        if let Some(near) = sibling.left() {
                            near.set_color(Color::Black);
                        }
                        sibling.set_color(Color::Red);
                        self.rotate_right(sibling);
                        // SAFETY: The rotation moved sibling's red child into its place.
                        sibling = unsafe { p.right().unreachable() };
                    }
                    sibling.set_color(p.color());
                    p.set_color(Color::Black);
                    if let Some(far) = sibling.right() {
                        far.set_color(Color::Black);
                    }
                    self.rotate_left(p);
                    node = self.root;
                    parent = None;
                }
            } else {
                // SAFETY: Mirror of the branch above.
                let mut sibling = unsafe { p.left().unreachable() };
                if sibling.is_red() {
                    sibling.set_color(Color::Black);
                    p.set_color(Color::Red);
                    self.rotate_right(p);
                    // SAFETY: Mirror of the branch above.
                    sibling = unsafe { p.left().unreachable() };
                }

                if !node::is_red(sibling.left()) && !node::is_red(sibling.right()) {
                    sibling.set_color(Color::Red);
                    node = Some(p);
                    parent = p.parent();
                } else {
                    if !node::is_red(sibling.left()) {
                        if let Some(near) = sibling.right() {
                            near.set_color(Color::Black);
                        }
                        sibling.set_color(Color::Red);
                        self.rotate_left(sibling);
                        // SAFETY: Mirror of the branch above.
                        sibling = unsafe { p.left().unreachable() };
                    }
                    sibling.set_color(p.color());
                    p.set_color(Color::Black);
                    if let Some(far) = sibling.left() {
                        far.set_color(Color::Black);
                    }
                    self.rotate_right(p);
                    node = self.root;
                    parent = None;
                }
            }
        }

        if let Some(node) = node {
            node.set_color(Color::Black);
        }
    }

    /// Removes the entry at `offset` in `node`'s chain, unlinking the node if it was the last.
    fn take_entry(&mut self, node: NodeRef<T>, offset: usize) -> T {
        if node.chain().len() > 1 {
            let entry = node.chain_mut().remove(offset);
            let mut current = Some(node);
            while let Some(n) = current {
                n.set_size(n.size() - 1);
                current = n.parent();
            }
            return entry;
        }

        self.unlink(node);
        node.take_node().chain.into_only()
    }

    /// Locates the `index`-th smallest entry as a node and an offset into its chain.
    fn seek(&self, index: usize) -> Result<(NodeRef<T>, usize), IndexOutOfBounds> {
        let len = self.len();
        if index >= len {
            return Err(IndexOutOfBounds { index, len });
        }

        let mut remaining = index;
        let mut current = self.root;
        while let Some(node) = current {
            let left = node::size_of(node.left());
            if remaining < left {
                current = node.left();
                continue;
            }

            let offset = remaining - left;
            let chain = node.chain().len();
            if offset < chain {
                return Ok((node, offset));
            }
            remaining = offset - chain;
            current = node.right();
        }

        // Only reachable if the size counters were corrupted.
        Err(IndexOutOfBounds { index, len })
    }
}

impl<T, C: Comparator<T>, P: KeyPolicy> OrderTree<T, C, P> {
    /// Inserts `item`, returning whether it was added.
    ///
    /// In a [`Unique`] tree, nothing happens and `false` is returned if an element comparing
    /// equal is already present. In a [`Chained`] tree the element is always added, after any
    /// elements it collides with.
    pub fn add(&mut self, item: T) -> bool {
        let mut parent = None;
        let mut current = self.root;
        let mut went_left = false;

        while let Some(node) = current {
            match self.cmp.compare(&item, node.key()) {
                Ordering::Less => {
                    parent = current;
                    current = node.left();
                    went_left = true;
                },
                Ordering::Greater => {
                    parent = current;
                    current = node.right();
                    went_left = false;
                },
                Ordering::Equal if P::CHAINED => {
                    node.chain_mut().push(item);
                    grow_path(current);
                    return true;
                },
                Ordering::Equal => return false,
            }
        }

        let new = NodeRef::leaf(Chain::Single(item), parent);
        match parent {
            None => self.root = Some(new),
            Some(p) if went_left => p.set_left(Some(new)),
            Some(p) => p.set_right(Some(new)),
        }
        grow_path(parent);
        self.insert_fixup(new);
        true
    }

    /// Adds every element of `items`, returning whether any of them was added.
    pub fn add_all<I: IntoIterator<Item = T>>(&mut self, items: I) -> bool {
        items
            .into_iter()
            .fold(false, |changed, item| self.add(item) | changed)
    }

    /// Returns the `index`-th smallest element.
    pub fn get(&self, index: usize) -> Result<&T, IndexOutOfBounds> {
        let (node, offset) = self.seek(index)?;
        node.chain()
            .get(offset)
            .ok_or(IndexOutOfBounds { index, len: self.len() })
    }

    /// Removes and returns the `index`-th smallest element.
    pub fn remove_at(&mut self, index: usize) -> Result<T, IndexOutOfBounds> {
        let (node, offset) = self.seek(index)?;
        Ok(self.take_entry(node, offset))
    }

    /// Returns the greatest element comparing less than or equal to `target`. Among colliding
    /// elements, the most recently added one is returned.
    pub fn floor(&self, target: &T) -> Option<&T> {
        let mut best = None;
        let mut current = self.root;
        while let Some(node) = current {
            match self.cmp.compare(target, node.key()) {
                Ordering::Less => current = node.left(),
                Ordering::Equal => return Some(node.chain().last()),
                Ordering::Greater => {
                    best = current;
                    current = node.right();
                },
            }
        }
        best.map(|node| node.chain().last())
    }

    /// Returns the least element comparing greater than or equal to `target`. Among colliding
    /// elements, the first one added is returned.
    pub fn ceiling(&self, target: &T) -> Option<&T> {
        let mut best = None;
        let mut current = self.root;
        while let Some(node) = current {
            match self.cmp.compare(target, node.key()) {
                Ordering::Greater => current = node.right(),
                Ordering::Equal => return Some(node.key()),
                Ordering::Less => {
                    best = current;
                    current = node.left();
                },
            }
        }
        best.map(|node| node.key())
    }

    /// Returns the greatest element comparing strictly less than `target`.
    pub fn lower(&self, target: &T) -> Option<&T> {
        let mut best = None;
        let mut current = self.root;
        while let Some(node) = current {
            if self.cmp.compare(target, node.key()) == Ordering::Greater {
                best = current;
                current = node.right();
            } else {
                current = node.left();
            }
        }
        best.map(|node| node.chain().last())
    }

    /// Returns the least element comparing strictly greater than `target`.
    pub fn higher(&self, target: &T) -> Option<&T> {
        let mut best = None;
        let mut current = self.root;
        while let Some(node) = current {
            if self.cmp.compare(target, node.key()) == Ordering::Less {
                best = current;
                current = node.left();
            } else {
                current = node.right();
            }
        }
        best.map(|node| node.key())
    }

    /// Keeps only the elements for which `keep` returns `true`, returning whether anything was
    /// removed.
    ///
    /// Rather than removing elements one at a time, the tree is drained once and rebuilt in
    /// balanced form from the survivors, which costs `O(n)` besides the calls to `keep`.
    ///
    /// `keep` is called on every element, in order, before anything is moved, so a panic in
    /// `keep` leaves the tree unchanged.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, mut keep: F) -> bool {
        let verdicts: Vec<bool> = self.iter().map(|item| keep(item)).collect();
        if verdicts.iter().all(|kept| *kept) {
            return false;
        }

        let before = self.len();
        let mut verdicts = verdicts.into_iter();
        // Chains are drained in iteration order, the same order the verdicts were made in.
        let survivors: Vec<Chain<T>> = self
            .drain_chains()
            .into_iter()
            .filter_map(|chain| chain.retain(|_| verdicts.next().unwrap_or(true)))
            .collect();
        self.rebuild(survivors);

        let after = self.len();
        trace_log!(before = before, after = after, "rebuilt tree after retain");
        after != before
    }

    /// Removes every element that isn't contained in `set`, returning whether anything was
    /// removed.
    pub fn retain_all<S: Set<T>>(&mut self, set: &S) -> bool {
        self.retain(|item| set.contains(item))
    }

    fn find_node(&self, item: &T) -> Link<T> {
        let mut current = self.root;
        while let Some(node) = current {
            current = match self.cmp.compare(item, node.key()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return current,
            };
        }
        None
    }

    /// Checks every structural invariant of the tree: coloring, black height, size counters,
    /// ordering, parent links and chain shape.
    pub fn validate(&self) -> Result<(), super::InvariantViolation> {
        super::validate::validate(self)
    }
}

impl<T: Eq, C: Comparator<T>, P: KeyPolicy> OrderTree<T, C, P> {
    /// Returns whether an element equal to `item` is present. Elements that merely compare
    /// equal don't count.
    pub fn contains(&self, item: &T) -> bool {
        self.find_node(item)
            .is_some_and(|node| node.chain().position(item).is_some())
    }

    /// Removes the element equal to `item`, returning whether it was present.
    pub fn remove(&mut self, item: &T) -> bool {
        self.take(item).is_some()
    }

    /// Removes and returns the element equal to `item`.
    pub fn take(&mut self, item: &T) -> Option<T> {
        let node = self.find_node(item)?;
        let offset = node.chain().position(item)?;
        Some(self.take_entry(node, offset))
    }

    /// Removes every element of `items`, returning whether any of them was present.
    pub fn remove_all<'a, I>(&mut self, items: I) -> bool
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
    {
        items
            .into_iter()
            .fold(false, |changed, item| self.remove(item) | changed)
    }

    /// Returns the rank of the element equal to `item`: the number of elements before it in
    /// iteration order.
    pub fn index_of(&self, item: &T) -> Option<usize> {
        let mut rank = 0;
        let mut current = self.root;
        while let Some(node) = current {
            match self.cmp.compare(item, node.key()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    rank += node::size_of(node.left()) + node.chain().len();
                    current = node.right();
                },
                Ordering::Equal => {
                    return node
                        .chain()
                        .position(item)
                        .map(|offset| rank + node::size_of(node.left()) + offset);
                },
            }
        }
        None
    }
}

fn grow_path<T>(mut current: Link<T>) {
    while let Some(node) = current {
        node.set_size(node.size() + 1);
        current = node.parent();
    }
}

fn drain_into<T>(link: Link<T>, chains: &mut Vec<Chain<T>>) {
    if let Some(node) = link {
        let node = node.take_node();
        drain_into(node.left, chains);
        chains.push(node.chain);
        drain_into(node.right, chains);
    }
}

/// Builds a subtree of `count` nodes from the next `count` chains, consuming them in order.
fn build<T, I>(chains: &mut I, count: usize, depth: u32, red_depth: u32) -> Link<T>
where
    I: Iterator<Item = Chain<T>>,
{
    if count == 0 {
        return None;
    }

    let left_count = count / 2;
    let left = build(chains, left_count, depth + 1, red_depth);
    let Some(chain) = chains.next() else {
        node::free(left);
        return None;
    };
    let right = build(chains, count - left_count - 1, depth + 1, red_depth);

    let node = NodeRef::leaf(chain, None);
    node.set_color(if depth == red_depth { Color::Red } else { Color::Black });
    node.set_left(left);
    node.set_right(right);
    for child in [left, right].into_iter().flatten() {
        child.set_parent(Some(node));
    }
    node.update_size();
    Some(node)
}

impl<T, C, P> Drop for OrderTree<T, C, P> {
    fn drop(&mut self) {
        node::free(self.root.take());
    }
}

impl<T, C: Default, P> Default for OrderTree<T, C, P> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: Clone, C: Clone, P> Clone for OrderTree<T, C, P> {
    fn clone(&self) -> Self {
        let mut chains = Vec::new();
        let mut current = self.root.map(NodeRef::minimum);
        while let Some(node) = current {
            chains.push(node.chain().clone());
            current = node.next();
        }

        let mut tree = OrderTree::with_comparator(self.cmp.clone());
        tree.rebuild(chains);
        tree
    }
}

impl<T: PartialEq, C, P> PartialEq for OrderTree<T, C, P> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, C, P> Eq for OrderTree<T, C, P> {}

impl<T, C: Comparator<T>, P: KeyPolicy> Index<usize> for OrderTree<T, C, P> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index).throw()
    }
}

impl<T, C: Comparator<T>, P: KeyPolicy> Extend<T> for OrderTree<T, C, P> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

impl<T, C: Comparator<T> + Default, P: KeyPolicy> FromIterator<T> for OrderTree<T, C, P> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = OrderTree::with_comparator(C::default());
        tree.extend(iter);
        tree
    }
}

fn draw<T: Debug>(link: Link<T>) -> String {
    match link {
        Some(node) => format!(
            "{}\n({:?} {:?} #{})\n{}",
            draw(node.left())
                .lines()
                .map(|l| String::from("┌    ") + l)
                .collect::<Vec<_>>()
                .join("\n"),
            node.color(),
            node.chain().as_slice(),
            node.size(),
            draw(node.right())
                .lines()
                .map(|l| String::from("└    ") + l)
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        None => String::from("-"),
    }
}

impl<T: Debug, C, P> Debug for OrderTree<T, C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderTree")
            .field("nodes", &DebugRaw(format!("\n{}\n", draw(self.root))))
            .field("len", &self.len())
            .finish()
    }
}

impl<T: Display, C, P> Display for OrderTree<T, C, P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter()
                .map(|i| format!("{i}"))
                .collect::<Vec<String>>()
                .join(", ")
        )
    }
}
