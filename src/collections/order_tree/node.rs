use std::mem;
use std::ptr::NonNull;
use std::slice;

pub(crate) type Link<T> = Option<NodeRef<T>>;

// NOTE: Nodes are allocated through Box so that a removed node can be moved back out of the heap
// with take_node. Child links own the node they point at, parent links never do.

#[derive(Debug)]
pub(crate) struct NodeRef<T>(pub NonNull<Node<T>>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Color {
    Red,
    Black,
}

pub(crate) struct Node<T> {
    pub chain: Chain<T>,
    pub color: Color,
    /// Number of entries in this subtree, counting every entry of every chain.
    pub size: usize,
    pub parent: Link<T>,
    pub left: Link<T>,
    pub right: Link<T>,
}

/// The entries held by one node. All of them compare equal under the tree's comparator, in
/// insertion order. Never empty while the node exists.
#[derive(Debug, Clone)]
pub(crate) enum Chain<T> {
    Single(T),
    Many(Vec<T>),
}

impl<T> Chain<T> {
    pub fn len(&self) -> usize {
        match self {
            Chain::Single(_) => 1,
            Chain::Many(entries) => entries.len(),
        }
    }

    /// The entry the comparator is applied to when descending.
    pub fn key(&self) -> &T {
        match self {
            Chain::Single(entry) => entry,
            // Many is only ever built from at least two entries and collapses back to Single.
            Chain::Many(entries) => &entries[0],
        }
    }

    pub fn as_slice(&self) -> &[T] {
        match self {
            Chain::Single(entry) => slice::from_ref(entry),
            Chain::Many(entries) => entries,
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    pub fn last(&self) -> &T {
        match self {
            Chain::Single(entry) => entry,
            Chain::Many(entries) => &entries[entries.len() - 1],
        }
    }

    pub fn position(&self, item: &T) -> Option<usize>
    where
        T: Eq,
    {
        self.as_slice().iter().position(|entry| entry == item)
    }

    pub fn push(&mut self, item: T) {
        match self {
            Chain::Single(_) => {
                if let Chain::Single(first) = mem::replace(self, Chain::Many(Vec::new())) {
                    *self = Chain::Many(vec![first, item]);
                }
            },
            Chain::Many(entries) => entries.push(item),
        }
    }

    /// Removes the entry at `index` from a chain of at least two entries, keeping the rest in
    /// insertion order.
    pub fn remove(&mut self, index: usize) -> T {
        match self {
            Chain::Single(_) => panic!("cannot remove the only entry of a chain"),
            Chain::Many(entries) => {
                let removed = entries.remove(index);
                if entries.len() == 1
                    && let Some(last) = entries.pop()
                {
                    *self = Chain::Single(last);
                }
                removed
            },
        }
    }

    /// Keeps the entries matching `keep`, returning `None` if none survive.
    pub fn retain<F: FnMut(&T) -> bool>(self, mut keep: F) -> Option<Chain<T>> {
        match self {
            Chain::Single(entry) => keep(&entry).then_some(Chain::Single(entry)),
            Chain::Many(mut entries) => {
                entries.retain(|e| keep(e));
                match entries.len() {
                    0 => None,
                    1 => entries.pop().map(Chain::Single),
                    _ => Some(Chain::Many(entries)),
                }
            },
        }
    }

    /// Unwraps a chain known to hold a single entry.
    pub fn into_only(self) -> T {
        match self {
            Chain::Single(entry) => entry,
            Chain::Many(_) => unreachable!("chains of several entries are never unlinked whole"),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Chain::Single(entry) => vec![entry],
            Chain::Many(entries) => entries,
        }
    }
}

impl<T> NodeRef<T> {
    pub fn from_node(node: Node<T>) -> NodeRef<T> {
        NodeRef(NonNull::from(Box::leak(Box::new(node))))
    }

    pub fn leaf(chain: Chain<T>, parent: Link<T>) -> NodeRef<T> {
        let size = chain.len();
        NodeRef::from_node(Node {
            chain,
            color: Color::Red,
            size,
            parent,
            left: None,
            right: None,
        })
    }

    /// Frees the allocation, handing back its contents. Links held by the returned node are left
    /// dangling from the caller's point of view and must already have been re-homed.
    pub fn take_node(self) -> Node<T> {
        // SAFETY: Every NodeRef is created by from_node and freed exactly once, either here or
        // while dropping the tree that owns it.
        unsafe { *Box::from_raw(self.0.as_ptr()) }
    }

    // All accessors below go through the raw pointer so that no long-lived reference to a node
    // exists while a neighbour is being relinked. The tree is only ever mutated through &mut, so
    // no other thread can observe these writes.

    pub fn chain<'a>(&self) -> &'a Chain<T> {
        // SAFETY: The node is live for as long as the tree it belongs to is borrowed.
        unsafe { &(*self.0.as_ptr()).chain }
    }

    #[allow(clippy::mut_from_ref)]
    pub fn chain_mut<'a>(&self) -> &'a mut Chain<T> {
        // SAFETY: Only called while the owning tree is mutably borrowed.
        unsafe { &mut (*self.0.as_ptr()).chain }
    }

    pub fn key<'a>(&self) -> &'a T {
        self.chain().key()
    }

    pub fn color(&self) -> Color {
        // SAFETY: See chain.
        unsafe { (*self.0.as_ptr()).color }
    }

    pub fn set_color(&self, color: Color) {
        // SAFETY: See chain_mut.
        unsafe { (*self.0.as_ptr()).color = color }
    }

    pub fn is_red(&self) -> bool {
        self.color() == Color::Red
    }

    pub fn size(&self) -> usize {
        // SAFETY: See chain.
        unsafe { (*self.0.as_ptr()).size }
    }

    pub fn set_size(&self, size: usize) {
        // SAFETY: See chain_mut.
        unsafe { (*self.0.as_ptr()).size = size }
    }

    /// Recomputes this node's counter from its chain and its children's counters.
    pub fn update_size(&self) {
        self.set_size(self.chain().len() + size_of(self.left()) + size_of(self.right()));
    }

    pub fn parent(&self) -> Link<T> {
        // SAFETY: See chain.
        unsafe { (*self.0.as_ptr()).parent }
    }

    pub fn set_parent(&self, parent: Link<T>) {
        // SAFETY: See chain_mut.
        unsafe { (*self.0.as_ptr()).parent = parent }
    }

    pub fn left(&self) -> Link<T> {
        // SAFETY: See chain.
        unsafe { (*self.0.as_ptr()).left }
    }

    pub fn set_left(&self, left: Link<T>) {
        // SAFETY: See chain_mut.
        unsafe { (*self.0.as_ptr()).left = left }
    }

    pub fn right(&self) -> Link<T> {
        // SAFETY: See chain.
        unsafe { (*self.0.as_ptr()).right }
    }

    pub fn set_right(&self, right: Link<T>) {
        // SAFETY: See chain_mut.
        unsafe { (*self.0.as_ptr()).right = right }
    }

    /// Leftmost node of the subtree rooted here.
    pub fn minimum(self) -> NodeRef<T> {
        let mut node = self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    /// Rightmost node of the subtree rooted here.
    pub fn maximum(self) -> NodeRef<T> {
        let mut node = self;
        while let Some(right) = node.right() {
            node = right;
        }
        node
    }

    /// In-order successor, found through the parent links.
    pub fn next(self) -> Link<T> {
        if let Some(right) = self.right() {
            return Some(right.minimum());
        }
        let mut child = self;
        let mut parent = self.parent();
        while let Some(node) = parent
            && node.right() == Some(child)
        {
            child = node;
            parent = node.parent();
        }
        parent
    }

    /// In-order predecessor, found through the parent links.
    pub fn prev(self) -> Link<T> {
        if let Some(left) = self.left() {
            return Some(left.maximum());
        }
        let mut child = self;
        let mut parent = self.parent();
        while let Some(node) = parent
            && node.left() == Some(child)
        {
            child = node;
            parent = node.parent();
        }
        parent
    }
}

impl<T> Clone for NodeRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeRef<T> {}

impl<T> PartialEq for NodeRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for NodeRef<T> {}

pub(crate) fn size_of<T>(link: Link<T>) -> usize {
    link.map_or(0, |node| node.size())
}

/// Absent children are black.
pub(crate) fn is_red<T>(link: Link<T>) -> bool {
    link.is_some_and(|node| node.is_red())
}

/// Frees every node of the subtree, children before parents.
pub(crate) fn free<T>(link: Link<T>) {
    if let Some(node) = link {
        // Depth is bounded by twice the black height, so recursion stays shallow.
        free(node.left());
        free(node.right());
        drop(node.take_node());
    }
}
