pub(crate) mod sealed {
    pub trait Sealed {}
}

/// Decides what [`OrderTree::add`](super::OrderTree::add) does with an element that compares
/// equal to one already present.
pub trait KeyPolicy: sealed::Sealed {
    /// Whether colliding elements are appended to the existing node's chain.
    const CHAINED: bool;
}

/// Colliding elements are rejected: the tree behaves as an ordered set.
#[derive(Debug, Clone, Copy)]
pub enum Unique {}

/// Colliding elements are kept side by side, in insertion order, in the node of their key.
#[derive(Debug, Clone, Copy)]
pub enum Chained {}

impl sealed::Sealed for Unique {}
impl sealed::Sealed for Chained {}

impl KeyPolicy for Unique {
    const CHAINED: bool = false;
}

impl KeyPolicy for Chained {
    const CHAINED: bool = true;
}
