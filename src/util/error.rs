use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Returned by positional access when `index` is not below the number of elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfBounds {
    /// The rejected index.
    pub index: usize,
    /// The number of elements at the time of the access.
    pub len: usize,
}

impl Display for IndexOutOfBounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Index {} out of bounds for tree with {} elements!", self.index, self.len)
    }
}

impl Error for IndexOutOfBounds {}
