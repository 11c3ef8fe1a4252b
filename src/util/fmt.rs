use std::fmt::{self, Debug, Formatter};

/// Debug-prints a pre-rendered string verbatim, without quotes or escapes. Used for the tree
/// drawing in [`OrderTree`](crate::collections::order_tree::OrderTree)'s Debug output.
pub struct DebugRaw(pub String);

impl Debug for DebugRaw {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
