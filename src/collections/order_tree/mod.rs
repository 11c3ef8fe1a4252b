//! An order-statistic red-black tree, optionally tolerating colliding keys.

mod comparator;
#[cfg(feature = "concurrent")]
mod concurrent;
mod iter;
mod node;
mod order_tree;
mod policy;
mod tests;
mod validate;

pub use comparator::*;
#[cfg(feature = "concurrent")]
pub use concurrent::*;
pub use iter::*;
pub use order_tree::*;
pub use policy::{Chained, KeyPolicy, Unique};
pub use validate::InvariantViolation;
pub use crate::util::error::IndexOutOfBounds;
