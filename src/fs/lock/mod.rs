//! Hierarchical, advisory path locks.

mod error;
mod guard;
mod registry;

pub use error::*;
pub use guard::*;
pub use registry::*;
