#![warn(missing_docs)]
//! Crate-internal helpers shared by the collections and the lock registry.

#[cfg(test)]
pub mod alloc;
pub mod error;
pub mod fmt;
pub mod log;
pub mod option;
pub mod panic;
pub mod result;
