//! An order-statistic red-black tree, and the hierarchical path-lock registry built on top of it.
//!
//! # Purpose
//! [`OrderTree`](collections::order_tree::OrderTree) is a balanced search tree where every node
//! also counts the elements below it, so that besides the usual insert / remove / lookup it can
//! answer "what is the `k`-th smallest element" and "where does this element rank" in `O(log n)`.
//! It optionally tolerates key collisions: elements that compare equal but aren't equal are kept
//! side by side instead of replacing each other.
//!
//! [`LockRegistry`](fs::lock::LockRegistry) uses the tree to track which
//! [`LockPath`](fs::path::LockPath)s are locked. Locking a path covers everything below it, so
//! `/a/b` being locked means `/a/b/c` is locked too, while `/a/bx` and `/a` aren't.
//!
//! # Method
//! The tree is written from scratch with raw parent links rather than on top of
//! [`BTreeMap`](std::collections::BTreeMap), because the size counters and the parent links both
//! need to be maintained through every rotation. Child links own their nodes, parent links never
//! do; nodes are freed through the child links only.
//!
//! # Error Handling
//! Expected outcomes, like adding an element that's already present or unlocking a path that
//! isn't locked, are reported as `bool`s. Errors are reserved for caller mistakes, like an index
//! past the end of the tree, and are strongly typed: small structs implementing
//! [`Error`](std::error::Error), combined into enums where a method can fail in more than one way.
//! Indexing with `[]` panics with the error's message instead.
//!
//! # Concurrency
//! [`OrderTree`](collections::order_tree::OrderTree) is a plain single-owner structure.
//! [`ConcurrentOrderTree`](collections::order_tree::ConcurrentOrderTree) and the lock registry
//! wrap it in a reader-writer lock, so that mutations are exclusive and every read sees a
//! consistent tree.
//!
//! # Features
//! - `order-tree`: the tree itself.
//! - `concurrent`: the lock-protected tree, using `parking_lot`.
//! - `path-lock`: paths and the lock registry.
//! - `tracing`: debug and trace events through `tracing`.
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::undocumented_unsafe_blocks)]
#![warn(clippy::missing_const_for_fn)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![allow(clippy::module_inception)]

#[cfg(feature = "order-tree")]
pub mod collections;
#[cfg(feature = "path-lock")]
pub mod fs;

pub(crate) mod util;
