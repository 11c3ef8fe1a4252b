//! General-purpose ordered collection types.
//!
//! # Purpose
//! [`OrderTree`](order_tree::OrderTree) is a balanced search tree that also answers "what is the
//! `k`-th smallest element" and "how many elements come before this one" in logarithmic time. It
//! backs the lock registry in [`fs::lock`](crate::fs::lock), but is usable on its own as an
//! ordered set or, with the [`Chained`](order_tree::Chained) policy, an ordered multiset whose
//! colliding elements stay distinguishable.

pub mod order_tree;
pub mod traits;
