//! Filesystem-style path locking.
//!
//! [`path::LockPath`] is a normalized `/`-delimited path that knows its ancestors, and
//! [`lock::LockRegistry`] records which paths are locked, treating a lock on a directory as a
//! lock on everything below it. Nothing here touches an actual filesystem.

pub mod lock;
pub mod path;
