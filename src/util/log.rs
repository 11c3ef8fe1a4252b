//! Logging macros that forward to `tracing` when the `tracing` feature is enabled and expand to
//! nothing otherwise.
//!
//! ```bash
//! RUST_LOG=path_lock_tree=debug cargo test --features tracing
//! ```

#![allow(unused_macros, unused_imports)]

/// Trace-level event, for per-node detail such as bulk rebuilds.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        ::tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug-level event, for state transitions such as a path being locked.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use trace_log;
