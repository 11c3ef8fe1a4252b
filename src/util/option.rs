use std::hint;

pub(crate) trait OptionExtension<T> {
    /// Unwraps a link that the red-black invariants guarantee to be present, e.g. the grandparent
    /// of a red parent or the sibling of a doubly black node.
    ///
    /// Hits [`unreachable!`] in debug builds and [`unreachable_unchecked`](hint::unreachable_unchecked)
    /// in release builds.
    unsafe fn unreachable(self) -> T;
}

impl<T> OptionExtension<T> for Option<T> {
    unsafe fn unreachable(self) -> T {
        match self {
            Some(val) => val,
            None if cfg!(debug_assertions) => unreachable!(),
            // SAFETY: The caller guarantees that None is impossible.
            None => unsafe { hint::unreachable_unchecked() },
        }
    }
}
