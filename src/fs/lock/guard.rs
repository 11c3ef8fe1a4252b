use std::fmt::{self, Debug, Formatter};

use crate::fs::lock::LockRegistry;
use crate::fs::path::LockPath;

/// Holds a path locked through [`LockRegistry::try_acquire`], unlocking it when dropped.
///
/// Since locks aren't reference counted, dropping the guard unlocks the path even if it was
/// locked again through [`LockRegistry::lock`] in the meantime.
#[must_use = "the path is unlocked as soon as the guard is dropped"]
pub struct PathLockGuard<'a> {
    pub(crate) registry: &'a LockRegistry,
    pub(crate) path: LockPath,
}

impl<'a> PathLockGuard<'a> {
    pub fn path(&self) -> &LockPath {
        &self.path
    }
}

impl<'a> Drop for PathLockGuard<'a> {
    fn drop(&mut self) {
        self.registry.unlock(&self.path);
    }
}

impl<'a> Debug for PathLockGuard<'a> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathLockGuard")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
