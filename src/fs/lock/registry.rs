use crate::collections::order_tree::{ConcurrentOrderTree, OrderTree};
use crate::fs::lock::{
    AlreadyLockedError, AncestorLockedError, DescendantLockedError, LockConflict, PathLockGuard,
};
use crate::fs::path::LockPath;
use crate::util::log::debug_log;

/// Advisory bookkeeping of locked paths, where locking a path also covers everything below it.
///
/// Locks aren't reference counted and never block: `lock` on a locked path and `unlock` on an
/// unlocked one both succeed without effect. The registry only records which paths are locked;
/// callers decide what to do with that.
///
/// All methods take `&self` and may be called from any number of threads. Each call holds the
/// registry's internal lock for its whole duration, so a query never misses a `lock` or `unlock`
/// that completed before it started.
///
/// # Time Complexity
/// For this analysis of time complexity, variables are defined as follows:
/// - `n`: The number of locked paths.
/// - `d`: The depth of the path in question.
///
/// | Method | Complexity |
/// |-|-|
/// | `lock` | `O(d log n)` |
/// | `unlock` | `O(d log n)` |
/// | `is_locked` | `O(d log n)` worst case, `O(d + log n)` typical |
/// | `has_locked_descendant` | `O(d log n)` |
pub struct LockRegistry {
    pub(crate) locked: ConcurrentOrderTree<LockPath>,
}

impl LockRegistry {
    pub const fn new() -> LockRegistry {
        LockRegistry {
            locked: ConcurrentOrderTree::new(),
        }
    }

    /// Locks `path`, returning whether it wasn't already locked itself. A path that was only
    /// covered by a locked ancestor is still recorded.
    pub fn lock<P: Into<LockPath>>(&self, path: P) -> bool {
        let path = path.into();
        debug_log!(path = %path, "locking path");
        self.locked.add(path)
    }

    /// Unlocks `path`, returning whether it was locked itself. Locks on its ancestors or
    /// descendants are unaffected.
    pub fn unlock<P: Into<LockPath>>(&self, path: P) -> bool {
        let path = path.into();
        debug_log!(path = %path, "unlocking path");
        self.locked.remove(&path)
    }

    /// Returns whether `path` or any of its ancestors is locked.
    pub fn is_locked<P: Into<LockPath>>(&self, path: P) -> bool {
        let path = path.into();
        covering_lock(&self.locked.read(), &path).is_some()
    }

    /// Returns the lock covering `path`: `path` itself if it is locked, otherwise its nearest
    /// locked ancestor.
    pub fn holder<P: Into<LockPath>>(&self, path: P) -> Option<LockPath> {
        let path = path.into();
        covering_lock(&self.locked.read(), &path).cloned()
    }

    /// Returns whether any path strictly below `path` is locked.
    pub fn has_locked_descendant<P: Into<LockPath>>(&self, path: P) -> bool {
        let path = path.into();
        locked_descendant(&self.locked.read(), &path).is_some()
    }

    /// Locks `path` only if doing so doesn't overlap any existing lock: neither `path`, nor any
    /// of its ancestors or descendants may already be locked. The returned guard unlocks `path`
    /// when dropped.
    pub fn try_acquire<P: Into<LockPath>>(&self, path: P) -> Result<PathLockGuard<'_>, LockConflict> {
        let path = path.into();
        let mut tree = self.locked.write();

        if let Some(holder) = covering_lock(&tree, &path) {
            let conflict = if *holder == path {
                LockConflict::from(AlreadyLockedError { path })
            } else {
                LockConflict::from(AncestorLockedError {
                    holder: holder.clone(),
                    path,
                })
            };
            return Err(conflict);
        }
        if let Some(holder) = locked_descendant(&tree, &path) {
            return Err(LockConflict::from(DescendantLockedError {
                holder: holder.clone(),
                path,
            }));
        }

        debug_log!(path = %path, "acquired path lock");
        tree.add(path.clone());
        Ok(PathLockGuard {
            registry: self,
            path,
        })
    }

    /// Every locked path, in ascending order.
    pub fn locked_paths(&self) -> Vec<LockPath> {
        self.locked.to_vec()
    }

    /// The number of locked paths, not counting the paths they cover.
    pub fn len(&self) -> usize {
        self.locked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locked.is_empty()
    }

    /// Unlocks every path.
    pub fn clear(&self) {
        self.locked.clear()
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds the locked entry equal to or above `path`.
///
/// Let `floor` be the greatest entry not after the target. Every ancestor of the target sorts
/// between it and the target, so if `floor` isn't an ancestor itself, any locked ancestor must
/// also be an ancestor of `floor`, and thus of the common prefix of `floor` and the target. That
/// prefix is strictly shallower than the target, so the search moves up at least one level per
/// round and usually finishes in the first.
fn covering_lock<'a>(tree: &'a OrderTree<LockPath>, path: &LockPath) -> Option<&'a LockPath> {
    let mut target = path.clone();
    loop {
        let floor = tree.floor(&target)?;
        if path.starts_with(floor) {
            return Some(floor);
        }
        target = floor.common_prefix(&target);
    }
}

/// Finds a locked entry strictly below `path`. Descendants sort directly after their ancestor,
/// so only the next entry needs checking.
fn locked_descendant<'a>(tree: &'a OrderTree<LockPath>, path: &LockPath) -> Option<&'a LockPath> {
    tree.higher(path).filter(|entry| path.is_ancestor_of(entry))
}
