use derive_more::{Display, Error, From, IsVariant};

use crate::fs::path::LockPath;

#[derive(Debug, Display, Error)]
#[display("{path} is already locked")]
pub struct AlreadyLockedError {
    pub path: LockPath,
}

#[derive(Debug, Display, Error)]
#[display("{path} is covered by the lock on {holder}")]
pub struct AncestorLockedError {
    pub path: LockPath,
    pub holder: LockPath,
}

#[derive(Debug, Display, Error)]
#[display("{path} contains the locked path {holder}")]
pub struct DescendantLockedError {
    pub path: LockPath,
    pub holder: LockPath,
}

/// Why [`LockRegistry::try_acquire`](super::LockRegistry::try_acquire) refused a path.
#[derive(Debug, Display, Error, From, IsVariant)]
pub enum LockConflict {
    AlreadyLocked(AlreadyLockedError),
    AncestorLocked(AncestorLockedError),
    DescendantLocked(DescendantLockedError),
}
