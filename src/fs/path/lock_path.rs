use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt::{self, Debug, Display, Formatter};
use std::str::FromStr;

use super::{Ancestors, Components, validity};

/// A normalized hierarchical path, used as the key of a [`LockRegistry`](crate::fs::lock::LockRegistry).
///
/// Equality and ordering are defined over the sequence of segments rather than over the raw
/// string, so `"some/file"`, `"/some/file"` and `"some/file/"` are all the same path, and
/// `"some/filex"` is not a descendant of `"some/file"`. Ordering is lexicographic over segments,
/// which places every descendant of a path directly after it.
///
/// # Invariants
/// - The string contains no leading or trailing '/'.
/// - The string contains no repeated '/' characters or "." segments.
/// - The string contains no \0.
/// - The root path is the empty string.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct LockPath {
    pub(crate) inner: String,
}

impl LockPath {
    pub fn new(path: &str) -> LockPath {
        LockPath {
            inner: validity::sanitize(path),
        }
    }

    /// The root path, an ancestor of every other path.
    pub const fn root() -> LockPath {
        LockPath {
            inner: String::new(),
        }
    }

    pub const fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    /// The normalized form, without a leading '/'.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn components(&self) -> Components<'_> {
        Components {
            rest: &self.inner,
        }
    }

    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors {
            path: &self.inner,
            index: Some(0),
        }
    }

    /// The number of segments; `0` for the root.
    pub fn depth(&self) -> usize {
        self.components().count()
    }

    pub fn parent(&self) -> Option<LockPath> {
        if self.is_root() {
            None?
        }
        let parent = self.inner.rsplit_once('/').map_or("", |(parent, _)| parent);
        Some(LockPath {
            inner: parent.to_owned(),
        })
    }

    /// Appends the segments of `child`, which is normalized first.
    pub fn join(&self, child: &str) -> LockPath {
        let child = validity::sanitize(child);
        let inner = match (self.is_root(), child.is_empty()) {
            (_, true) => self.inner.clone(),
            (true, false) => child,
            (false, false) => format!("{}/{}", self.inner, child),
        };
        LockPath { inner }
    }

    /// Returns whether `ancestor` is this path or one of its ancestors.
    pub fn starts_with(&self, ancestor: &LockPath) -> bool {
        ancestor.is_root()
            || self
                .inner
                .strip_prefix(&ancestor.inner)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Returns whether `descendant` lies strictly below this path.
    pub fn is_ancestor_of(&self, descendant: &LockPath) -> bool {
        self.inner.len() < descendant.inner.len() && descendant.starts_with(self)
    }

    /// The deepest path that is an ancestor of (or equal to) both paths.
    pub fn common_prefix(&self, other: &LockPath) -> LockPath {
        let mut len = 0;
        for (ours, theirs) in self.components().zip(other.components()) {
            if ours != theirs {
                break;
            }
            // The separator before every segment but the first.
            len += ours.len() + usize::from(len != 0);
        }
        LockPath {
            inner: self.inner[..len].to_owned(),
        }
    }
}

impl Ord for LockPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components().cmp(other.components())
    }
}

impl PartialOrd for LockPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<&str> for LockPath {
    fn from(value: &str) -> Self {
        LockPath::new(value)
    }
}

impl From<String> for LockPath {
    fn from(value: String) -> Self {
        if validity::is_sanitized(&value) {
            LockPath { inner: value }
        } else {
            LockPath::new(&value)
        }
    }
}

impl From<&String> for LockPath {
    fn from(value: &String) -> Self {
        LockPath::new(value)
    }
}

impl From<&LockPath> for LockPath {
    fn from(value: &LockPath) -> Self {
        value.clone()
    }
}

impl FromStr for LockPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(LockPath::new(s))
    }
}

impl AsRef<str> for LockPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Display for LockPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.inner)
    }
}

impl Debug for LockPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LockPath").field(&format_args!("{self}")).finish()
    }
}
