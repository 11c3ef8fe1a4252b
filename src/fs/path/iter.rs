use std::iter::FusedIterator;

/// Iterates over the segments of a [`LockPath`](super::LockPath), from the root down.
#[derive(Debug, Clone)]
pub struct Components<'a> {
    pub(crate) rest: &'a str,
}

impl<'a> Iterator for Components<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            None?
        }
        match self.rest.split_once('/') {
            Some((segment, rest)) => {
                self.rest = rest;
                Some(segment)
            },
            None => Some(std::mem::take(&mut self.rest)),
        }
    }
}

impl<'a> FusedIterator for Components<'a> {}

/// Iterates over every ancestor of a [`LockPath`](super::LockPath) in normalized form, starting
/// with the root (`""`) and ending with the path itself.
#[derive(Debug, Clone)]
pub struct Ancestors<'a> {
    pub(crate) path: &'a str,
    pub(crate) index: Option<usize>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index?;
        let ancestor = &self.path[..index];

        self.index = if index >= self.path.len() {
            None
        } else {
            // Skip the separator that ended the previous ancestor, the root has none.
            let start = if index == 0 { 0 } else { index + 1 };
            Some(
                self.path[start..]
                    .find('/')
                    .map_or(self.path.len(), |offset| start + offset),
            )
        };

        Some(ancestor)
    }
}

impl<'a> FusedIterator for Ancestors<'a> {}
