//! Persistent, append-only case chains.

use crate::case::Case;
use std::fmt;
use std::sync::Arc;

struct Link<R> {
    case: Case<R>,
    prev: Option<Arc<Link<R>>>,
}

/// An immutable ordered sequence of cases.
///
/// `push` returns a new chain that shares every existing link with the
/// original, so a partially built chain can be reused as a template.
/// Order of insertion is match priority.
pub struct CaseChain<R> {
    last: Option<Arc<Link<R>>>,
    len: usize,
}

impl<R> CaseChain<R> {
    pub fn new() -> Self {
        Self { last: None, len: 0 }
    }

    /// A new chain with `case` appended.
    pub fn push(&self, case: Case<R>) -> Self {
        Self {
            last: Some(Arc::new(Link {
                case,
                prev: self.last.clone(),
            })),
            len: self.len + 1,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cases in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Case<R>> {
        let mut cases = Vec::with_capacity(self.len);
        let mut link = self.last.as_deref();
        while let Some(l) = link {
            cases.push(&l.case);
            link = l.prev.as_deref();
        }
        cases.into_iter().rev()
    }
}

impl<R> Clone for CaseChain<R> {
    fn clone(&self) -> Self {
        Self {
            last: self.last.clone(),
            len: self.len,
        }
    }
}

impl<R> Default for CaseChain<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Drop for CaseChain<R> {
    // Unlink iteratively so long chains do not recurse on drop.
    fn drop(&mut self) {
        let mut link = self.last.take();
        while let Some(l) = link {
            match Arc::try_unwrap(l) {
                Ok(mut owned) => link = owned.prev.take(),
                Err(_) => break,
            }
        }
    }
}

impl<R> fmt::Debug for CaseChain<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
