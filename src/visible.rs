use std::fmt::Debug;
use std::hash::Hash;
use std::iter::FusedIterator;

use crate::path::TreePath;
use crate::shadow::{ShadowTree, Slot};

/// Display-order iterator over shown paths, produced by
/// [`TreeLayoutCache::visible_paths_from`](crate::TreeLayoutCache::visible_paths_from).
///
/// Borrows the cache, so the tree cannot change while the iterator is alive.
pub struct VisiblePaths<'a, N> {
    tree: &'a ShadowTree<N>,
    next: Option<Slot>,
}

impl<'a, N> VisiblePaths<'a, N> {
    pub(crate) const fn new(tree: &'a ShadowTree<N>, start: Option<Slot>) -> Self {
        Self { tree, next: start }
    }
}

impl<N: Clone + Eq + Hash + Debug> Iterator for VisiblePaths<'_, N> {
    type Item = TreePath<N>;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.next.take()?;
        let path = self.tree.slot_path(slot)?;
        self.next = self.tree.next_slot(slot);
        Some(path)
    }
}

impl<N: Clone + Eq + Hash + Debug> FusedIterator for VisiblePaths<'_, N> {}
