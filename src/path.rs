use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{LayoutError, Result};

/// Immutable root-to-node path of model handles.
///
/// Paths share their prefix: `by_adding_child` allocates a single link pointing
/// at the parent path, so the many paths handed out for sibling rows cost one
/// allocation each. Cloning is a reference-count bump.
pub struct TreePath<N> {
    link: Arc<PathLink<N>>,
}

struct PathLink<N> {
    parent: Option<TreePath<N>>,
    last: N,
    count: usize,
}

impl<N> TreePath<N> {
    /// Creates a single-component path for a root node.
    pub fn root(node: N) -> Self {
        Self {
            link: Arc::new(PathLink {
                parent: None,
                last: node,
                count: 1,
            }),
        }
    }

    /// Builds a path from components ordered root first.
    pub fn from_components<I>(components: I) -> Result<Self>
    where
        I: IntoIterator<Item = N>,
    {
        let mut components = components.into_iter();
        let root = components.next().ok_or(LayoutError::EmptyPath)?;
        Ok(components.fold(Self::root(root), |path, node| path.by_adding_child(node)))
    }

    /// Returns a new path extending this one by `child`.
    #[must_use]
    pub fn by_adding_child(&self, child: N) -> Self {
        Self {
            link: Arc::new(PathLink {
                parent: Some(self.clone()),
                last: child,
                count: self.link.count + 1,
            }),
        }
    }

    /// Returns the path without its last component, or `None` for a root path.
    pub fn parent(&self) -> Option<&Self> {
        self.link.parent.as_ref()
    }

    /// Returns the last component.
    pub fn last(&self) -> &N {
        &self.link.last
    }

    /// Returns the first component.
    pub fn first(&self) -> &N {
        self.ancestors().last().map_or(&self.link.last, |path| &path.link.last)
    }

    /// Returns the number of components.
    pub fn path_count(&self) -> usize {
        self.link.count
    }

    /// Returns the component at `index` (root is index 0).
    pub fn component(&self, index: usize) -> Option<&N> {
        let steps = self.link.count.checked_sub(index + 1)?;
        self.ancestors().nth(steps).map(Self::last)
    }

    /// Returns all components ordered root first.
    pub fn components(&self) -> SmallVec<[&N; 8]> {
        let mut components: SmallVec<[&N; 8]> = self.ancestors().map(Self::last).collect();
        components.reverse();
        components
    }

    /// Iterates over this path and its ancestors, deepest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Self> {
        std::iter::successors(Some(self), |path| path.parent())
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.link, &other.link)
    }
}

impl<N: PartialEq> TreePath<N> {
    /// Returns `true` if this path equals `other` or passes through it.
    pub fn is_descendant_of(&self, other: &Self) -> bool {
        let Some(steps) = self.link.count.checked_sub(other.link.count) else {
            return false;
        };
        self.ancestors().nth(steps).is_some_and(|ancestor| ancestor == other)
    }
}

impl<N> Clone for TreePath<N> {
    fn clone(&self) -> Self {
        Self {
            link: Arc::clone(&self.link),
        }
    }
}

impl<N: PartialEq> PartialEq for TreePath<N> {
    fn eq(&self, other: &Self) -> bool {
        if self.link.count != other.link.count {
            return false;
        }
        let mut left = self;
        let mut right = other;
        loop {
            if left.ptr_eq(right) {
                return true;
            }
            if left.link.last != right.link.last {
                return false;
            }
            match (left.parent(), right.parent()) {
                (Some(l), Some(r)) => {
                    left = l;
                    right = r;
                }
                _ => return true,
            }
        }
    }
}

impl<N: Eq> Eq for TreePath<N> {}

impl<N: Hash> Hash for TreePath<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.link.count);
        for path in self.ancestors() {
            path.link.last.hash(state);
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for TreePath<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.components()).finish()
    }
}
