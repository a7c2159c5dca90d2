use crate::error::{LayoutError, Result};
use crate::path::TreePath;

/// Model-change notification delivered to the layout cache.
///
/// `path` addresses the parent whose children changed (or, with no child
/// indices, the node that changed itself). `child_indices` and `children` are
/// optional; when both are present they must have the same length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeModelEvent<N> {
    /// Path of the changed node or of the parent of the changed children.
    pub path: TreePath<N>,
    /// Indices of the affected children, in ascending order.
    pub child_indices: Vec<usize>,
    /// Handles of the affected children, parallel to `child_indices`.
    pub children: Vec<N>,
}

impl<N> TreeModelEvent<N> {
    /// Creates an event that addresses `path` itself.
    pub const fn new(path: TreePath<N>) -> Self {
        Self {
            path,
            child_indices: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an event for children of `path` at the given indices.
    pub fn with_indices(path: TreePath<N>, child_indices: impl Into<Vec<usize>>) -> Self {
        Self {
            path,
            child_indices: child_indices.into(),
            children: Vec::new(),
        }
    }

    /// Creates an event for children of `path`, naming both indices and handles.
    pub fn with_children(
        path: TreePath<N>,
        child_indices: impl Into<Vec<usize>>,
        children: impl Into<Vec<N>>,
    ) -> Self {
        Self {
            path,
            child_indices: child_indices.into(),
            children: children.into(),
        }
    }

    /// Returns `true` if the event names no particular children.
    pub fn is_node_event(&self) -> bool {
        self.child_indices.is_empty() && self.children.is_empty()
    }

    pub(crate) fn check(&self) -> Result<()> {
        if !self.child_indices.is_empty()
            && !self.children.is_empty()
            && self.child_indices.len() != self.children.len()
        {
            return Err(LayoutError::MismatchedEvent {
                indices: self.child_indices.len(),
                children: self.children.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_event_has_no_children() {
        let event = TreeModelEvent::new(TreePath::root("R"));
        assert!(event.is_node_event());
        assert!(event.check().is_ok());
    }

    #[test]
    fn parallel_arrays_must_match() {
        let path = TreePath::root("R");
        let ok = TreeModelEvent::with_children(path.clone(), [0, 1], ["A", "B"]);
        assert!(ok.check().is_ok());

        let bad = TreeModelEvent::with_children(path, [0, 1], ["A"]);
        assert_eq!(
            bad.check(),
            Err(LayoutError::MismatchedEvent {
                indices: 2,
                children: 1
            })
        );
    }

    #[test]
    fn indices_alone_are_accepted() {
        let event = TreeModelEvent::with_indices(TreePath::root("R"), vec![3]);
        assert!(!event.is_node_event());
        assert!(event.check().is_ok());
    }
}
