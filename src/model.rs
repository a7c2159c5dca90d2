use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::Arc;

use crate::geometry::Bounds;

/// Lazily queried tree contract consumed by the layout cache.
///
/// A proper tree is expected (not a DAG):
/// - no cycles;
/// - each node has exactly one parent;
/// - node handles are stable between notifications, and sibling handles are distinct.
///
/// The cache only asks for what it needs to materialize: the root, the child count
/// of a node it is about to show, and the children themselves.
pub trait TreeModel {
    /// Node handle type.
    type Node: Clone + Eq + Hash + Debug;

    /// Returns the root node (or `None` if the tree is empty).
    fn root(&self) -> Option<Self::Node>;
    /// Returns the number of children of `node`.
    fn child_count(&self, node: &Self::Node) -> usize;
    /// Returns the child at `index`, or `None` if the index is out of range.
    fn child(&self, node: &Self::Node, index: usize) -> Option<Self::Node>;
    /// Returns `true` if the node can never have children.
    fn is_leaf(&self, node: &Self::Node) -> bool {
        self.child_count(node) == 0
    }
    /// Returns the index of `child` under `parent`.
    fn index_of_child(&self, parent: &Self::Node, child: &Self::Node) -> Option<usize> {
        (0..self.child_count(parent))
            .find(|&index| self.child(parent, index).as_ref() == Some(child))
    }
}

macro_rules! forward_tree_model {
    ($($ty:ty),*) => {$(
        impl<T: TreeModel + ?Sized> TreeModel for $ty {
            type Node = T::Node;

            #[inline]
            fn root(&self) -> Option<Self::Node> {
                (**self).root()
            }

            #[inline]
            fn child_count(&self, node: &Self::Node) -> usize {
                (**self).child_count(node)
            }

            #[inline]
            fn child(&self, node: &Self::Node, index: usize) -> Option<Self::Node> {
                (**self).child(node, index)
            }

            #[inline]
            fn is_leaf(&self, node: &Self::Node) -> bool {
                (**self).is_leaf(node)
            }

            #[inline]
            fn index_of_child(&self, parent: &Self::Node, child: &Self::Node) -> Option<usize> {
                (**self).index_of_child(parent, child)
            }
        }
    )*};
}

forward_tree_model!(&T, Rc<T>, Arc<T>);

/// Geometry callback reporting the extent of a single row.
///
/// `row` is `None` only for a hidden root. `depth` is the number of ancestors of
/// the node (the root has depth 0). The `y` of the returned bounds is ignored: the
/// cache owns vertical placement.
pub trait NodeDimensions<N> {
    /// Returns the bounds of the row showing `node`, or `None` if it has no extent.
    fn dimensions(&self, node: &N, row: Option<usize>, depth: usize, expanded: bool)
    -> Option<Bounds>;
}

impl<N, F> NodeDimensions<N> for F
where
    F: Fn(&N, Option<usize>, usize, bool) -> Option<Bounds>,
{
    #[inline]
    fn dimensions(
        &self,
        node: &N,
        row: Option<usize>,
        depth: usize,
        expanded: bool,
    ) -> Option<Bounds> {
        self(node, row, depth, expanded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestTree;

    #[test]
    fn default_leaf_test_uses_child_count() {
        let tree = TestTree::sample();
        assert!(!tree.is_leaf(&"A"));
        assert!(tree.is_leaf(&"B"));
    }

    #[test]
    fn default_index_of_child_scans_children() {
        let tree = TestTree::sample();
        assert_eq!(tree.index_of_child(&"A", &"A2"), Some(1));
        assert_eq!(tree.index_of_child(&"A", &"B"), None);
    }

    #[test]
    fn shared_models_forward_every_query() {
        let tree = Rc::new(TestTree::sample());
        assert_eq!(tree.root(), Some("R"));
        assert_eq!(tree.child_count(&"R"), 2);
        assert_eq!(tree.child(&"R", 1), Some("B"));
    }

    #[test]
    fn closures_act_as_node_dimensions() {
        let dims = |_: &&str, _: Option<usize>, depth: usize, _: bool| {
            Some(Bounds::new(u32::try_from(depth).ok()? * 2, 0, 5, 1))
        };
        let bounds = dims.dimensions(&"A1", Some(2), 2, false);
        assert_eq!(bounds, Some(Bounds::new(4, 0, 5, 1)));
    }
}
