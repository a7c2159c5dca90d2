use std::cell::Cell;

use rustc_hash::FxHashMap;

use crate::model::TreeModel;
use crate::path::TreePath;

/// Small mutable tree keyed by label, counting the child queries it answers.
pub(crate) struct TestTree {
    root: Option<&'static str>,
    children: FxHashMap<&'static str, Vec<&'static str>>,
    queries: Cell<usize>,
}

impl TestTree {
    pub(crate) fn new(root: &'static str) -> Self {
        Self {
            root: Some(root),
            children: FxHashMap::default(),
            queries: Cell::new(0),
        }
    }

    /// `R` with children `A` and `B`; `A` has `A1` and `A2`.
    pub(crate) fn sample() -> Self {
        let mut tree = Self::new("R");
        tree.set_children("R", &["A", "B"]);
        tree.set_children("A", &["A1", "A2"]);
        tree
    }

    pub(crate) fn set_children(&mut self, parent: &'static str, children: &[&'static str]) {
        self.children.insert(parent, children.to_vec());
    }

    pub(crate) fn insert_child(&mut self, parent: &'static str, index: usize, child: &'static str) {
        self.children.entry(parent).or_default().insert(index, child);
    }

    pub(crate) fn remove_child(&mut self, parent: &'static str, index: usize) -> &'static str {
        self.children
            .get_mut(parent)
            .map(|children| children.remove(index))
            .expect("parent has children")
    }

    pub(crate) fn replace_root(&mut self, root: &'static str) {
        self.root = Some(root);
    }

    /// Number of `child_count` and `child` calls answered so far.
    pub(crate) fn queries(&self) -> usize {
        self.queries.get()
    }

    fn list(&self, node: &&'static str) -> &[&'static str] {
        self.queries.set(self.queries.get() + 1);
        self.children.get(node).map_or(&[][..], Vec::as_slice)
    }
}

impl TreeModel for TestTree {
    type Node = &'static str;

    fn root(&self) -> Option<Self::Node> {
        self.root
    }

    fn child_count(&self, node: &Self::Node) -> usize {
        self.list(node).len()
    }

    fn child(&self, node: &Self::Node, index: usize) -> Option<Self::Node> {
        self.list(node).get(index).copied()
    }
}

pub(crate) fn path(components: &[&'static str]) -> TreePath<&'static str> {
    TreePath::from_components(components.iter().copied()).expect("non-empty path")
}
