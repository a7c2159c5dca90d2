use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::{FxBuildHasher, FxHashMap};
use slotmap::SlotMap;
use tracing::trace;

use crate::error::{LayoutError, Result};
use crate::geometry::{Bounds, LayoutContext};
use crate::model::TreeModel;
use crate::node::{NodeHeights, NodeKey, StateNode};
use crate::path::TreePath;

/// Position of a display row inside the shadow tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    /// A materialized node.
    Node(NodeKey),
    /// A model child of a materialized node that has no state node of its own.
    Child { parent: NodeKey, index: usize },
}

/// Arena of materialized state nodes mirroring the visited part of the model.
pub(crate) struct ShadowTree<N> {
    nodes: SlotMap<NodeKey, StateNode<N>>,
    root: Option<NodeKey>,
}

impl<N: Clone + Eq + Hash + Debug> ShadowTree<N> {
    pub(crate) fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Drops every state node and recreates the root from the model.
    pub(crate) fn reset<M: TreeModel<Node = N>>(&mut self, model: &M) {
        self.clear();
        if let Some(handle) = model.root() {
            let mut root = StateNode::new(TreePath::root(handle), None, 0);
            root.expanded = !model.is_leaf(root.handle());
            self.root = Some(self.nodes.insert(root));
        }
    }

    pub(crate) const fn root(&self) -> Option<NodeKey> {
        self.root
    }

    pub(crate) fn node(&self, key: NodeKey) -> &StateNode<N> {
        &self.nodes[key]
    }

    /// Number of materialized nodes.
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    // ---- model children -------------------------------------------------

    pub(crate) fn model_child_count<M: TreeModel<Node = N>>(
        &mut self,
        key: NodeKey,
        model: &M,
    ) -> usize {
        self.load_model_children(key, model);
        self.nodes[key].loaded_child_count()
    }

    pub(crate) fn model_child_at<M: TreeModel<Node = N>>(
        &mut self,
        key: NodeKey,
        model: &M,
        index: usize,
    ) -> Option<&N> {
        self.load_model_children(key, model);
        self.nodes[key].model_children.as_ref()?.get(index)
    }

    pub(crate) fn model_index_of_child<M: TreeModel<Node = N>>(
        &mut self,
        key: NodeKey,
        model: &M,
        handle: &N,
    ) -> Option<usize> {
        self.load_model_children(key, model);
        self.nodes[key]
            .model_children
            .as_ref()?
            .iter()
            .position(|child| child == handle)
    }

    /// Returns the cached handles at `indices`, checking each against the cached length.
    ///
    /// Yields an empty list when the children were never loaded.
    pub(crate) fn cached_children_at(&self, key: NodeKey, indices: &[usize]) -> Result<Vec<N>> {
        let Some(children) = self.nodes[key].model_children.as_ref() else {
            return Ok(Vec::new());
        };
        indices
            .iter()
            .map(|&index| {
                children
                    .get(index)
                    .cloned()
                    .ok_or(LayoutError::ChildIndexOutOfRange {
                        index,
                        len: children.len(),
                    })
            })
            .collect()
    }

    fn load_model_children<M: TreeModel<Node = N>>(&mut self, key: NodeKey, model: &M) {
        if self.nodes[key].model_children.is_some() {
            return;
        }
        let handle = self.nodes[key].handle().clone();
        let count = model.child_count(&handle);
        let children: Vec<N> = (0..count)
            .filter_map(|index| model.child(&handle, index))
            .collect();
        self.reconcile_children(key, &children);
        self.nodes[key].model_children = Some(children);
    }

    // Re-reads model indices of materialized children; children the model no longer
    // has are dropped.
    fn reconcile_children(&mut self, key: NodeKey, model_children: &[N]) {
        if self.nodes[key].children.is_empty() {
            return;
        }
        let mut positions: FxHashMap<&N, usize> =
            FxHashMap::with_capacity_and_hasher(model_children.len(), FxBuildHasher);
        for (index, child) in model_children.iter().enumerate() {
            positions.entry(child).or_insert(index);
        }

        let previous = std::mem::take(&mut self.nodes[key].children);
        let mut kept = Vec::with_capacity(previous.len());
        for child in previous {
            let found = positions.get(self.nodes[child].handle()).copied();
            if let Some(index) = found {
                self.nodes[child].model_index = index;
                kept.push(child);
            } else {
                trace!(node = ?self.nodes[child].handle(), "dropping child missing from model");
                self.destroy(child);
            }
        }
        kept.sort_by_key(|&child| self.nodes[child].model_index);
        self.nodes[key].children = kept;
    }

    // ---- materialized children ------------------------------------------

    pub(crate) fn child_count(&self, key: NodeKey) -> usize {
        self.nodes[key].children.len()
    }

    pub(crate) fn find_child(&self, key: NodeKey, handle: &N) -> Option<NodeKey> {
        self.nodes[key]
            .children
            .iter()
            .copied()
            .find(|&child| self.nodes[child].handle() == handle)
    }

    /// Materialized child at model index `index`.
    pub(crate) fn child_at_model_index(&self, key: NodeKey, index: usize) -> Option<NodeKey> {
        let children = &self.nodes[key].children;
        children
            .binary_search_by_key(&index, |&child| self.nodes[child].model_index)
            .ok()
            .map(|position| children[position])
    }

    /// Finds or creates the state node for a model child of `parent`.
    pub(crate) fn add_child<M: TreeModel<Node = N>>(
        &mut self,
        parent: NodeKey,
        handle: &N,
        model: &M,
    ) -> Option<NodeKey> {
        if let Some(existing) = self.find_child(parent, handle) {
            return Some(existing);
        }
        let index = self.model_index_of_child(parent, model, handle)?;
        let path = self.nodes[parent].path.by_adding_child(handle.clone());
        let child = self.nodes.insert(StateNode::new(path, Some(parent), index));
        let position = self.nodes[parent]
            .children
            .partition_point(|&sibling| self.nodes[sibling].model_index < index);
        self.nodes[parent].children.insert(position, child);
        self.mark_stale_upward(parent);
        Some(child)
    }

    pub(crate) fn remove_child(&mut self, parent: NodeKey, child: NodeKey) {
        self.nodes[parent].children.retain(|&sibling| sibling != child);
        self.destroy(child);
        self.mark_stale_upward(parent);
    }

    pub(crate) fn remove_all_children(&mut self, key: NodeKey) {
        let children = std::mem::take(&mut self.nodes[key].children);
        for child in children {
            self.destroy(child);
        }
        self.mark_stale_upward(key);
    }

    /// Removes a childless node from its parent; the root is never pruned.
    pub(crate) fn prune(&mut self, key: NodeKey) {
        let Some(parent) = self.nodes[key].parent else {
            return;
        };
        trace!(node = ?self.nodes[key].handle(), "pruning collapsed node");
        self.remove_child(parent, key);
        self.mark_suffix_stale(parent);
    }

    fn destroy(&mut self, key: NodeKey) {
        let mut stack = vec![key];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
            }
        }
    }

    // ---- expansion ------------------------------------------------------

    pub(crate) fn set_expanded(&mut self, key: NodeKey) {
        if !self.nodes[key].expanded {
            self.nodes[key].expanded = true;
            self.invalidate_tree_part_below(key);
        }
    }

    pub(crate) fn set_collapsed(&mut self, key: NodeKey) {
        if self.nodes[key].expanded {
            self.nodes[key].expanded = false;
            self.invalidate_tree_part_below(key);
        }
    }

    // ---- invalidation ---------------------------------------------------

    /// Invalidates `key`, forgetting its model children, and every ancestor.
    pub(crate) fn invalidate(&mut self, key: NodeKey) {
        self.nodes[key].model_children = None;
        self.mark_stale_upward(key);
    }

    /// Invalidates `key` and every materialized descendant.
    pub(crate) fn invalidate_subtree(&mut self, key: NodeKey) {
        self.invalidate(key);
        let mut stack = self.nodes[key].children.clone();
        while let Some(next) = stack.pop() {
            let node = &mut self.nodes[next];
            node.model_children = None;
            node.mark_stale();
            stack.extend(node.children.iter().copied());
        }
    }

    /// Invalidates `key` and every node after it in display order.
    ///
    /// Nodes before `key` keep their cached aggregates: their rows do not move.
    pub(crate) fn invalidate_tree_part_below(&mut self, key: NodeKey) {
        self.nodes[key].model_children = None;
        self.mark_suffix_stale(key);
    }

    fn mark_stale_upward(&mut self, key: NodeKey) {
        let mut current = Some(key);
        while let Some(next) = current {
            let node = &mut self.nodes[next];
            node.mark_stale();
            current = node.parent;
        }
    }

    fn mark_suffix_stale(&mut self, key: NodeKey) {
        self.mark_stale_upward(key);
        let mut stack: Vec<NodeKey> = self.nodes[key].children.clone();
        let mut current = key;
        while let Some(parent) = self.nodes[current].parent {
            let siblings = &self.nodes[parent].children;
            if let Some(position) = siblings.iter().position(|&sibling| sibling == current) {
                stack.extend_from_slice(&siblings[position + 1..]);
            }
            current = parent;
        }
        while let Some(next) = stack.pop() {
            let node = &mut self.nodes[next];
            node.mark_stale();
            stack.extend(node.children.iter().copied());
        }
    }

    // ---- validation -----------------------------------------------------

    /// Recomputes aggregates of every invalid node reachable through expanded nodes.
    pub(crate) fn validate<M: TreeModel<Node = N>>(
        &mut self,
        model: &M,
        ctx: &LayoutContext<'_, N>,
    ) {
        let Some(root) = self.root else {
            return;
        };
        if self.nodes[root].valid {
            return;
        }
        trace!(materialized = self.nodes.len(), "validating shadow tree");
        self.validate_node(root, model, ctx, ctx.root_visible.then_some(0));
    }

    fn validate_node<M: TreeModel<Node = N>>(
        &mut self,
        key: NodeKey,
        model: &M,
        ctx: &LayoutContext<'_, N>,
        row: Option<usize>,
    ) {
        let expanded = self.nodes[key].expanded;
        if expanded {
            self.load_model_children(key, model);
        }
        let depth = self.nodes[key].depth();
        let own = ctx.track_heights.then(|| {
            row.map_or_else(Bounds::default, |row| {
                ctx.row_extent(self.nodes[key].handle(), Some(row), depth, expanded)
            })
        });

        let mut visible = 0;
        let mut offsets = Vec::new();
        if expanded {
            let base = row.map_or(0, |row| row + 1);
            let model_children = self.nodes[key].model_children.take().unwrap_or_default();
            let children = self.nodes[key].children.clone();
            if ctx.track_heights {
                offsets.reserve(model_children.len() + 1);
                visible = self.measure_children(
                    &children,
                    &model_children,
                    base,
                    depth + 1,
                    model,
                    ctx,
                    &mut offsets,
                );
            } else {
                visible = self.count_children(&children, model_children.len(), base, model, ctx);
            }
            self.nodes[key].model_children = Some(model_children);
        }

        let node = &mut self.nodes[key];
        node.visible_descendants = visible;
        node.heights = own.map(|own| NodeHeights {
            own,
            child_offsets: offsets,
        });
        node.valid = true;
    }

    fn count_children<M: TreeModel<Node = N>>(
        &mut self,
        children: &[NodeKey],
        model_child_count: usize,
        base: usize,
        model: &M,
        ctx: &LayoutContext<'_, N>,
    ) -> usize {
        let mut below = 0;
        for &child in children {
            if !self.nodes[child].valid {
                let row = base + self.nodes[child].model_index + below;
                self.validate_node(child, model, ctx, Some(row));
            }
            below += self.nodes[child].visible_descendants;
        }
        model_child_count + below
    }

    #[allow(clippy::too_many_arguments)]
    fn measure_children<M: TreeModel<Node = N>>(
        &mut self,
        children: &[NodeKey],
        model_children: &[N],
        base: usize,
        depth: usize,
        model: &M,
        ctx: &LayoutContext<'_, N>,
        offsets: &mut Vec<u32>,
    ) -> usize {
        let mut pending = children.iter().copied().peekable();
        let mut next_row = base;
        let mut total: u32 = 0;
        offsets.push(0);
        for (index, handle) in model_children.iter().enumerate() {
            let materialized = pending.next_if(|&child| self.nodes[child].model_index == index);
            let (rows, height) = match materialized {
                Some(child) => {
                    if !self.nodes[child].valid {
                        self.validate_node(child, model, ctx, Some(next_row));
                    }
                    let node = &self.nodes[child];
                    (1 + node.visible_descendants, node.subtree_height())
                }
                None => (1, ctx.row_extent(handle, Some(next_row), depth, false).height),
            };
            next_row += rows;
            total = total.saturating_add(height);
            offsets.push(total);
        }
        next_row - base
    }

    // ---- lookup ---------------------------------------------------------

    pub(crate) fn node_for_path(&self, path: &TreePath<N>) -> Option<NodeKey> {
        match self.nearest_node_for_path(path)? {
            (key, true) => Some(key),
            (_, false) => None,
        }
    }

    /// Deepest materialized node on `path`, flagged `true` when it is the path's own node.
    pub(crate) fn nearest_node_for_path(&self, path: &TreePath<N>) -> Option<(NodeKey, bool)> {
        let root = self.root?;
        if path.first() != self.nodes[root].handle() {
            return None;
        }
        let mut key = root;
        for component in path.components().into_iter().skip(1) {
            match self.find_child(key, component) {
                Some(child) => key = child,
                None => return Some((key, false)),
            }
        }
        Some((key, true))
    }

    /// Resolves a path to a materialized node or to an unmaterialized child of one.
    pub(crate) fn slot_for_path<M: TreeModel<Node = N>>(
        &mut self,
        path: &TreePath<N>,
        model: &M,
    ) -> Option<Slot> {
        if let Some(key) = self.node_for_path(path) {
            return Some(Slot::Node(key));
        }
        let parent = self.node_for_path(path.parent()?)?;
        let index = self.model_index_of_child(parent, model, path.last())?;
        Some(Slot::Child { parent, index })
    }

    pub(crate) fn child_slot(&self, parent: NodeKey, index: usize) -> Slot {
        self.child_at_model_index(parent, index)
            .map_or(Slot::Child { parent, index }, Slot::Node)
    }

    pub(crate) fn slot_handle(&self, slot: Slot) -> Option<&N> {
        match slot {
            Slot::Node(key) => Some(self.nodes[key].handle()),
            Slot::Child { parent, index } => self.nodes[parent].model_children.as_ref()?.get(index),
        }
    }

    pub(crate) fn slot_path(&self, slot: Slot) -> Option<TreePath<N>> {
        match slot {
            Slot::Node(key) => Some(self.nodes[key].path.clone()),
            Slot::Child { parent, .. } => {
                let handle = self.slot_handle(slot)?.clone();
                Some(self.nodes[parent].path.by_adding_child(handle))
            }
        }
    }

    pub(crate) fn slot_depth(&self, slot: Slot) -> usize {
        match slot {
            Slot::Node(key) => self.nodes[key].depth(),
            Slot::Child { parent, .. } => self.nodes[parent].depth() + 1,
        }
    }

    pub(crate) fn slot_expanded(&self, slot: Slot) -> bool {
        match slot {
            Slot::Node(key) => self.nodes[key].expanded,
            Slot::Child { .. } => false,
        }
    }

    /// Expanded materialized nodes at or below `key`, in display order.
    pub(crate) fn expanded_descendants(&self, key: NodeKey) -> Vec<TreePath<N>> {
        let mut expanded = Vec::new();
        let mut stack = vec![key];
        while let Some(next) = stack.pop() {
            let node = &self.nodes[next];
            if node.expanded {
                expanded.push(node.path.clone());
            }
            stack.extend(node.children.iter().rev().copied());
        }
        expanded
    }

    // ---- rows (valid tree only) -----------------------------------------

    pub(crate) fn is_node_visible(&self, key: NodeKey, root_visible: bool) -> bool {
        let Some(mut parent) = self.nodes[key].parent else {
            return root_visible;
        };
        loop {
            let node = &self.nodes[parent];
            if !node.expanded {
                return false;
            }
            match node.parent {
                Some(next) => parent = next,
                None => return true,
            }
        }
    }

    /// Returns `true` if the children of `key` occupy rows.
    pub(crate) fn shows_children(&self, key: NodeKey, root_visible: bool) -> bool {
        let node = &self.nodes[key];
        node.expanded && (node.is_root() || self.is_node_visible(key, root_visible))
    }

    pub(crate) fn is_slot_visible(&self, slot: Slot, root_visible: bool) -> bool {
        match slot {
            Slot::Node(key) => self.is_node_visible(key, root_visible),
            Slot::Child { parent, .. } => self.shows_children(parent, root_visible),
        }
    }

    pub(crate) fn row_count(&self, root_visible: bool) -> usize {
        self.root.map_or(0, |root| {
            usize::from(root_visible) + self.nodes[root].visible_descendants
        })
    }

    // Rows taken by model children of `parent` before model index `index`.
    fn rows_before(&self, parent: NodeKey, index: usize) -> usize {
        let below: usize = self.nodes[parent]
            .children
            .iter()
            .map(|&child| &self.nodes[child])
            .take_while(|child| child.model_index < index)
            .map(|child| child.visible_descendants)
            .sum();
        index + below
    }

    pub(crate) fn row_of_slot(&self, slot: Slot, root_visible: bool) -> Option<usize> {
        if !self.is_slot_visible(slot, root_visible) {
            return None;
        }
        let (mut row, mut current) = match slot {
            Slot::Node(key) => (0, key),
            Slot::Child { parent, index } => (self.rows_before(parent, index) + 1, parent),
        };
        while let Some(parent) = self.nodes[current].parent {
            row += self.rows_before(parent, self.nodes[current].model_index) + 1;
            current = parent;
        }
        // A hidden root owns no row; its first child is row 0.
        if root_visible { Some(row) } else { row.checked_sub(1) }
    }

    pub(crate) fn slot_for_row(&self, row: usize, root_visible: bool) -> Option<Slot> {
        let root = self.root?;
        let mut remaining = row;
        if root_visible {
            if remaining == 0 {
                return Some(Slot::Node(root));
            }
            remaining -= 1;
        }
        if !self.nodes[root].expanded {
            return None;
        }

        // `remaining` counts rows below `parent`: 0 is its first child.
        let mut parent = root;
        'descend: loop {
            let node = &self.nodes[parent];
            let mut consumed = 0;
            for &child in &node.children {
                let child_node = &self.nodes[child];
                let gap = child_node.model_index.saturating_sub(consumed);
                if remaining < gap {
                    return Some(Slot::Child {
                        parent,
                        index: consumed + remaining,
                    });
                }
                remaining -= gap;
                if remaining == 0 {
                    return Some(Slot::Node(child));
                }
                remaining -= 1;
                if remaining < child_node.visible_descendants {
                    parent = child;
                    continue 'descend;
                }
                remaining -= child_node.visible_descendants;
                consumed = child_node.model_index + 1;
            }
            let index = consumed + remaining;
            return (index < node.loaded_child_count()).then_some(Slot::Child { parent, index });
        }
    }

    /// Next row after `slot` in display order.
    pub(crate) fn next_slot(&self, slot: Slot) -> Option<Slot> {
        if let Slot::Node(key) = slot {
            let node = &self.nodes[key];
            if node.expanded && node.loaded_child_count() > 0 {
                return Some(self.child_slot(key, 0));
            }
        }
        let (mut parent, mut index) = match slot {
            Slot::Node(key) => {
                let node = &self.nodes[key];
                (node.parent?, node.model_index)
            }
            Slot::Child { parent, index } => (parent, index),
        };
        loop {
            let node = &self.nodes[parent];
            if index + 1 < node.loaded_child_count() {
                return Some(self.child_slot(parent, index + 1));
            }
            index = node.model_index;
            parent = node.parent?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestTree, path};

    fn ctx<'a>(root_visible: bool) -> LayoutContext<'a, &'static str> {
        LayoutContext {
            dims: None,
            root_visible,
            track_heights: false,
        }
    }

    fn child(tree: &ShadowTree<&'static str>, key: NodeKey, index: usize) -> Option<NodeKey> {
        tree.node(key).children.get(index).copied()
    }

    fn expanded_sample() -> (TestTree, ShadowTree<&'static str>) {
        let model = TestTree::sample();
        let mut tree = ShadowTree::new();
        tree.reset(&model);
        let root = tree.root().expect("root");
        let a = tree.add_child(root, &"A", &model).expect("A is a child of R");
        tree.set_expanded(a);
        tree.validate(&model, &ctx(true));
        (model, tree)
    }

    #[test]
    fn reset_expands_non_leaf_root() {
        let model = TestTree::sample();
        let mut tree = ShadowTree::new();
        tree.reset(&model);
        let root = tree.root().expect("root");
        assert!(tree.node(root).expanded);

        let leaf = TestTree::new("solo");
        tree.reset(&leaf);
        let root = tree.root().expect("root");
        assert!(!tree.node(root).expanded);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn model_children_are_fetched_lazily_and_cached() {
        let model = TestTree::sample();
        let mut tree = ShadowTree::new();
        tree.reset(&model);
        let root = tree.root().expect("root");
        let before = model.queries();
        assert_eq!(tree.model_child_count(root, &model), 2);
        let after_first = model.queries();
        assert!(after_first > before);
        assert_eq!(tree.model_child_at(root, &model, 1), Some(&"B"));
        assert_eq!(tree.model_index_of_child(root, &model, &"A"), Some(0));
        assert_eq!(model.queries(), after_first);

        tree.invalidate(root);
        assert_eq!(tree.model_child_count(root, &model), 2);
        assert!(model.queries() > after_first);
    }

    #[test]
    fn add_child_keeps_model_order_and_is_idempotent() {
        let model = TestTree::sample();
        let mut tree = ShadowTree::new();
        tree.reset(&model);
        let root = tree.root().expect("root");
        let b = tree.add_child(root, &"B", &model).expect("B");
        let a = tree.add_child(root, &"A", &model).expect("A");
        assert_eq!(tree.add_child(root, &"A", &model), Some(a));
        assert_eq!(tree.child_count(root), 2);
        assert_eq!(child(&tree, root, 0), Some(a));
        assert_eq!(child(&tree, root, 1), Some(b));
        assert_eq!(child(&tree, root, 2), None);
        assert_eq!(tree.add_child(root, &"A1", &model), None);
    }

    #[test]
    fn counts_rows_through_sparse_children() {
        let (_, tree) = expanded_sample();
        let root = tree.root().expect("root");
        assert_eq!(tree.node(root).visible_descendants, 4);
        assert_eq!(tree.row_count(true), 5);
        assert_eq!(tree.row_count(false), 4);
    }

    #[test]
    fn rows_and_slots_agree() {
        let (_, tree) = expanded_sample();
        for row in 0..tree.row_count(true) {
            let slot = tree.slot_for_row(row, true).expect("row in range");
            assert_eq!(tree.row_of_slot(slot, true), Some(row));
        }
        assert_eq!(tree.slot_for_row(5, true), None);
    }

    #[test]
    fn next_slot_walks_display_order() {
        let (_, tree) = expanded_sample();
        let root = tree.root().expect("root");
        let order: Vec<_> = std::iter::successors(Some(Slot::Node(root)), |&slot| {
            tree.next_slot(slot)
        })
        .filter_map(|slot| tree.slot_handle(slot).copied())
        .collect();
        assert_eq!(order, vec!["R", "A", "A1", "A2", "B"]);
    }

    #[test]
    fn tree_part_below_spares_earlier_nodes() {
        let mut model = TestTree::sample();
        model.set_children("B", &["B1"]);
        let mut tree = ShadowTree::new();
        tree.reset(&model);
        let root = tree.root().expect("root");
        let a = tree.add_child(root, &"A", &model).expect("A");
        let b = tree.add_child(root, &"B", &model).expect("B");
        tree.set_expanded(a);
        tree.set_expanded(b);
        tree.validate(&model, &ctx(true));

        tree.invalidate_tree_part_below(b);
        assert!(tree.node(a).valid);
        assert!(!tree.node(b).valid);
        assert!(!tree.node(root).valid);

        tree.validate(&model, &ctx(true));
        tree.invalidate_tree_part_below(a);
        assert!(!tree.node(a).valid);
        assert!(!tree.node(b).valid);
    }

    #[test]
    fn subtree_invalidation_reaches_every_node() {
        let (_, mut tree) = expanded_sample();
        let root = tree.root().expect("root");
        tree.invalidate_subtree(root);
        let a = child(&tree, root, 0).expect("A");
        assert!(!tree.node(root).valid);
        assert!(!tree.node(a).valid);
        assert!(tree.node(a).model_children.is_none());
    }

    #[test]
    fn reload_drops_children_missing_from_model() {
        let (mut model, mut tree) = expanded_sample();
        let root = tree.root().expect("root");
        model.remove_child("R", 0);
        tree.invalidate(root);
        tree.validate(&model, &ctx(true));
        assert_eq!(tree.child_count(root), 0);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.row_count(true), 2);
    }

    #[test]
    fn lookup_resolves_unmaterialized_children() {
        let (model, mut tree) = expanded_sample();
        let root = tree.root().expect("root");
        let slot = tree.slot_for_path(&path(&["R", "B"]), &model);
        assert_eq!(slot, Some(Slot::Child { parent: root, index: 1 }));
        assert_eq!(tree.slot_for_path(&path(&["R", "C"]), &model), None);
        assert_eq!(tree.slot_for_path(&path(&["X"]), &model), None);
        assert_eq!(
            tree.nearest_node_for_path(&path(&["R", "B"])),
            Some((root, false))
        );
    }

    #[test]
    fn cached_children_reject_out_of_range_indices() {
        let (_, tree) = expanded_sample();
        let root = tree.root().expect("root");
        assert_eq!(tree.cached_children_at(root, &[1]), Ok(vec!["B"]));
        assert_eq!(
            tree.cached_children_at(root, &[2]),
            Err(LayoutError::ChildIndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn prune_removes_node_and_its_row_contribution() {
        let (model, mut tree) = expanded_sample();
        let root = tree.root().expect("root");
        let a = child(&tree, root, 0).expect("A");
        tree.prune(a);
        tree.validate(&model, &ctx(true));
        assert_eq!(tree.child_count(root), 0);
        assert_eq!(tree.row_count(true), 3);
        tree.prune(root);
        assert!(tree.root().is_some());
    }

    #[test]
    fn expanded_descendants_in_display_order() {
        let mut model = TestTree::sample();
        model.set_children("B", &["B1"]);
        let mut tree = ShadowTree::new();
        tree.reset(&model);
        let root = tree.root().expect("root");
        let b = tree.add_child(root, &"B", &model).expect("B");
        let a = tree.add_child(root, &"A", &model).expect("A");
        tree.set_expanded(b);
        tree.set_expanded(a);
        let paths = tree.expanded_descendants(root);
        assert_eq!(
            paths,
            vec![path(&["R"]), path(&["R", "A"]), path(&["R", "B"])]
        );
    }
}
