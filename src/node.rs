use slotmap::new_key_type;

use crate::geometry::Bounds;
use crate::path::TreePath;

new_key_type! {
    /// Arena key of a materialized state node.
    pub(crate) struct NodeKey;
}

/// One materialized node of the shadow tree.
pub(crate) struct StateNode<N> {
    pub(crate) path: TreePath<N>,
    pub(crate) parent: Option<NodeKey>,
    // Sparse: only visited children, ordered by `model_index`.
    pub(crate) children: Vec<NodeKey>,
    // Index within the parent's model children; refreshed whenever the parent reloads them.
    pub(crate) model_index: usize,
    pub(crate) model_children: Option<Vec<N>>,
    pub(crate) expanded: bool,
    pub(crate) valid: bool,
    // Rows below this node while expanded; 0 when collapsed.
    pub(crate) visible_descendants: usize,
    pub(crate) heights: Option<NodeHeights>,
}

/// Variable-height aggregates, present only while per-node heights are tracked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct NodeHeights {
    /// Extent of the node's own row (`y` unused).
    pub(crate) own: Bounds,
    /// Prefix sums of per-child heights; `len == model child count + 1` when expanded.
    pub(crate) child_offsets: Vec<u32>,
}

impl NodeHeights {
    pub(crate) fn children_height(&self) -> u32 {
        self.child_offsets.last().copied().unwrap_or(0)
    }

    /// Span of the child at `index` relative to the top of the first child.
    pub(crate) fn child_span(&self, index: usize) -> Option<(u32, u32)> {
        let start = *self.child_offsets.get(index)?;
        let end = *self.child_offsets.get(index + 1)?;
        Some((start, end - start))
    }
}

impl<N> StateNode<N> {
    pub(crate) const fn new(
        path: TreePath<N>,
        parent: Option<NodeKey>,
        model_index: usize,
    ) -> Self {
        Self {
            path,
            parent,
            children: Vec::new(),
            model_index,
            model_children: None,
            expanded: false,
            valid: false,
            visible_descendants: 0,
            heights: None,
        }
    }

    pub(crate) fn handle(&self) -> &N {
        self.path.last()
    }

    pub(crate) fn depth(&self) -> usize {
        self.path.path_count() - 1
    }

    pub(crate) const fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of model children, or 0 while the list is not loaded.
    pub(crate) fn loaded_child_count(&self) -> usize {
        self.model_children.as_ref().map_or(0, Vec::len)
    }

    /// Height of the node's row plus its shown descendants.
    pub(crate) fn subtree_height(&self) -> u32 {
        self.heights.as_ref().map_or(0, |heights| {
            let below = if self.expanded {
                heights.children_height()
            } else {
                0
            };
            heights.own.height.saturating_add(below)
        })
    }

    /// Clears the validity flag together with the cached aggregates.
    pub(crate) fn mark_stale(&mut self) {
        self.valid = false;
        self.heights = None;
    }
}
