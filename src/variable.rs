use std::fmt::Debug;
use std::hash::Hash;

use crate::geometry::{Bounds, LayoutContext, LayoutGeometry};
use crate::node::NodeKey;
use crate::shadow::{ShadowTree, Slot};

/// Rows take the height reported by the dimensions callback.
///
/// Each expanded node keeps prefix sums of its children's subtree heights, so a
/// row's `y` is a walk up the ancestor chain and the row at a given `y` is a
/// binary search per level on the way down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct VariableHeight;

impl VariableHeight {
    // Top of the row showing `key`.
    fn node_y<N: Clone + Eq + Hash + Debug>(tree: &ShadowTree<N>, key: NodeKey) -> u32 {
        let mut y: u32 = 0;
        let mut current = key;
        while let Some(parent) = tree.node(current).parent {
            let index = tree.node(current).model_index;
            y = y
                .saturating_add(Self::children_top(tree, parent))
                .saturating_add(Self::offset(tree, parent, index));
            current = parent;
        }
        y
    }

    // Distance from the top of `key`'s row to the top of its first child.
    fn children_top<N: Clone + Eq + Hash + Debug>(tree: &ShadowTree<N>, key: NodeKey) -> u32 {
        tree.node(key)
            .heights
            .as_ref()
            .map_or(0, |heights| heights.own.height)
    }

    fn offset<N: Clone + Eq + Hash + Debug>(
        tree: &ShadowTree<N>,
        key: NodeKey,
        index: usize,
    ) -> u32 {
        tree.node(key)
            .heights
            .as_ref()
            .and_then(|heights| heights.child_offsets.get(index).copied())
            .unwrap_or(0)
    }
}

impl<N: Clone + Eq + Hash + Debug> LayoutGeometry<N> for VariableHeight {
    fn bounds(
        &self,
        tree: &ShadowTree<N>,
        slot: Slot,
        ctx: &LayoutContext<'_, N>,
    ) -> Option<Bounds> {
        if !tree.is_slot_visible(slot, ctx.root_visible) {
            return None;
        }
        match slot {
            Slot::Node(key) => {
                let own = tree.node(key).heights.as_ref()?.own;
                Some(Bounds {
                    y: Self::node_y(tree, key),
                    ..own
                })
            }
            Slot::Child { parent, index } => {
                let (offset, height) = tree.node(parent).heights.as_ref()?.child_span(index)?;
                let row = tree.row_of_slot(slot, ctx.root_visible)?;
                let extent = ctx.row_extent(
                    tree.slot_handle(slot)?,
                    Some(row),
                    tree.slot_depth(slot),
                    false,
                );
                let y = Self::node_y(tree, parent)
                    .saturating_add(Self::children_top(tree, parent))
                    .saturating_add(offset);
                Some(Bounds { y, height, ..extent })
            }
        }
    }

    fn slot_closest_to(
        &self,
        tree: &ShadowTree<N>,
        y: u32,
        ctx: &LayoutContext<'_, N>,
    ) -> Option<Slot> {
        let last = tree.row_count(ctx.root_visible).checked_sub(1)?;
        let mut key = tree.root()?;
        let mut y = y;
        loop {
            let node = tree.node(key);
            let Some(heights) = node.heights.as_ref() else {
                break;
            };
            // A hidden root measures 0 and is never picked here.
            if y < heights.own.height {
                return Some(Slot::Node(key));
            }
            y -= heights.own.height;
            if !node.expanded || y >= heights.children_height() {
                break;
            }
            let index = heights.child_offsets.partition_point(|&offset| offset <= y) - 1;
            match tree.child_slot(key, index) {
                Slot::Node(child) => {
                    y -= heights.child_offsets[index];
                    key = child;
                }
                slot => return Some(slot),
            }
        }
        tree.slot_for_row(last, ctx.root_visible)
    }

    fn preferred_height(&self, tree: &ShadowTree<N>, _ctx: &LayoutContext<'_, N>) -> u32 {
        tree.root()
            .map_or(0, |root| tree.node(root).subtree_height())
    }
}
