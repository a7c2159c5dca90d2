use std::fmt::Debug;
use std::hash::Hash;
use std::num::NonZeroU32;

use crate::error::{LayoutError, Result};
use crate::geometry::{Bounds, LayoutContext, LayoutGeometry, to_u32};
use crate::shadow::{ShadowTree, Slot};

/// Every row is `row_height` tall; vertical placement is pure arithmetic on row numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct FixedHeight {
    row_height: NonZeroU32,
}

impl FixedHeight {
    pub(crate) fn new(row_height: u32) -> Result<Self> {
        NonZeroU32::new(row_height)
            .map(|row_height| Self { row_height })
            .ok_or(LayoutError::InvalidRowHeight(row_height))
    }

    /// Pin for variable mode: any positive height, nothing for 0.
    pub(crate) fn pinned(row_height: u32) -> Option<Self> {
        NonZeroU32::new(row_height).map(|row_height| Self { row_height })
    }

    pub(crate) const fn row_height(self) -> u32 {
        self.row_height.get()
    }

    fn row_slot<N: Clone + Eq + Hash + Debug>(
        self,
        tree: &ShadowTree<N>,
        row: u32,
        ctx: &LayoutContext<'_, N>,
    ) -> Option<Slot> {
        let last = tree.row_count(ctx.root_visible).checked_sub(1)?;
        let row = usize::try_from(row).map_or(last, |row| row.min(last));
        tree.slot_for_row(row, ctx.root_visible)
    }
}

impl<N: Clone + Eq + Hash + Debug> LayoutGeometry<N> for FixedHeight {
    fn bounds(
        &self,
        tree: &ShadowTree<N>,
        slot: Slot,
        ctx: &LayoutContext<'_, N>,
    ) -> Option<Bounds> {
        let row = tree.row_of_slot(slot, ctx.root_visible)?;
        let extent = ctx.row_extent(
            tree.slot_handle(slot)?,
            Some(row),
            tree.slot_depth(slot),
            tree.slot_expanded(slot),
        );
        let height = self.row_height.get();
        Some(Bounds {
            y: to_u32(row).saturating_mul(height),
            height,
            ..extent
        })
    }

    /// `round(y / h)`: past the middle of a row, the next row is nearer.
    fn slot_closest_to(
        &self,
        tree: &ShadowTree<N>,
        y: u32,
        ctx: &LayoutContext<'_, N>,
    ) -> Option<Slot> {
        let height = self.row_height.get();
        self.row_slot(tree, y.saturating_add(height / 2) / height, ctx)
    }

    fn slot_at(&self, tree: &ShadowTree<N>, y: u32, ctx: &LayoutContext<'_, N>) -> Option<Slot> {
        self.row_slot(tree, y / self.row_height.get(), ctx)
    }

    fn preferred_height(&self, tree: &ShadowTree<N>, ctx: &LayoutContext<'_, N>) -> u32 {
        to_u32(tree.row_count(ctx.root_visible)).saturating_mul(self.row_height.get())
    }
}
