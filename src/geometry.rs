use std::fmt::Debug;
use std::hash::Hash;

use crate::error::Result;
use crate::fixed::FixedHeight;
use crate::model::NodeDimensions;
use crate::shadow::{ShadowTree, Slot};
use crate::variable::VariableHeight;

/// Axis-aligned rectangle in the cache's coordinate space (rows grow downward).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    /// Rectangle at `(x, y)` with the given extent.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// First coordinate below the rectangle.
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// First coordinate right of the rectangle.
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }
}

/// Inputs shared by validation and the geometry queries.
pub(crate) struct LayoutContext<'a, N> {
    pub(crate) dims: Option<&'a dyn NodeDimensions<N>>,
    pub(crate) root_visible: bool,
    // Per-node heights are measured and stored only in variable mode without a pinned height.
    pub(crate) track_heights: bool,
}

impl<N> LayoutContext<'_, N> {
    /// Extent of one row as reported by the dimensions callback.
    ///
    /// Without a callback every row is one unit tall with no horizontal extent.
    pub(crate) fn row_extent(
        &self,
        node: &N,
        row: Option<usize>,
        depth: usize,
        expanded: bool,
    ) -> Bounds {
        self.dims.map_or(Bounds::new(0, 0, 0, 1), |dims| {
            dims.dimensions(node, row, depth, expanded)
                .unwrap_or_default()
        })
    }
}

/// Height policy of a layout cache.
pub(crate) trait LayoutGeometry<N: Clone + Eq + Hash + Debug> {
    fn row_for(
        &self,
        tree: &ShadowTree<N>,
        slot: Slot,
        ctx: &LayoutContext<'_, N>,
    ) -> Option<usize> {
        tree.row_of_slot(slot, ctx.root_visible)
    }

    fn slot_for_row(
        &self,
        tree: &ShadowTree<N>,
        row: usize,
        ctx: &LayoutContext<'_, N>,
    ) -> Option<Slot> {
        tree.slot_for_row(row, ctx.root_visible)
    }

    fn bounds(
        &self,
        tree: &ShadowTree<N>,
        slot: Slot,
        ctx: &LayoutContext<'_, N>,
    ) -> Option<Bounds>;

    /// Row nearest to `y`, clamped to the first and last rows.
    fn slot_closest_to(
        &self,
        tree: &ShadowTree<N>,
        y: u32,
        ctx: &LayoutContext<'_, N>,
    ) -> Option<Slot>;

    /// Row whose vertical extent contains `y`, clamped to the first and last rows.
    fn slot_at(&self, tree: &ShadowTree<N>, y: u32, ctx: &LayoutContext<'_, N>) -> Option<Slot> {
        self.slot_closest_to(tree, y, ctx)
    }

    /// Total height of every shown row.
    fn preferred_height(&self, tree: &ShadowTree<N>, ctx: &LayoutContext<'_, N>) -> u32;
}

/// Active height policy.
///
/// Variable mode may carry a pinned row height: it then answers like fixed mode
/// but keeps its own name so the pin can be lifted again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Geometry {
    Fixed(FixedHeight),
    Variable { pinned: Option<FixedHeight> },
}

impl Geometry {
    pub(crate) fn new(fixed_height: bool, row_height: u32) -> Result<Self> {
        if fixed_height {
            return FixedHeight::new(row_height).map(Self::Fixed);
        }
        Ok(Self::Variable {
            pinned: FixedHeight::pinned(row_height),
        })
    }

    /// Same mode with a new row height.
    pub(crate) fn with_row_height(self, row_height: u32) -> Result<Self> {
        match self {
            Self::Fixed(_) => Self::new(true, row_height),
            Self::Variable { .. } => Self::new(false, row_height),
        }
    }

    pub(crate) fn strategy<N: Clone + Eq + Hash + Debug>(&self) -> &dyn LayoutGeometry<N> {
        match self {
            Self::Fixed(fixed) | Self::Variable { pinned: Some(fixed) } => fixed,
            Self::Variable { pinned: None } => &VariableHeight,
        }
    }

    pub(crate) const fn tracks_heights(&self) -> bool {
        matches!(self, Self::Variable { pinned: None })
    }

    pub(crate) const fn is_fixed(&self) -> bool {
        matches!(self, Self::Fixed(_))
    }

    /// Configured row height; 0 in variable mode without a pin.
    pub(crate) const fn row_height(&self) -> u32 {
        match self {
            Self::Fixed(fixed) | Self::Variable { pinned: Some(fixed) } => fixed.row_height(),
            Self::Variable { pinned: None } => 0,
        }
    }
}

pub(crate) fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;

    #[test]
    fn bounds_edges_saturate() {
        let bounds = Bounds::new(u32::MAX - 1, 3, 5, 2);
        assert_eq!(bounds.bottom(), 5);
        assert_eq!(bounds.right(), u32::MAX);
    }

    #[test]
    fn fixed_mode_rejects_zero_height() {
        assert_eq!(
            Geometry::new(true, 0),
            Err(LayoutError::InvalidRowHeight(0))
        );
        let fixed = Geometry::new(true, 3).expect("positive height");
        assert_eq!(fixed.row_height(), 3);
        assert!(fixed.is_fixed());
        assert!(!fixed.tracks_heights());
        assert_eq!(
            fixed.with_row_height(0),
            Err(LayoutError::InvalidRowHeight(0))
        );
    }

    #[test]
    fn variable_mode_pins_positive_heights() {
        let free = Geometry::new(false, 0).expect("variable accepts 0");
        assert!(free.tracks_heights());
        assert_eq!(free.row_height(), 0);

        let pinned = free.with_row_height(2).expect("variable accepts any height");
        assert!(!pinned.tracks_heights());
        assert!(!pinned.is_fixed());
        assert_eq!(pinned.row_height(), 2);
        assert_eq!(pinned.with_row_height(0), Ok(free));
    }

    #[test]
    fn missing_callback_yields_unit_rows() {
        let ctx: LayoutContext<'_, &str> = LayoutContext {
            dims: None,
            root_visible: true,
            track_heights: true,
        };
        assert_eq!(
            ctx.row_extent(&"A", Some(0), 0, false),
            Bounds::new(0, 0, 0, 1)
        );

        let dims = |_: &&str, _: Option<usize>, _: usize, _: bool| -> Option<Bounds> { None };
        let ctx = LayoutContext {
            dims: Some(&dims as &dyn NodeDimensions<&str>),
            ..ctx
        };
        assert_eq!(ctx.row_extent(&"A", Some(0), 0, false), Bounds::default());
    }
}
