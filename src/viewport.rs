use std::ops::Range;

use ratatui::layout::Rect;

use crate::cache::TreeLayoutCache;
use crate::geometry::Bounds;
use crate::model::TreeModel;
use crate::path::TreePath;

/// How [`TreeViewport::scroll_to_path`] moves the offset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TreeScrollPolicy {
    /// Scroll as little as possible.
    #[default]
    KeepInView,
    /// Put the row in the middle of the viewport when the content allows it.
    CenterOnSelect,
}

/// Vertical window onto a [`TreeLayoutCache`], for drawing it into a ratatui [`Rect`].
///
/// One unit of cache geometry is one terminal cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TreeViewport {
    /// Cache `y` shown on the first line of the area.
    pub offset: u32,
}

impl TreeViewport {
    /// Viewport whose first line shows cache `y == offset`.
    pub const fn new(offset: u32) -> Self {
        Self { offset }
    }

    /// Rows that are at least partly inside `area`.
    pub fn visible_rows<M: TreeModel>(
        &self,
        cache: &mut TreeLayoutCache<M>,
        area: Rect,
    ) -> Range<usize> {
        let rows = cache.row_count();
        if area.height == 0 || self.offset >= cache.preferred_height() {
            return rows..rows;
        }
        let bottom = self.offset.saturating_add(u32::from(area.height) - 1);
        match (cache.row_at(self.offset), cache.row_at(bottom)) {
            (Some(first), Some(last)) => first..last + 1,
            _ => rows..rows,
        }
    }

    /// Screen rectangle of the row showing `path`, clipped to `area`.
    pub fn rect_for_path<M: TreeModel>(
        &self,
        cache: &mut TreeLayoutCache<M>,
        path: &TreePath<M::Node>,
        area: Rect,
    ) -> Option<Rect> {
        let bounds = cache.bounds(path)?;
        if bounds.bottom() <= self.offset {
            return None;
        }
        let top = bounds.y.max(self.offset);
        let rect = Rect::new(
            clamp(u32::from(area.x).saturating_add(bounds.x)),
            clamp(u32::from(area.y).saturating_add(top - self.offset)),
            clamp(bounds.width),
            clamp(bounds.bottom() - top),
        )
        .intersection(area);
        (!rect.is_empty()).then_some(rect)
    }

    /// Moves the offset so the row showing `path` is inside a viewport of
    /// `height` lines. Returns `false` if the path has no row.
    pub fn scroll_to_path<M: TreeModel>(
        &mut self,
        cache: &mut TreeLayoutCache<M>,
        path: &TreePath<M::Node>,
        height: u32,
        policy: TreeScrollPolicy,
    ) -> bool {
        let Some(bounds) = cache.bounds(path) else {
            return false;
        };
        let height = height.max(1);
        match policy {
            TreeScrollPolicy::KeepInView => self.keep_in_view(bounds, height),
            TreeScrollPolicy::CenterOnSelect => {
                self.center_on(bounds, height, cache.preferred_height());
            }
        }
        true
    }

    const fn keep_in_view(&mut self, bounds: Bounds, height: u32) {
        if bounds.y < self.offset || bounds.height >= height {
            self.offset = bounds.y;
        } else if bounds.bottom() > self.offset.saturating_add(height) {
            self.offset = bounds.bottom() - height;
        }
    }

    fn center_on(&mut self, bounds: Bounds, height: u32, total: u32) {
        if total <= height {
            self.offset = 0;
            return;
        }
        // Center the row, then clamp to the scrollable range.
        let center = bounds.y.saturating_add(bounds.height / 2);
        self.offset = center.saturating_sub(height / 2).min(total - height);
    }
}

fn clamp(value: u32) -> u16 {
    u16::try_from(value).unwrap_or(u16::MAX)
}
