use std::ops::Range;

use tracing::{debug, trace};

use crate::config::TreeLayoutConfig;
use crate::error::{LayoutError, Result};
use crate::event::TreeModelEvent;
use crate::geometry::{Bounds, Geometry, LayoutContext, LayoutGeometry};
use crate::model::{NodeDimensions, TreeModel};
use crate::path::TreePath;
use crate::selection::{RowMapper, RowSelection};
use crate::shadow::{ShadowTree, Slot};
use crate::visible::VisiblePaths;

/// Incremental row and geometry cache for a lazily queried tree.
///
/// Only nodes that were expanded (or walked through while expanding) get a
/// state node; every other row is described by its parent. Structural
/// mutations mark the affected part of the shadow tree invalid and queries
/// revalidate it on demand, so each query pays only for what changed since the
/// previous one.
///
/// Mutations take `&mut self` and queries that may revalidate do too; a
/// [`VisiblePaths`] iterator borrows the cache for as long as it lives.
pub struct TreeLayoutCache<M: TreeModel> {
    model: Option<M>,
    tree: ShadowTree<M::Node>,
    root_visible: bool,
    geometry: Geometry,
    node_dimensions: Option<Box<dyn NodeDimensions<M::Node>>>,
    selection: Option<Box<dyn RowSelection<M::Node>>>,
}

impl<M: TreeModel> Default for TreeLayoutCache<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: TreeModel> TreeLayoutCache<M> {
    /// Creates an empty variable-height cache with a visible root.
    pub fn new() -> Self {
        Self::from_geometry(true, Geometry::Variable { pinned: None })
    }

    /// Creates an empty cache from `config`.
    pub fn with_config(config: TreeLayoutConfig) -> Result<Self> {
        let geometry = Geometry::new(config.fixed_height, config.row_height)?;
        Ok(Self::from_geometry(config.root_visible, geometry))
    }

    fn from_geometry(root_visible: bool, geometry: Geometry) -> Self {
        Self {
            model: None,
            tree: ShadowTree::new(),
            root_visible,
            geometry,
            node_dimensions: None,
            selection: None,
        }
    }

    /// Builder form of [`set_model`](Self::set_model).
    #[must_use]
    pub fn with_model(mut self, model: M) -> Self {
        self.set_model(Some(model));
        self
    }

    /// Replaces the model and rebuilds the shadow tree from its root.
    ///
    /// The new root starts expanded unless the model reports it as a leaf.
    pub fn set_model(&mut self, model: Option<M>) {
        self.model = model;
        match self.model.as_ref() {
            Some(model) => self.tree.reset(model),
            None => self.tree.clear(),
        }
        debug!(
            root = ?self.tree.root().map(|root| self.tree.node(root).handle()),
            "layout model replaced"
        );
        self.reset_row_selection();
    }

    /// The model currently laid out, if any.
    pub const fn model(&self) -> Option<&M> {
        self.model.as_ref()
    }

    /// Mutable access to the model.
    ///
    /// The cache does not observe changes made here: follow every structural
    /// edit with the matching `tree_nodes_*` or `tree_structure_changed` call.
    pub const fn model_mut(&mut self) -> Option<&mut M> {
        self.model.as_mut()
    }

    /// Returns `true` if the root has a row of its own.
    pub const fn is_root_visible(&self) -> bool {
        self.root_visible
    }

    /// Shows or hides the root row; every row number shifts by one.
    pub fn set_root_visible(&mut self, root_visible: bool) {
        if self.root_visible == root_visible {
            return;
        }
        self.root_visible = root_visible;
        if let Some(root) = self.tree.root() {
            self.tree.invalidate_tree_part_below(root);
        }
        debug!(root_visible, "root visibility changed");
        self.reset_row_selection();
    }

    /// Configured row height; 0 when rows are measured individually.
    pub const fn row_height(&self) -> u32 {
        self.geometry.row_height()
    }

    /// Returns `true` in fixed-height mode; a pinned variable height does not count.
    pub const fn is_fixed_height(&self) -> bool {
        self.geometry.is_fixed()
    }

    /// Changes the row height, keeping the current fixed or variable mode.
    ///
    /// Fails with [`LayoutError::InvalidRowHeight`](crate::LayoutError::InvalidRowHeight)
    /// for 0 in fixed mode; in variable mode 0 lifts a pinned height.
    pub fn set_row_height(&mut self, row_height: u32) -> Result<()> {
        let geometry = self.geometry.with_row_height(row_height)?;
        if geometry != self.geometry {
            self.geometry = geometry;
            debug!(row_height, "row height changed");
            self.invalidate_sizes();
        }
        Ok(())
    }

    /// Installs the callback that measures rows; all cached geometry is dropped.
    pub fn set_node_dimensions<D>(&mut self, dimensions: D)
    where
        D: NodeDimensions<M::Node> + 'static,
    {
        self.node_dimensions = Some(Box::new(dimensions));
        self.invalidate_sizes();
    }

    /// Removes the dimensions callback; rows fall back to one line each.
    pub fn clear_node_dimensions(&mut self) {
        if self.node_dimensions.take().is_some() {
            self.invalidate_sizes();
        }
    }

    /// Installs the selection collaborator told to resync after row-shifting changes.
    pub fn set_selection<S>(&mut self, selection: S)
    where
        S: RowSelection<M::Node> + 'static,
    {
        self.selection = Some(Box::new(selection));
    }

    /// Detaches the row selection collaborator.
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // ---- expansion --------------------------------------------------------

    /// Returns `true` if `path` is materialized and expanded.
    pub fn is_expanded(&self, path: &TreePath<M::Node>) -> bool {
        self.tree
            .node_for_path(path)
            .is_some_and(|key| self.tree.node(key).expanded)
    }

    /// Expands or collapses `path`.
    ///
    /// Expanding also expands every ancestor on the path; leaves are never
    /// expanded. Paths that do not start at the current root, or that the model
    /// does not contain, are ignored.
    pub fn set_expanded_state(&mut self, path: &TreePath<M::Node>, expanded: bool) {
        if expanded {
            self.expand_path(path);
        } else {
            self.collapse_path(path);
        }
    }

    fn expand_path(&mut self, path: &TreePath<M::Node>) {
        let (Some(model), Some(root)) = (self.model.as_ref(), self.tree.root()) else {
            return;
        };
        let components = path.components();
        if components[0] != self.tree.node(root).handle()
            || components
                .windows(2)
                .any(|pair| model.index_of_child(pair[0], pair[1]).is_none())
        {
            debug!(?path, "ignoring expansion of a path outside the model");
            return;
        }

        let mut key = root;
        for (depth, &component) in components.iter().enumerate() {
            if model.is_leaf(component) {
                break;
            }
            if depth > 0 {
                let Some(child) = self.tree.add_child(key, component, model) else {
                    debug!(?path, depth, "expansion stopped at a stale child list");
                    break;
                };
                key = child;
            }
            self.tree.set_expanded(key);
        }
        trace!(?path, "path expanded");
    }

    fn collapse_path(&mut self, path: &TreePath<M::Node>) {
        let Some(key) = self.tree.node_for_path(path) else {
            return;
        };
        let node = self.tree.node(key);
        if !node.expanded {
            return;
        }
        if !node.is_root() && self.tree.child_count(key) == 0 {
            self.tree.prune(key);
        } else {
            self.tree.set_collapsed(key);
        }
        trace!(?path, "path collapsed");
    }

    /// Expanded materialized nodes at or below `path`, in display order.
    pub fn expanded_descendants(&self, path: &TreePath<M::Node>) -> Vec<TreePath<M::Node>> {
        self.tree
            .node_for_path(path)
            .map_or_else(Vec::new, |key| self.tree.expanded_descendants(key))
    }

    // ---- rows -------------------------------------------------------------

    fn validate(&mut self) {
        let Some(model) = self.model.as_ref() else {
            return;
        };
        let ctx = LayoutContext {
            dims: self.node_dimensions.as_deref(),
            root_visible: self.root_visible,
            track_heights: self.geometry.tracks_heights(),
        };
        self.tree.validate(model, &ctx);
    }

    fn context(&self) -> LayoutContext<'_, M::Node> {
        LayoutContext {
            dims: self.node_dimensions.as_deref(),
            root_visible: self.root_visible,
            track_heights: self.geometry.tracks_heights(),
        }
    }

    fn strategy(&self) -> &dyn LayoutGeometry<M::Node> {
        self.geometry.strategy()
    }

    fn locate(&mut self, path: &TreePath<M::Node>) -> Option<Slot> {
        self.validate();
        let model = self.model.as_ref()?;
        self.tree.slot_for_path(path, model)
    }

    /// Number of shown rows.
    pub fn row_count(&mut self) -> usize {
        self.validate();
        self.tree.row_count(self.root_visible)
    }

    /// Row showing `path`, or `None` if the path is unknown or under a collapsed node.
    pub fn row_for_path(&mut self, path: &TreePath<M::Node>) -> Option<usize> {
        let slot = self.locate(path)?;
        self.strategy().row_for(&self.tree, slot, &self.context())
    }

    /// Path shown at `row`, or `None` past the last row.
    pub fn path_for_row(&mut self, row: usize) -> Option<TreePath<M::Node>> {
        self.validate();
        let slot = self.strategy().slot_for_row(&self.tree, row, &self.context())?;
        self.tree.slot_path(slot)
    }

    /// Maps each path independently with [`row_for_path`](Self::row_for_path).
    pub fn rows_for_paths(&mut self, paths: &[TreePath<M::Node>]) -> Vec<Option<usize>> {
        paths.iter().map(|path| self.row_for_path(path)).collect()
    }

    /// Returns `true` if every ancestor of `path` is expanded.
    pub fn is_visible(&mut self, path: &TreePath<M::Node>) -> bool {
        self.locate(path)
            .is_some_and(|slot| self.tree.is_slot_visible(slot, self.root_visible))
    }

    /// Number of rows below `path` while it is expanded and shown; 0 otherwise.
    pub fn visible_child_count(&mut self, path: &TreePath<M::Node>) -> usize {
        self.validate();
        // Counts under a collapsed ancestor are not revalidated.
        self.tree
            .node_for_path(path)
            .filter(|&key| self.tree.shows_children(key, self.root_visible))
            .map_or(0, |key| self.tree.node(key).visible_descendants)
    }

    /// Shown paths in display order, starting at `path`.
    ///
    /// A hidden root yields its children; any other path that has no row yields `None`.
    pub fn visible_paths_from(
        &mut self,
        path: &TreePath<M::Node>,
    ) -> Option<VisiblePaths<'_, M::Node>> {
        let slot = self.locate(path)?;
        let start = if self.tree.is_slot_visible(slot, self.root_visible) {
            Some(slot)
        } else {
            match slot {
                Slot::Node(key) if self.tree.node(key).is_root() => {
                    let root = self.tree.node(key);
                    (root.expanded && root.loaded_child_count() > 0)
                        .then(|| self.tree.child_slot(key, 0))
                }
                _ => return None,
            }
        };
        Some(VisiblePaths::new(&self.tree, start))
    }

    // ---- geometry ---------------------------------------------------------

    /// Rectangle of the row showing `path`.
    pub fn bounds(&mut self, path: &TreePath<M::Node>) -> Option<Bounds> {
        let slot = self.locate(path)?;
        self.strategy().bounds(&self.tree, slot, &self.context())
    }

    /// Path of the row nearest to `y`; rows above and below the tree clamp to the ends.
    ///
    /// `x` does not take part in the lookup.
    pub fn path_closest_to(&mut self, _x: u32, y: u32) -> Option<TreePath<M::Node>> {
        self.validate();
        let slot = self.strategy().slot_closest_to(&self.tree, y, &self.context())?;
        self.tree.slot_path(slot)
    }

    // Row whose vertical extent contains `y`, clamped to the ends.
    pub(crate) fn row_at(&mut self, y: u32) -> Option<usize> {
        self.validate();
        let ctx = self.context();
        let geometry = self.strategy();
        let slot = geometry.slot_at(&self.tree, y, &ctx)?;
        geometry.row_for(&self.tree, slot, &ctx)
    }

    /// Sum of the heights of all shown rows.
    pub fn preferred_height(&mut self) -> u32 {
        self.validate();
        self.strategy().preferred_height(&self.tree, &self.context())
    }

    /// Rightmost edge over the shown rows, or over `rows` when given.
    pub fn preferred_width(&mut self, rows: Option<Range<usize>>) -> u32 {
        self.validate();
        let rows = rows.unwrap_or(0..self.tree.row_count(self.root_visible));
        let ctx = self.context();
        let geometry = self.strategy();
        let first = geometry.slot_for_row(&self.tree, rows.start, &ctx);
        std::iter::successors(first, |&slot| self.tree.next_slot(slot))
            .take(rows.len())
            .filter_map(|slot| geometry.bounds(&self.tree, slot, &ctx))
            .map(|bounds| bounds.right())
            .max()
            .unwrap_or(0)
    }

    // ---- invalidation -----------------------------------------------------

    /// Drops every cached size; the next query re-measures all shown rows.
    pub fn invalidate_sizes(&mut self) {
        if let Some(root) = self.tree.root() {
            self.tree.invalidate_subtree(root);
        }
    }

    /// Marks the size of the row showing `path` stale.
    pub fn invalidate_path_bounds(&mut self, path: &TreePath<M::Node>) {
        if let Some((key, _)) = self.tree.nearest_node_for_path(path) {
            self.tree.invalidate(key);
        }
    }

    // ---- notifications ----------------------------------------------------

    /// Nodes changed in place: their sizes may differ, the structure did not.
    pub fn tree_nodes_changed(&mut self, event: &TreeModelEvent<M::Node>) -> Result<()> {
        event.check()?;
        let Some((key, exact)) = self.tree.nearest_node_for_path(&event.path) else {
            debug!(path = ?event.path, "change outside the shadow tree ignored");
            return Ok(());
        };
        if exact && let Some(model) = self.model.as_ref() {
            for &index in &event.child_indices {
                let handle = self.tree.model_child_at(key, model, index).cloned();
                if let Some(child) = handle.and_then(|handle| self.tree.find_child(key, &handle)) {
                    self.tree.invalidate(child);
                }
            }
            for handle in &event.children {
                if let Some(child) = self.tree.find_child(key, handle) {
                    self.tree.invalidate(child);
                }
            }
        }
        self.tree.invalidate(key);
        trace!(path = ?event.path, "tree nodes changed");
        Ok(())
    }

    /// Children were inserted under `event.path` at `event.child_indices`.
    pub fn tree_nodes_inserted(&mut self, event: &TreeModelEvent<M::Node>) -> Result<()> {
        event.check()?;
        if let Some(model) = self.model.as_ref() {
            let len = model.child_count(event.path.last());
            if let Some(&index) = event.child_indices.iter().find(|&&index| index >= len) {
                return Err(LayoutError::ChildIndexOutOfRange { index, len });
            }
        }
        match self.tree.nearest_node_for_path(&event.path) {
            Some((key, true)) => self.tree.invalidate_tree_part_below(key),
            Some((key, false)) => self.tree.invalidate(key),
            None => {
                debug!(path = ?event.path, "insertion outside the shadow tree ignored");
                return Ok(());
            }
        }
        debug!(path = ?event.path, count = event.child_indices.len(), "tree nodes inserted");
        self.reset_row_selection();
        Ok(())
    }

    /// Children were removed from `event.path`.
    ///
    /// The removed handles come from `event.children`, or from the cached child
    /// list when only indices are given. A parent left without children collapses.
    pub fn tree_nodes_removed(&mut self, event: &TreeModelEvent<M::Node>) -> Result<()> {
        event.check()?;
        let Some((key, exact)) = self.tree.nearest_node_for_path(&event.path) else {
            debug!(path = ?event.path, "removal outside the shadow tree ignored");
            return Ok(());
        };
        if exact {
            let removed = if event.children.is_empty() {
                self.tree.cached_children_at(key, &event.child_indices)?
            } else {
                event.children.clone()
            };
            for handle in &removed {
                if let Some(child) = self.tree.find_child(key, handle) {
                    self.tree.remove_child(key, child);
                }
            }
            self.tree.invalidate_tree_part_below(key);
            if let Some(model) = self.model.as_ref()
                && self.tree.model_child_count(key, model) == 0
            {
                self.tree.set_collapsed(key);
            }
        } else {
            self.tree.invalidate(key);
        }
        debug!(path = ?event.path, "tree nodes removed");
        self.reset_row_selection();
        Ok(())
    }

    /// The subtree at `event.path` changed arbitrarily; its state nodes are rebuilt lazily.
    pub fn tree_structure_changed(&mut self, event: &TreeModelEvent<M::Node>) -> Result<()> {
        event.check()?;
        let Some(model) = self.model.as_ref() else {
            return Ok(());
        };
        if event.path.parent().is_none() {
            let current = model.root();
            let keeps_root = self.tree.root().filter(|&root| {
                let handle = self.tree.node(root).handle();
                current.as_ref() == Some(handle) && handle == event.path.last()
            });
            if let Some(root) = keeps_root {
                self.tree.remove_all_children(root);
                if model.is_leaf(self.tree.node(root).handle()) {
                    self.tree.set_collapsed(root);
                }
                self.tree.invalidate(root);
            } else {
                self.tree.reset(model);
            }
        } else {
            let Some(key) = self.tree.node_for_path(&event.path) else {
                debug!(path = ?event.path, "structure change outside the shadow tree ignored");
                return Ok(());
            };
            self.tree.remove_all_children(key);
            if model.is_leaf(self.tree.node(key).handle()) {
                self.tree.set_collapsed(key);
            }
            self.tree.invalidate_tree_part_below(key);
        }
        debug!(path = ?event.path, "tree structure changed");
        self.reset_row_selection();
        Ok(())
    }

    fn reset_row_selection(&mut self) {
        if let Some(mut selection) = self.selection.take() {
            selection.reset_row_selection(self);
            self.selection = Some(selection);
        }
    }
}

impl<M: TreeModel> RowMapper<M::Node> for TreeLayoutCache<M> {
    fn rows_for_paths(&mut self, paths: &[TreePath<M::Node>]) -> Vec<Option<usize>> {
        paths.iter().map(|path| self.row_for_path(path)).collect()
    }
}
