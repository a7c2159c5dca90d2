//! Incremental row and geometry layout cache for lazily materialized trees.
//!
//! [`TreeLayoutCache`] answers the questions a tree view asks while drawing and
//! hit-testing: how many rows are shown, which path sits on a row, where a row
//! is and which row lies under a point. It mirrors only the expanded part of a
//! [`TreeModel`] and recomputes what structural notifications invalidated.
//!
//! Rows either share one height (fixed mode) or take the height reported by a
//! [`NodeDimensions`] callback (variable mode). [`TreeViewport`] maps the cache
//! onto a ratatui [`Rect`](ratatui::layout::Rect).

mod cache;
mod config;
mod error;
mod event;
mod fixed;
mod geometry;
mod model;
mod node;
mod path;
pub mod prelude;
mod selection;
mod shadow;
#[cfg(test)]
mod testing;
mod variable;
mod viewport;
mod visible;

pub use cache::TreeLayoutCache;
pub use config::TreeLayoutConfig;
pub use error::{LayoutError, Result};
pub use event::TreeModelEvent;
pub use geometry::Bounds;
pub use model::{NodeDimensions, TreeModel};
pub use path::TreePath;
pub use selection::{RowMapper, RowSelection};
pub use viewport::{TreeScrollPolicy, TreeViewport};
pub use visible::VisiblePaths;
