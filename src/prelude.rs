pub use crate::{
    Bounds, LayoutError, NodeDimensions, RowMapper, RowSelection, TreeLayoutCache,
    TreeLayoutConfig, TreeModel, TreeModelEvent, TreePath, TreeScrollPolicy, TreeViewport,
    VisiblePaths,
};
