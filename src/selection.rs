use crate::path::TreePath;

/// Capability to translate paths into display rows.
///
/// Implemented by the layout cache and handed to the selection collaborator so
/// path-based and row-based selection stay in sync.
pub trait RowMapper<N> {
    /// Maps every path independently; `None` marks paths that have no row.
    fn rows_for_paths(&mut self, paths: &[TreePath<N>]) -> Vec<Option<usize>>;
}

/// External selection model notified when cached row numbers go stale.
pub trait RowSelection<N> {
    /// Recomputes row-based selection state through `rows`.
    fn reset_row_selection(&mut self, rows: &mut dyn RowMapper<N>);
}

impl<N, F> RowSelection<N> for F
where
    F: FnMut(&mut dyn RowMapper<N>),
{
    #[inline]
    fn reset_row_selection(&mut self, rows: &mut dyn RowMapper<N>) {
        self(rows);
    }
}
