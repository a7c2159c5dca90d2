use thiserror::Error;

/// Result alias used by fallible layout-cache operations.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Failures surfaced to callers of the layout cache.
///
/// A failing call never leaves the shadow tree half-updated: arguments are
/// checked before anything is mutated.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// Fixed-height layout was configured with a zero row height.
    #[error("fixed row height must be positive, got {0}")]
    InvalidRowHeight(u32),

    /// A path was built from an empty component list.
    #[error("a tree path needs at least one component")]
    EmptyPath,

    /// A notification referenced a child index the parent does not have.
    #[error("child index {index} is out of range for a node with {len} children")]
    ChildIndexOutOfRange { index: usize, len: usize },

    /// A notification carried child indices and child handles of different lengths.
    #[error("event lists {indices} child indices but {children} child nodes")]
    MismatchedEvent { indices: usize, children: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_row_height_display() {
        let err = LayoutError::InvalidRowHeight(0);
        assert_eq!(err.to_string(), "fixed row height must be positive, got 0");
    }

    #[test]
    fn out_of_range_display_names_both_bounds() {
        let err = LayoutError::ChildIndexOutOfRange { index: 4, len: 2 };
        assert_eq!(
            err.to_string(),
            "child index 4 is out of range for a node with 2 children"
        );
    }

    #[test]
    fn mismatched_event_display() {
        let err = LayoutError::MismatchedEvent {
            indices: 2,
            children: 1,
        };
        assert!(err.to_string().contains("2 child indices"));
    }
}
