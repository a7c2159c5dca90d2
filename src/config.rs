/// Construction-time settings of a [`TreeLayoutCache`](crate::TreeLayoutCache).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeLayoutConfig {
    /// Whether the root occupies row 0.
    pub root_visible: bool,
    /// Every row has height `row_height` instead of the measured one.
    pub fixed_height: bool,
    /// Row height; must be positive in fixed mode. In variable mode a positive
    /// value pins every row to it and 0 means "measure each row".
    pub row_height: u32,
}

impl TreeLayoutConfig {
    /// Variable-height layout with a visible root.
    pub const fn variable() -> Self {
        Self {
            root_visible: true,
            fixed_height: false,
            row_height: 0,
        }
    }

    /// Fixed-height layout with a visible root.
    pub const fn fixed(row_height: u32) -> Self {
        Self {
            root_visible: true,
            fixed_height: true,
            row_height,
        }
    }

    #[must_use]
    pub const fn with_root_visible(mut self, root_visible: bool) -> Self {
        self.root_visible = root_visible;
        self
    }
}

impl Default for TreeLayoutConfig {
    fn default() -> Self {
        Self::variable()
    }
}
