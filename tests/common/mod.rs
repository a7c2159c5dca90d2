#![allow(dead_code)]

use tui_treelayout::{TreeLayoutCache, TreeModel, TreePath};

/// Index-addressed tree; node ids are never reused, detached nodes keep their id.
#[derive(Clone, Debug)]
pub struct ArenaTree {
    children: Vec<Vec<u32>>,
    parents: Vec<Option<u32>>,
}

impl ArenaTree {
    pub fn with_root() -> Self {
        Self {
            children: vec![Vec::new()],
            parents: vec![None],
        }
    }

    /// Node `i + 1` hangs under `parents[i] % (i + 1)`, which always names an earlier node.
    pub fn from_parents(parents: &[usize]) -> Self {
        let mut tree = Self::with_root();
        for (index, &parent) in parents.iter().enumerate() {
            let parent = u32::try_from(parent % (index + 1)).expect("small tree");
            let len = tree.children[parent as usize].len();
            tree.add(parent, len);
        }
        tree
    }

    /// Every node down to `depth` gets `fanout` children.
    pub fn balanced(depth: usize, fanout: usize) -> Self {
        let mut tree = Self::with_root();
        let mut level = vec![0];
        for _ in 0..depth {
            let mut next = Vec::with_capacity(level.len() * fanout);
            for &parent in &level {
                for index in 0..fanout {
                    next.push(tree.add(parent, index));
                }
            }
            level = next;
        }
        tree
    }

    /// Inserts a new leaf under `parent` at `index` (clamped) and returns it.
    pub fn add(&mut self, parent: u32, index: usize) -> u32 {
        let id = u32::try_from(self.children.len()).expect("small tree");
        self.children.push(Vec::new());
        self.parents.push(Some(parent));
        let siblings = &mut self.children[parent as usize];
        siblings.insert(index.min(siblings.len()), id);
        id
    }

    /// Detaches `node` from its parent, returning the parent and the old index.
    pub fn detach(&mut self, node: u32) -> Option<(u32, usize)> {
        let parent = self.parents[node as usize]?;
        let siblings = &mut self.children[parent as usize];
        let index = siblings.iter().position(|&child| child == node)?;
        siblings.remove(index);
        self.parents[node as usize] = None;
        Some((parent, index))
    }

    pub fn reverse_children(&mut self, node: u32) {
        self.children[node as usize].reverse();
    }

    pub fn path(&self, node: u32) -> TreePath<u32> {
        let mut components = vec![node];
        let mut current = node;
        while let Some(parent) = self.parents[current as usize] {
            components.push(parent);
            current = parent;
        }
        components.reverse();
        TreePath::from_components(components).expect("non-empty path")
    }

    /// Nodes reachable from the root, in preorder.
    pub fn attached(&self) -> Vec<u32> {
        let mut order = Vec::new();
        let mut stack = vec![0];
        while let Some(node) = stack.pop() {
            order.push(node);
            stack.extend(self.children[node as usize].iter().rev());
        }
        order
    }
}

impl TreeModel for ArenaTree {
    type Node = u32;

    fn root(&self) -> Option<u32> {
        Some(0)
    }

    fn child_count(&self, node: &u32) -> usize {
        self.children[*node as usize].len()
    }

    fn child(&self, node: &u32, index: usize) -> Option<u32> {
        self.children[*node as usize].get(index).copied()
    }
}

/// Shown paths computed by a plain preorder walk over the model, trusting the
/// cache only for expansion flags.
pub fn expected_rows(cache: &TreeLayoutCache<ArenaTree>) -> Vec<TreePath<u32>> {
    let Some(model) = cache.model() else {
        return Vec::new();
    };
    let root = model.path(0);
    let mut rows = Vec::new();
    if cache.is_root_visible() {
        rows.push(root.clone());
    }
    if cache.is_expanded(&root) {
        walk_children(model, cache, &root, &mut rows);
    }
    rows
}

fn walk_children(
    model: &ArenaTree,
    cache: &TreeLayoutCache<ArenaTree>,
    parent: &TreePath<u32>,
    rows: &mut Vec<TreePath<u32>>,
) {
    for index in 0..model.child_count(parent.last()) {
        let child = model.child(parent.last(), index).expect("index in range");
        let path = parent.by_adding_child(child);
        rows.push(path.clone());
        if cache.is_expanded(&path) {
            walk_children(model, cache, &path, rows);
        }
    }
}

/// Builds a fixed-height cache with row height 1 over `model`.
pub fn fixed_cache(model: ArenaTree) -> TreeLayoutCache<ArenaTree> {
    TreeLayoutCache::with_config(tui_treelayout::TreeLayoutConfig::fixed(1))
        .expect("positive height")
        .with_model(model)
}
