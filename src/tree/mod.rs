use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

use crate::data::ModelRecord;

pub mod labels;
pub mod layout;
pub mod painter;
pub mod scene_graph;
pub mod skia_renderer;

pub type NodeId = usize;

/// Failures while turning records into a rooted tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The records do not contain exactly one parentless entry.
    MissingRoot { found: usize },
    DuplicateName { name: String },
    InvalidImportance { name: String, importance: u8 },
    InvalidColor { name: String, color: String },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeError::MissingRoot { found } => {
                write!(f, "expected exactly one record without a parent, found {found}")
            }
            TreeError::DuplicateName { name } => write!(f, "duplicate model name: {name}"),
            TreeError::InvalidImportance { name, importance } => {
                write!(f, "importance of {name} must be within 1..=5, got {importance}")
            }
            TreeError::InvalidColor { name, color } => {
                write!(f, "color of {name} is not a hex color: {color}")
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// Lineage tree stored as an arena; `NodeId` is the record's input index.
#[derive(Debug, Clone)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
    pub root: NodeId,
    index: HashMap<String, NodeId>,
    orphans: Vec<NodeId>,
}

impl Tree {
    /// Two-pass build: index every record by name, then link children in input order.
    pub fn from_records(records: &[ModelRecord]) -> Result<Self, TreeError> {
        let mut index = HashMap::with_capacity(records.len());
        let mut nodes = Vec::with_capacity(records.len());

        for (id, record) in records.iter().enumerate() {
            if !(1..=5).contains(&record.importance) {
                return Err(TreeError::InvalidImportance {
                    name: record.name.clone(),
                    importance: record.importance,
                });
            }
            if painter::parse_hex_color(&record.color).is_none() {
                return Err(TreeError::InvalidColor {
                    name: record.name.clone(),
                    color: record.color.clone(),
                });
            }
            if index.insert(record.name.clone(), id).is_some() {
                return Err(TreeError::DuplicateName {
                    name: record.name.clone(),
                });
            }
            nodes.push(TreeNode::new(id, record.clone()));
        }

        let roots: Vec<NodeId> = nodes
            .iter()
            .filter(|node| node.record.is_root())
            .map(|node| node.id)
            .collect();
        if roots.len() != 1 {
            return Err(TreeError::MissingRoot { found: roots.len() });
        }
        let root = roots[0];

        let mut orphans = Vec::new();
        for id in 0..nodes.len() {
            let Some(parent_name) = nodes[id].record.parent.clone() else {
                continue;
            };
            match index.get(&parent_name) {
                Some(&parent_id) => {
                    nodes[id].parent = Some(parent_id);
                    nodes[parent_id].children.push(id);
                }
                None => {
                    warn!(
                        "dropping edge {} -> {}: parent is not in the dataset",
                        parent_name, nodes[id].record.name
                    );
                    orphans.push(id);
                }
            }
        }

        let mut tree = Self {
            nodes,
            root,
            index,
            orphans,
        };
        tree.flag_detached();
        debug!(
            "built tree with {} node(s), {} reachable, {} leaf/leaves",
            tree.len(),
            tree.reachable().len(),
            tree.leaf_count()
        );
        Ok(tree)
    }

    /// Records whose parent resolved but whose ancestry never reaches the
    /// root, i.e. members of a parent cycle or descendants of an orphan.
    fn flag_detached(&mut self) {
        let mut attached = vec![false; self.nodes.len()];
        for id in self.reachable() {
            attached[id] = true;
        }
        for id in 0..self.nodes.len() {
            if attached[id] || self.orphans.contains(&id) {
                continue;
            }
            let parent = self.nodes[id].parent.map_or("?", |p| self.nodes[p].name());
            warn!(
                "leaving out {}: its ancestry via {} never reaches {}",
                self.nodes[id].name(),
                parent,
                self.root().name()
            );
            self.orphans.push(id);
        }
        self.orphans.sort_unstable();
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    pub fn node_by_name(&self, name: &str) -> Option<&TreeNode> {
        self.index.get(name).and_then(|&id| self.nodes.get(id))
    }

    pub fn id_of(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    pub fn root(&self) -> &TreeNode {
        &self.nodes[self.root]
    }

    /// Records outside the rooted tree: dangling parents, cycles and their descendants.
    pub fn orphans(&self) -> &[NodeId] {
        &self.orphans
    }

    /// Node ids reachable from the root, in pre-order.
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id].children.iter().rev());
        }
        order
    }

    /// (parent, child) pairs of the rooted tree, in pre-order of the child.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.reachable()
            .into_iter()
            .filter_map(|id| self.nodes[id].parent.map(|parent| (parent, id)))
            .collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.reachable()
            .into_iter()
            .filter(|&id| self.nodes[id].is_leaf())
            .count()
    }

    /// Number of leaves under each node; zero for nodes outside the rooted tree.
    pub fn leaf_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.nodes.len()];

        fn count_leaves(node_id: NodeId, nodes: &[TreeNode], counts: &mut [usize]) -> usize {
            let node = &nodes[node_id];
            if node.is_leaf() {
                counts[node_id] = 1;
                return 1;
            }

            let mut total = 0;
            for &child_id in &node.children {
                total += count_leaves(child_id, nodes, counts);
            }
            counts[node_id] = total;
            total
        }

        count_leaves(self.root, &self.nodes, &mut counts);
        counts
    }

    /// Subtree sizes including the node itself.
    pub fn descendant_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.nodes.len()];

        fn count_subtree(node_id: NodeId, nodes: &[TreeNode], counts: &mut [usize]) -> usize {
            let mut total = 1;
            for &child_id in &nodes[node_id].children {
                total += count_subtree(child_id, nodes, counts);
            }
            counts[node_id] = total;
            total
        }

        count_subtree(self.root, &self.nodes, &mut counts);
        counts
    }

    /// Edge distance from the root; `None` outside the rooted tree.
    pub fn depths(&self) -> Vec<Option<usize>> {
        let mut depths = vec![None; self.nodes.len()];
        let mut stack = vec![(self.root, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            depths[id] = Some(depth);
            for &child in &self.nodes[id].children {
                stack.push((child, depth + 1));
            }
        }
        depths
    }

    /// Distinct branch types of the rooted tree in first-seen order.
    pub fn branch_types(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for id in self.reachable() {
            let kind = self.nodes[id].record.branch_type.as_str();
            if !seen.contains(&kind) {
                seen.push(kind);
            }
        }
        seen
    }

    pub fn year_range(&self) -> (i32, i32) {
        self.reachable()
            .into_iter()
            .map(|id| self.nodes[id].record.year)
            .fold((i32::MAX, i32::MIN), |(lo, hi), year| (lo.min(year), hi.max(year)))
    }
}

/// Node within the lineage tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub id: NodeId,
    pub record: ModelRecord,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl TreeNode {
    pub fn new(id: NodeId, record: ModelRecord) -> Self {
        Self {
            id,
            record,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none() && self.record.is_root()
    }
}
