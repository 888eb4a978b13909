use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::io;
use crate::tree::{NodeId, Tree};

/// One node of the nested hierarchy consumed by D3's `d3.hierarchy`.
#[derive(Debug, Serialize, PartialEq)]
pub struct HierarchyNode<'a> {
    pub name: &'a str,
    pub year: i32,
    pub color: &'a str,
    pub importance: u8,
    pub branch_type: &'a str,
    pub extinct: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<HierarchyNode<'a>>,
}

pub fn hierarchy(tree: &Tree) -> HierarchyNode<'_> {
    build_node(tree, tree.root)
}

fn build_node(tree: &Tree, id: NodeId) -> HierarchyNode<'_> {
    let node = &tree.nodes[id];
    let record = &node.record;
    HierarchyNode {
        name: &record.name,
        year: record.year,
        color: &record.color,
        importance: record.importance,
        branch_type: &record.branch_type,
        extinct: record.extinct,
        children: node
            .children
            .iter()
            .map(|&child| build_node(tree, child))
            .collect(),
    }
}

pub fn hierarchy_json(tree: &Tree) -> Result<String> {
    serde_json::to_string_pretty(&hierarchy(tree)).context("failed to serialize hierarchy")
}

pub fn export_json(tree: &Tree, path: &Path) -> Result<()> {
    io::write_text(path, &hierarchy_json(tree)?)
}
