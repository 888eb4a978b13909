use std::path::Path;

use anyhow::Result;

use crate::io;
use crate::tree::{NodeId, Tree};

/// Newick labels cannot carry spaces, dashes or dots.
pub fn clean_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ' ' | '-' | '.' => '_',
            other => other,
        })
        .collect()
}

/// Serialize the rooted tree; branch lengths are decades since the earliest year.
pub fn to_newick(tree: &Tree) -> String {
    let (min_year, _) = tree.year_range();
    let mut out = String::new();
    write_node(tree, tree.root, min_year, &mut out);
    out.push(';');
    out
}

fn write_node(tree: &Tree, id: NodeId, min_year: i32, out: &mut String) {
    let node = &tree.nodes[id];
    if !node.children.is_empty() {
        out.push('(');
        for (i, &child) in node.children.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            write_node(tree, child, min_year, out);
        }
        out.push(')');
    }
    let length = f64::from(node.record.year - min_year) / 10.0;
    out.push_str(&format!("{}:{:.1}", clean_name(node.name()), length));
}

pub fn export_newick(tree: &Tree, path: &Path) -> Result<()> {
    io::write_text(path, &to_newick(tree))
}
