use std::path::Path;

use crate::app::{AppConfig, ExportFormat};
use crate::io;
use crate::tree::layout::RadialLayout;
use crate::tree::Tree;

pub fn render_preview(tree: &Tree, layout: &RadialLayout, config: &AppConfig) {
    println!("{}", summary(tree, layout, config));
}

/// Plain-text overview of what is about to be drawn.
pub fn summary(tree: &Tree, layout: &RadialLayout, config: &AppConfig) -> String {
    let (first, last) = tree.year_range();
    let branch_types = tree.branch_types();
    let extinct = tree
        .reachable()
        .into_iter()
        .filter(|&id| tree.nodes[id].record.extinct)
        .count();
    let depth = tree.depths().into_iter().flatten().max().unwrap_or(0);
    let span_degrees = layout.config.angle_span().to_degrees();

    let mut lines = vec![
        format!(
            "Loaded {} AI models ({}-{}), {} evolutionary connections.",
            layout.len(),
            first,
            last,
            layout.edges.len()
        ),
        format!(
            "{} leaves, depth {}, {} extinct lineages, {} branch types.",
            layout.leaf_count,
            depth,
            extinct,
            branch_types.len()
        ),
        format!(
            "Layout: {} preset, {:.0}° sweep{}, exponent {}, {}x{} px.",
            config.preset.name(),
            span_degrees,
            if config.preset.is_full_circle() {
                " (full circle)"
            } else {
                ""
            },
            layout.config.exponent,
            config.width,
            config.height
        ),
    ];

    if !tree.orphans().is_empty() {
        let names: Vec<&str> = tree
            .orphans()
            .iter()
            .map(|&id| tree.nodes[id].name())
            .collect();
        lines.push(format!(
            "{} record(s) left out of the tree: {}",
            names.len(),
            names.join(", ")
        ));
    }
    lines.join("\n")
}

pub fn report_outputs(dir: &Path, stem: &str, formats: &[ExportFormat], labeled: usize) {
    for &format in formats {
        println!("✓ {}", io::output_path(dir, stem, format).display());
    }
    println!("{labeled} key innovations labeled.");
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::data::ai_models;
    use crate::tree::tests::{record, sample_tree};

    #[test]
    fn summarizes_sample_tree() {
        let tree = sample_tree();
        let config = AppConfig::parse_from(["ailineage", "--preset", "radial"]);
        let layout = RadialLayout::from_tree(&tree, &config.layout_config().unwrap());
        let text = summary(&tree, &layout, &config);

        assert!(text.contains("Loaded 6 AI models (1958-2023), 5 evolutionary connections."));
        assert!(text.contains("4 leaves, depth 2, 0 extinct lineages, 1 branch types."));
        assert!(text.contains("radial preset, 360° sweep (full circle)"));
        assert!(!text.contains("left out"));
    }

    #[test]
    fn lists_orphans() {
        let mut records = ai_models();
        records.push(record("Stray", Some("Nowhere"), 2024));
        let tree = Tree::from_records(&records).unwrap();
        let config = AppConfig::parse_from(["ailineage"]);
        let layout = RadialLayout::from_tree(&tree, &config.layout_config().unwrap());

        let text = summary(&tree, &layout, &config);
        assert!(text.contains("1 record(s) left out of the tree: Stray"));
        assert!(text.contains("fan preset, 270° sweep,"));
    }

    #[test]
    fn lists_records_caught_in_a_cycle() {
        let records = vec![
            record("Perceptron", None, 1958),
            record("Loop A", Some("Loop B"), 1990),
            record("Loop B", Some("Loop A"), 1991),
        ];
        let tree = Tree::from_records(&records).unwrap();
        let config = AppConfig::parse_from(["ailineage"]);
        let layout = RadialLayout::from_tree(&tree, &config.layout_config().unwrap());

        let text = summary(&tree, &layout, &config);
        assert!(text.contains("2 record(s) left out of the tree: Loop A, Loop B"));
    }
}
