use std::collections::HashMap;
use std::f64::consts::PI;

use clap::ValueEnum;

use super::{NodeId, Tree};

mod radial;

/// How a parent's angular span is shared among its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SpanWeight {
    /// Proportional to the number of leaves under each child.
    #[default]
    #[value(name = "leaf")]
    LeafCount,
    /// Proportional to the size of each child's subtree, the child included.
    #[value(name = "descendant")]
    DescendantCount,
}

/// Where an internal node sits inside its own span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ParentAnchor {
    /// Mean of the children's angles.
    #[default]
    #[value(name = "mean")]
    ChildMean,
    /// Midpoint of the span the node was given.
    #[value(name = "midpoint")]
    SpanMidpoint,
}

/// Named interval/exponent combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LayoutPreset {
    /// Full circle, linear time axis.
    Radial,
    /// Full circle, slightly compressed early history.
    Artistic,
    /// Upper half circle.
    Semicircular,
    /// Wide fan for large-format prints.
    Poster,
    /// 270 degree fan.
    #[default]
    Fan,
}

impl LayoutPreset {
    pub fn config(self) -> RadialLayoutConfig {
        let (angle_min, angle_max, exponent) = match self {
            LayoutPreset::Radial => (-PI, PI, 1.0),
            LayoutPreset::Artistic => (-PI, PI, 0.9),
            LayoutPreset::Semicircular => (-PI / 2.0, PI / 2.0, 0.85),
            LayoutPreset::Poster => (-PI / 1.8, PI / 1.8, 0.88),
            LayoutPreset::Fan => (-PI * 0.75, PI * 0.75, 0.85),
        };
        RadialLayoutConfig {
            angle_min,
            angle_max,
            exponent,
            ..RadialLayoutConfig::default()
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LayoutPreset::Radial => "radial",
            LayoutPreset::Artistic => "artistic",
            LayoutPreset::Semicircular => "semicircular",
            LayoutPreset::Poster => "poster",
            LayoutPreset::Fan => "fan",
        }
    }

    /// Full-circle presets put the root in the middle of the canvas; fans sit
    /// near the bottom edge.
    pub fn is_full_circle(self) -> bool {
        matches!(self, LayoutPreset::Radial | LayoutPreset::Artistic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialLayoutConfig {
    pub angle_min: f64,
    pub angle_max: f64,
    pub min_year: i32,
    pub max_year: i32,
    /// Power applied to the normalized year; below 1 spreads recent years apart.
    pub exponent: f64,
    pub weight: SpanWeight,
    pub anchor: ParentAnchor,
}

impl Default for RadialLayoutConfig {
    fn default() -> Self {
        Self {
            angle_min: -PI,
            angle_max: PI,
            min_year: 1958,
            max_year: 2026,
            exponent: 1.0,
            weight: SpanWeight::LeafCount,
            anchor: ParentAnchor::ChildMean,
        }
    }
}

impl RadialLayoutConfig {
    /// Normalized radius in `[0, 1]` for a year.
    pub fn radius_for_year(&self, year: f64) -> f64 {
        let range = f64::from(self.max_year - self.min_year);
        if range <= 0.0 {
            return 0.0;
        }
        let progress = ((year - f64::from(self.min_year)) / range).clamp(0.0, 1.0);
        progress.powf(self.exponent).clamp(0.0, 1.0)
    }

    pub fn angle_span(&self) -> f64 {
        self.angle_max - self.angle_min
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionedNode {
    pub id: NodeId,
    pub radius: f64,
    pub angle: f64,
    /// The angular span the node was given by its parent.
    pub span: (f64, f64),
}

impl PositionedNode {
    pub fn span_width(&self) -> f64 {
        self.span.1 - self.span.0
    }
}

#[derive(Debug, Clone)]
pub struct RadialLayout {
    /// Indexed by `NodeId`; `None` for records outside the rooted tree.
    pub positions: Vec<Option<PositionedNode>>,
    pub edges: Vec<(NodeId, NodeId)>,
    pub leaf_count: usize,
    pub config: RadialLayoutConfig,
}

impl RadialLayout {
    /// Lay out every node reachable from the root.
    pub fn from_tree(tree: &Tree, config: &RadialLayoutConfig) -> Self {
        radial::build(tree, config)
    }

    pub fn from_preset(tree: &Tree, preset: LayoutPreset) -> Self {
        Self::from_tree(tree, &preset.config())
    }

    pub fn get(&self, id: NodeId) -> Option<&PositionedNode> {
        self.positions.get(id).and_then(Option::as_ref)
    }

    pub fn by_name(&self, tree: &Tree, name: &str) -> Option<&PositionedNode> {
        tree.id_of(name).and_then(|id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionedNode> {
        self.positions.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Positions keyed by model name.
    pub fn named<'t>(&self, tree: &'t Tree) -> HashMap<&'t str, PositionedNode> {
        self.iter()
            .map(|pos| (tree.nodes[pos.id].name(), *pos))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ai_models;
    use crate::tree::tests::{record, sample_tree};

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn worked_example_spans_and_radii() {
        let tree = sample_tree();
        let layout = RadialLayout::from_tree(&tree, &RadialLayoutConfig::default());
        let named = layout.named(&tree);

        let a = named["A"];
        let b = named["B"];
        assert_close(a.span_width(), PI / 2.0);
        assert_close(b.span_width(), 3.0 * PI / 2.0);
        assert_close(a.span.0, -PI);
        assert_close(a.angle, -3.0 * PI / 4.0);
        assert_close(a.radius, 28.0 / 68.0);

        for child in ["B1", "B2", "B3"] {
            let pos = named[child];
            assert_close(pos.span_width(), PI / 2.0);
            assert_close(pos.radius, 65.0 / 68.0);
        }
        assert_close(named["B1"].angle, -PI / 4.0);
        assert_close(named["B2"].angle, PI / 4.0);
        assert_close(named["B3"].angle, 3.0 * PI / 4.0);

        // B sits at the mean of its children, the root at the mean of A and B.
        assert_close(b.angle, PI / 4.0);
        assert_close(named["Perceptron"].angle, (a.angle + b.angle) / 2.0);
        assert_close(named["Perceptron"].radius, 0.0);
    }

    #[test]
    fn midpoint_anchor_centers_parent_in_span() {
        let tree = sample_tree();
        let config = RadialLayoutConfig {
            anchor: ParentAnchor::SpanMidpoint,
            ..RadialLayoutConfig::default()
        };
        let layout = RadialLayout::from_tree(&tree, &config);
        assert_close(layout.by_name(&tree, "Perceptron").unwrap().angle, 0.0);
        assert_close(layout.by_name(&tree, "B").unwrap().angle, PI / 4.0);
    }

    #[test]
    fn split_ratio_matches_leaf_counts() {
        let tree = sample_tree();
        let layout = RadialLayout::from_tree(&tree, &RadialLayoutConfig::default());
        let a = layout.by_name(&tree, "A").unwrap();
        let b = layout.by_name(&tree, "B").unwrap();
        assert_close(b.span_width() / a.span_width(), 3.0);
    }

    #[test]
    fn descendant_weight_counts_internal_nodes() {
        let tree = sample_tree();
        let config = RadialLayoutConfig {
            weight: SpanWeight::DescendantCount,
            ..RadialLayoutConfig::default()
        };
        let layout = RadialLayout::from_tree(&tree, &config);
        let a = layout.by_name(&tree, "A").unwrap();
        let b = layout.by_name(&tree, "B").unwrap();
        // A: 1 node, B: 4 nodes.
        assert_close(b.span_width() / a.span_width(), 4.0);
        assert_close(a.span_width() + b.span_width(), 2.0 * PI);
    }

    #[test]
    fn single_child_chain_stays_centered() {
        let records = vec![
            record("Perceptron", None, 1958),
            record("X", Some("Perceptron"), 1990),
            record("Y", Some("X"), 2020),
        ];
        let tree = Tree::from_records(&records).unwrap();
        let layout = RadialLayout::from_tree(&tree, &RadialLayoutConfig::default());

        let x = layout.by_name(&tree, "X").unwrap();
        let y = layout.by_name(&tree, "Y").unwrap();
        assert_close(x.angle, 0.0);
        assert_close(y.angle, 0.0);
        assert_close(x.span_width(), 2.0 * PI);
        assert!(x.radius < y.radius);
    }

    #[test]
    fn single_node_occupies_full_span() {
        let tree = Tree::from_records(&[record("Only", None, 2000)]).unwrap();
        let layout = RadialLayout::from_tree(&tree, &RadialLayoutConfig::default());
        let only = layout.get(0).unwrap();
        assert_close(only.angle, 0.0);
        assert_close(only.span_width(), 2.0 * PI);
        assert_eq!(layout.leaf_count, 1);
    }

    #[test]
    fn builtin_positions_stay_in_bounds() {
        let tree = Tree::from_records(&ai_models()).unwrap();
        for preset in LayoutPreset::value_variants() {
            let config = preset.config();
            let layout = RadialLayout::from_tree(&tree, &config);
            assert_eq!(layout.len(), tree.len());
            assert_eq!(layout.edges.len(), tree.len() - 1);

            let (lo, hi) = (
                config.angle_min.min(config.angle_max),
                config.angle_min.max(config.angle_max),
            );
            for pos in layout.iter() {
                assert!((0.0..=1.0).contains(&pos.radius), "{:?}", pos);
                assert!(pos.angle >= lo - EPS && pos.angle <= hi + EPS, "{:?}", pos);
            }
        }
    }

    #[test]
    fn radius_is_monotonic_in_year() {
        let tree = Tree::from_records(&ai_models()).unwrap();
        let layout = RadialLayout::from_preset(&tree, LayoutPreset::Fan);

        let mut pairs: Vec<(i32, f64)> = layout
            .iter()
            .map(|pos| (tree.nodes[pos.id].record.year, pos.radius))
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.total_cmp(&b.1)));
        for window in pairs.windows(2) {
            assert!(window[0].1 <= window[1].1, "{:?}", window);
        }
    }

    #[test]
    fn radius_is_clamped_and_handles_empty_range() {
        let config = RadialLayoutConfig::default();
        assert_eq!(config.radius_for_year(1900.0), 0.0);
        assert_eq!(config.radius_for_year(2100.0), 1.0);

        let flat = RadialLayoutConfig {
            min_year: 2000,
            max_year: 2000,
            ..RadialLayoutConfig::default()
        };
        assert_eq!(flat.radius_for_year(2024.0), 0.0);

        let warped = RadialLayoutConfig {
            exponent: 0.5,
            ..RadialLayoutConfig::default()
        };
        assert_close(warped.radius_for_year(1958.0 + 17.0), 0.5);
    }

    #[test]
    fn layout_is_deterministic() {
        let tree = Tree::from_records(&ai_models()).unwrap();
        let config = LayoutPreset::Artistic.config();
        let first = RadialLayout::from_tree(&tree, &config);
        let second = RadialLayout::from_tree(&tree, &config);
        for (a, b) in first.positions.iter().zip(&second.positions) {
            let (a, b) = (a.unwrap(), b.unwrap());
            assert_eq!(a.radius.to_bits(), b.radius.to_bits());
            assert_eq!(a.angle.to_bits(), b.angle.to_bits());
        }
    }

    #[test]
    fn orphans_are_left_unpositioned() {
        let records = vec![
            record("Root", None, 1958),
            record("A", Some("Root"), 1990),
            record("Lost", Some("Missing"), 2000),
        ];
        let tree = Tree::from_records(&records).unwrap();
        let layout = RadialLayout::from_tree(&tree, &RadialLayoutConfig::default());
        assert!(layout.get(2).is_none());
        assert_eq!(layout.len(), 2);
    }
}
