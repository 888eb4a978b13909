use super::{ParentAnchor, PositionedNode, RadialLayout, RadialLayoutConfig, SpanWeight};
use crate::tree::{NodeId, Tree};

pub(super) fn build(tree: &Tree, config: &RadialLayoutConfig) -> RadialLayout {
    let node_count = tree.nodes.len();
    let mut positions = vec![None; node_count];

    let weights = match config.weight {
        SpanWeight::LeafCount => tree.leaf_counts(),
        SpanWeight::DescendantCount => tree.descendant_counts(),
    };

    assign_radial_positions(
        tree,
        tree.root,
        config.angle_min,
        config.angle_max,
        config,
        &weights,
        &mut positions,
    );

    RadialLayout {
        positions,
        edges: tree.edges(),
        leaf_count: tree.leaf_count().max(1),
        config: *config,
    }
}

/// Place `node_id` inside `[start_angle, end_angle]` and return its angle.
fn assign_radial_positions(
    tree: &Tree,
    node_id: NodeId,
    start_angle: f64,
    end_angle: f64,
    config: &RadialLayoutConfig,
    weights: &[usize],
    positions: &mut [Option<PositionedNode>],
) -> f64 {
    let node = &tree.nodes[node_id];
    let span = end_angle - start_angle;
    let midpoint = start_angle + span * 0.5;

    let angle = if node.is_leaf() {
        midpoint
    } else {
        let total: usize = node
            .children
            .iter()
            .map(|&child| weights[child].max(1))
            .sum::<usize>()
            .max(1);

        let mut current_angle = start_angle;
        let mut angle_sum = 0.0;
        for &child_id in &node.children {
            let fraction = weights[child_id].max(1) as f64 / total as f64;
            let child_end = current_angle + span * fraction;
            angle_sum += assign_radial_positions(
                tree,
                child_id,
                current_angle,
                child_end,
                config,
                weights,
                positions,
            );
            current_angle = child_end;
        }

        match config.anchor {
            ParentAnchor::ChildMean => angle_sum / node.children.len() as f64,
            ParentAnchor::SpanMidpoint => midpoint,
        }
    };

    positions[node_id] = Some(PositionedNode {
        id: node_id,
        radius: config.radius_for_year(f64::from(node.record.year)),
        angle,
        span: (start_angle, end_angle),
    });

    angle
}
