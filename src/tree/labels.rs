//! Greedy label placement.
//!
//! Candidates are visited from most to least important; a label is kept only
//! when it fits inside the label area and its padded box stays clear of every
//! label kept before it.

use egui::{Align2, Pos2, Rect, Vec2};

use super::layout::RadialLayout;
use super::painter::{RadialTransform, TreePainter};
use super::{NodeId, Tree};

/// Average glyph advance relative to the font size.
const CHAR_WIDTH_FACTOR: f32 = 0.56;
const LINE_HEIGHT_FACTOR: f32 = 1.2;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub node_id: NodeId,
    pub text: String,
    pub anchor: Pos2,
    pub align: Align2,
    pub size: f32,
    pub bold: bool,
    /// Estimated extent of the rendered text, without padding.
    pub rect: Rect,
}

pub fn estimate_text_size(text: &str, font_size: f32) -> Vec2 {
    Vec2::new(
        text.chars().count() as f32 * font_size * CHAR_WIDTH_FACTOR,
        font_size * LINE_HEIGHT_FACTOR,
    )
}

/// Box of a vertically centered label for the given alignment.
pub fn label_rect(anchor: Pos2, align: Align2, size: Vec2) -> Rect {
    let left = if align == Align2::RIGHT_CENTER {
        anchor.x - size.x
    } else if align == Align2::CENTER_CENTER {
        anchor.x - size.x * 0.5
    } else {
        anchor.x
    };
    Rect::from_min_size(Pos2::new(left, anchor.y - size.y * 0.5), size)
}

#[derive(Debug, Default)]
pub struct LabelPlacer {
    padding: f32,
    placed: Vec<Rect>,
}

impl LabelPlacer {
    pub fn new(padding: f32) -> Self {
        Self {
            padding,
            placed: Vec::new(),
        }
    }

    /// Reserve an area that labels must avoid, such as the title block.
    pub fn block(&mut self, rect: Rect) {
        self.placed.push(rect);
    }

    pub fn is_clear(&self, rect: Rect) -> bool {
        let padded = rect.expand(self.padding * 0.5);
        self.placed
            .iter()
            .all(|other| !padded.intersects(other.expand(self.padding * 0.5)))
    }

    /// Accept `rect` if it is clear of everything accepted so far.
    pub fn try_place(&mut self, rect: Rect) -> bool {
        if self.is_clear(rect) {
            self.placed.push(rect);
            true
        } else {
            false
        }
    }
}

/// Pick the labels to draw for a laid-out tree.
pub fn place_labels(
    tree: &Tree,
    layout: &RadialLayout,
    painter: &TreePainter,
    transform: &RadialTransform,
    area: Rect,
    blocked: &[Rect],
) -> Vec<PlacedLabel> {
    let mut candidates: Vec<NodeId> = tree
        .reachable()
        .into_iter()
        .filter(|&id| painter.wants_label(&tree.nodes[id].record))
        .collect();
    // Stable: equal importance keeps tree order.
    candidates.sort_by(|a, b| {
        tree.nodes[*b]
            .record
            .importance
            .cmp(&tree.nodes[*a].record.importance)
    });

    let mut placer = LabelPlacer::new(painter.label_padding);
    for rect in blocked {
        placer.block(*rect);
    }

    let mut labels = Vec::new();
    for node_id in candidates {
        let Some(position) = layout.get(node_id) else {
            continue;
        };
        let record = &tree.nodes[node_id].record;
        let node_pos = transform.map_polar(position.radius, position.angle);
        let (dx, dy) = transform.outward(position.angle);
        let offset = painter.node_radius(record) + 4.0;
        let anchor = Pos2::new(node_pos.x + dx * offset, node_pos.y + dy * offset);
        let align = if dx >= 0.0 {
            Align2::LEFT_CENTER
        } else {
            Align2::RIGHT_CENTER
        };

        let size = painter.label_font_size(record);
        let rect = label_rect(anchor, align, estimate_text_size(&record.name, size));
        if !area.contains_rect(rect) || !placer.try_place(rect) {
            continue;
        }

        labels.push(PlacedLabel {
            node_id,
            text: record.name.clone(),
            anchor,
            align,
            size,
            bold: record.importance >= 5,
            rect,
        });
    }
    labels
}
