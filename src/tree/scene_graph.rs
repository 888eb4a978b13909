use std::f64::consts::PI;

use egui::{Align2, Color32, Pos2, Rect, Vec2};
use log::debug;

use super::labels::{estimate_text_size, label_rect, place_labels};
use super::layout::{PositionedNode, RadialLayout};
use super::painter::{parse_hex_color, with_alpha, BranchStyle, RadialTransform, TreePainter};
use super::Tree;
use crate::data::{BreakthroughMarker, Dataset, LEGEND_ITEMS};

/// Segments a faded (extinct) branch is split into.
const FADE_SEGMENTS: usize = 8;
const FLATTEN_STEPS_PER_SEGMENT: usize = 4;
const ARC_STEPS: usize = 96;
const CONTROL_FACTOR: f32 = 0.35;
const LEGEND_COLUMNS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: Color32,
    pub dash: Option<(f32, f32)>,
}

impl StrokeStyle {
    pub fn solid(width: f32, color: Color32) -> Self {
        Self {
            width,
            color,
            dash: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScenePrimitive {
    FillRect {
        rect: Rect,
        color: Color32,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Color32,
        stroke: Option<StrokeStyle>,
    },
    FillPolygon {
        points: Vec<Pos2>,
        color: Color32,
    },
    StrokeLine {
        from: Pos2,
        to: Pos2,
        style: StrokeStyle,
    },
    StrokePolyline {
        points: Vec<Pos2>,
        style: StrokeStyle,
    },
    StrokeCubic {
        from: Pos2,
        ctrl1: Pos2,
        ctrl2: Pos2,
        to: Pos2,
        style: StrokeStyle,
    },
    Text {
        text: String,
        anchor: Pos2,
        align: Align2,
        size: f32,
        color: Color32,
        bold: bool,
    },
}

pub struct TreeSceneGraph {
    pub size: Vec2,
    pub primitives: Vec<ScenePrimitive>,
    pub labeled_count: usize,
}

impl TreeSceneGraph {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            ScenePrimitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

pub fn build_tree_scene(
    tree: &Tree,
    layout: &RadialLayout,
    painter: &TreePainter,
    dataset: &Dataset,
    width: f32,
    height: f32,
) -> TreeSceneGraph {
    let transform = painter.create_to_screen_transform(&layout.config, width, height);
    let config = &layout.config;
    let mut primitives = vec![ScenePrimitive::FillRect {
        rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(width, height)),
        color: painter.background_color,
    }];
    let mut blocked = Vec::new();

    if painter.show_extinction_events {
        for event in &dataset.extinction_events {
            let inner = config.radius_for_year(f64::from(event.start_year));
            let outer = config.radius_for_year(f64::from(event.end_year));
            let mut points = arc_points(&transform, outer, config.angle_min, config.angle_max);
            points.extend(
                arc_points(&transform, inner, config.angle_min, config.angle_max)
                    .into_iter()
                    .rev(),
            );
            primitives.push(ScenePrimitive::FillPolygon {
                points,
                color: painter.extinction_color,
            });

            let text = format!("Extinction: {}", event.label);
            let anchor = transform.map_polar(
                (inner + outer) * 0.5,
                config.angle_min + config.angle_span() * 0.9,
            );
            let size = painter.label_font_size * 0.9;
            blocked.push(label_rect(
                anchor,
                Align2::CENTER_CENTER,
                estimate_text_size(&text, size),
            ));
            primitives.push(ScenePrimitive::Text {
                text,
                anchor,
                align: Align2::CENTER_CENTER,
                size,
                color: painter.muted_color,
                bold: false,
            });
        }
    }

    if painter.show_timeline {
        push_timeline(&mut primitives, &mut blocked, painter, layout, &transform);
    }

    for &(parent_id, child_id) in &layout.edges {
        let (Some(parent), Some(child)) = (layout.get(parent_id), layout.get(child_id)) else {
            continue;
        };
        let record = &tree.nodes[child_id].record;
        let style = StrokeStyle::solid(painter.branch_width(record), painter.branch_color(record));
        let branch = branch_geometry(painter.branch_style, &transform, parent, child);

        if record.extinct {
            push_faded_branch(&mut primitives, branch, style);
        } else {
            primitives.push(branch.into_primitive(style));
        }
    }

    let reachable = tree.reachable();
    for &id in &reachable {
        let Some(position) = layout.get(id) else {
            continue;
        };
        let record = &tree.nodes[id].record;
        let center = transform.map_polar(position.radius, position.angle);
        let radius = painter.node_radius(record);

        if painter.has_glow(record) {
            primitives.push(ScenePrimitive::Circle {
                center,
                radius: radius * 1.8,
                fill: with_alpha(painter.record_color(record), 0.08),
                stroke: None,
            });
        }
        primitives.push(ScenePrimitive::Circle {
            center,
            radius,
            fill: painter.node_color(record),
            stroke: Some(StrokeStyle::solid(painter.node_outline_width, Color32::WHITE)),
        });
        if painter.has_glow(record) {
            primitives.push(ScenePrimitive::Circle {
                center: Pos2::new(center.x - radius * 0.3, center.y - radius * 0.3),
                radius: radius * 0.35,
                fill: with_alpha(Color32::WHITE, 0.6),
                stroke: None,
            });
        }
    }

    if painter.show_breakthroughs {
        for breakthrough in &dataset.breakthroughs {
            let Some(id) = tree.id_of(&breakthrough.node_name) else {
                continue;
            };
            let Some(position) = layout.get(id) else {
                continue;
            };
            let center = transform.map_polar(position.radius, position.angle);
            let outer = painter.node_radius(&tree.nodes[id].record) + 6.0;
            let (tips, inner_ratio) = match breakthrough.marker {
                BreakthroughMarker::Star => (5, 0.45),
                BreakthroughMarker::Burst => (8, 0.6),
            };
            primitives.push(ScenePrimitive::FillPolygon {
                points: star_points(center, outer, outer * inner_ratio, tips),
                color: painter.breakthrough_color,
            });
        }
    }

    let area = painter.label_area(width, height);
    let labels = place_labels(tree, layout, painter, &transform, area, &blocked);
    let labeled_count = labels.len();
    for label in labels {
        primitives.push(ScenePrimitive::Text {
            text: label.text,
            anchor: label.anchor,
            align: label.align,
            size: label.size,
            color: painter.label_color,
            bold: label.bold,
        });
    }

    push_header(&mut primitives, painter, width);

    if painter.show_caption {
        let caption = format!(
            "Visualizing {} AI models • {} evolutionary connections • {} key innovations labeled",
            reachable.len(),
            layout.edges.len(),
            labeled_count
        );
        primitives.push(ScenePrimitive::Text {
            text: caption,
            anchor: Pos2::new(width * 0.5, height - painter.footer_height() * 0.5),
            align: Align2::CENTER_CENTER,
            size: 10.0,
            color: painter.muted_color,
            bold: false,
        });
    }

    debug!(
        "scene: {} primitives, {} labels",
        primitives.len(),
        labeled_count
    );

    TreeSceneGraph {
        size: Vec2::new(width, height),
        primitives,
        labeled_count,
    }
}

fn push_timeline(
    primitives: &mut Vec<ScenePrimitive>,
    blocked: &mut Vec<Rect>,
    painter: &TreePainter,
    layout: &RadialLayout,
    transform: &RadialTransform,
) {
    let config = &layout.config;
    for &year in &painter.timeline_years {
        if year < config.min_year || year > config.max_year {
            continue;
        }
        let radius = config.radius_for_year(f64::from(year));
        let dash = if year % 10 == 0 { None } else { Some((4.0, 3.0)) };
        primitives.push(ScenePrimitive::StrokePolyline {
            points: arc_points(transform, radius, config.angle_min, config.angle_max),
            style: StrokeStyle {
                width: 0.6,
                color: with_alpha(painter.ring_color, 0.6),
                dash,
            },
        });

        let text = year.to_string();
        let size = painter.label_font_size * 0.9;
        let (dx, dy) = transform.outward(config.angle_min);
        let ring_point = transform.map_polar(radius, config.angle_min);
        // Nudge sideways off the ring's end.
        let anchor = Pos2::new(ring_point.x - dy * 8.0, ring_point.y + dx * 8.0);
        blocked.push(label_rect(
            anchor,
            Align2::CENTER_CENTER,
            estimate_text_size(&text, size),
        ));
        primitives.push(ScenePrimitive::Text {
            text,
            anchor,
            align: Align2::CENTER_CENTER,
            size,
            color: painter.muted_color,
            bold: false,
        });
    }
}

fn push_header(primitives: &mut Vec<ScenePrimitive>, painter: &TreePainter, width: f32) {
    let mut top = 16.0;
    if painter.show_title {
        primitives.push(ScenePrimitive::Text {
            text: painter.title.clone(),
            anchor: Pos2::new(width * 0.5, top + 14.0),
            align: Align2::CENTER_CENTER,
            size: 22.0,
            color: painter.title_color,
            bold: true,
        });
        primitives.push(ScenePrimitive::Text {
            text: painter.subtitle.clone(),
            anchor: Pos2::new(width * 0.5, top + 40.0),
            align: Align2::CENTER_CENTER,
            size: 13.0,
            color: painter.muted_color,
            bold: false,
        });
        top += 54.0;
    }

    if !painter.show_legend {
        return;
    }
    let column_width = ((width - 80.0) / LEGEND_COLUMNS as f32).min(150.0);
    let legend_left = (width - column_width * LEGEND_COLUMNS as f32) * 0.5;
    for (i, (color, label)) in LEGEND_ITEMS.iter().enumerate() {
        let column = i % LEGEND_COLUMNS;
        let row = i / LEGEND_COLUMNS;
        let swatch = Pos2::new(
            legend_left + column as f32 * column_width + 6.0,
            top + 8.0 + row as f32 * 15.0,
        );
        primitives.push(ScenePrimitive::Circle {
            center: swatch,
            radius: 4.5,
            fill: with_alpha(parse_hex_color(color).unwrap_or(painter.fallback_color), 0.85),
            stroke: None,
        });
        primitives.push(ScenePrimitive::Text {
            text: (*label).to_owned(),
            anchor: Pos2::new(swatch.x + 10.0, swatch.y),
            align: Align2::LEFT_CENTER,
            size: 10.0,
            color: painter.label_color,
            bold: false,
        });
    }
}

/// A connector between two placed nodes, before styling.
#[derive(Debug, Clone, Copy)]
enum BranchGeometry {
    Line(Pos2, Pos2),
    Cubic([Pos2; 4]),
}

impl BranchGeometry {
    fn into_primitive(self, style: StrokeStyle) -> ScenePrimitive {
        match self {
            Self::Line(from, to) => ScenePrimitive::StrokeLine { from, to, style },
            Self::Cubic([from, ctrl1, ctrl2, to]) => ScenePrimitive::StrokeCubic {
                from,
                ctrl1,
                ctrl2,
                to,
                style,
            },
        }
    }

    fn point_at(&self, t: f32) -> Pos2 {
        match *self {
            Self::Line(from, to) => from + (to - from) * t,
            Self::Cubic([p0, p1, p2, p3]) => cubic_point(p0, p1, p2, p3, t),
        }
    }
}

fn branch_geometry(
    style: BranchStyle,
    transform: &RadialTransform,
    parent: &PositionedNode,
    child: &PositionedNode,
) -> BranchGeometry {
    let from = transform.map_polar(parent.radius, parent.angle);
    let to = transform.map_polar(child.radius, child.angle);
    match style {
        BranchStyle::Straight => BranchGeometry::Line(from, to),
        BranchStyle::Curved => {
            let pull = (to - from).length() * CONTROL_FACTOR;
            let (px, py) = transform.outward(parent.angle);
            let (cx, cy) = transform.outward(child.angle);
            let ctrl1 = Pos2::new(from.x + px * pull, from.y + py * pull);
            let ctrl2 = Pos2::new(to.x - cx * pull * 0.8, to.y - cy * pull * 0.8);
            BranchGeometry::Cubic([from, ctrl1, ctrl2, to])
        }
    }
}

/// Extinct lineages thin out and fade toward the child.
fn push_faded_branch(
    primitives: &mut Vec<ScenePrimitive>,
    branch: BranchGeometry,
    style: StrokeStyle,
) {
    let alpha = style.color.a() as f32 / 255.0;
    for segment in 0..FADE_SEGMENTS {
        let progress = segment as f32 / FADE_SEGMENTS as f32;
        let points = (0..=FLATTEN_STEPS_PER_SEGMENT)
            .map(|step| {
                let t = (segment * FLATTEN_STEPS_PER_SEGMENT + step) as f32
                    / (FADE_SEGMENTS * FLATTEN_STEPS_PER_SEGMENT) as f32;
                branch.point_at(t)
            })
            .collect();
        primitives.push(ScenePrimitive::StrokePolyline {
            points,
            style: StrokeStyle {
                width: style.width * (1.0 - 0.3 * progress),
                color: with_alpha(style.color, alpha * (1.0 - 0.6 * progress)),
                dash: None,
            },
        });
    }
}

pub fn cubic_point(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, t: f32) -> Pos2 {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    Pos2::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Approximate a cubic Bézier with `steps` line segments.
pub fn flatten_cubic(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, steps: usize) -> Vec<Pos2> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| cubic_point(p0, p1, p2, p3, i as f32 / steps as f32))
        .collect()
}

fn arc_points(transform: &RadialTransform, radius: f64, start: f64, end: f64) -> Vec<Pos2> {
    let steps = ((ARC_STEPS as f64 * (end - start).abs() / (2.0 * PI)).ceil() as usize).max(8);
    (0..=steps)
        .map(|i| transform.map_polar(radius, start + (end - start) * i as f64 / steps as f64))
        .collect()
}

fn star_points(center: Pos2, outer: f32, inner: f32, tips: usize) -> Vec<Pos2> {
    (0..tips * 2)
        .map(|i| {
            let r = if i % 2 == 0 { outer } else { inner };
            let theta = std::f32::consts::PI * i as f32 / tips as f32 - std::f32::consts::FRAC_PI_2;
            Pos2::new(center.x + r * theta.cos(), center.y + r * theta.sin())
        })
        .collect()
}
