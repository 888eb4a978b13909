use std::path::Path;

use anyhow::{Context, Result};
use egui::{Align2, Pos2};
use svg::node::element::{Circle, Group, Line, Path as SvgPath, Polygon, Polyline, Rectangle, Text};
use svg::Document;

use crate::tree::painter::{color_opacity, color_to_hex};
use crate::tree::scene_graph::{ScenePrimitive, StrokeStyle, TreeSceneGraph};

const FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";

/// Export a scene as a standalone SVG file.
pub fn export_svg(scene: &TreeSceneGraph, path: &Path) -> Result<()> {
    let document = scene_to_svg(scene);
    svg::save(path, &document)
        .with_context(|| format!("failed to write SVG: {}", path.display()))
}

pub fn scene_to_svg(scene: &TreeSceneGraph) -> Document {
    let (width, height) = (scene.size.x, scene.size.y);
    let mut shapes = Group::new().set("id", "tree");
    let mut labels = Group::new()
        .set("id", "labels")
        .set("font-family", FONT_FAMILY);

    for primitive in &scene.primitives {
        match primitive {
            ScenePrimitive::FillRect { rect, color } => {
                shapes = shapes.add(
                    Rectangle::new()
                        .set("x", rect.min.x)
                        .set("y", rect.min.y)
                        .set("width", rect.width())
                        .set("height", rect.height())
                        .set("fill", color_to_hex(*color))
                        .set("fill-opacity", color_opacity(*color)),
                );
            }
            ScenePrimitive::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let mut circle = Circle::new()
                    .set("cx", center.x)
                    .set("cy", center.y)
                    .set("r", *radius)
                    .set("fill", color_to_hex(*fill))
                    .set("fill-opacity", color_opacity(*fill));
                circle = match stroke {
                    Some(style) => apply_stroke(circle, style),
                    None => circle.set("stroke", "none"),
                };
                shapes = shapes.add(circle);
            }
            ScenePrimitive::FillPolygon { points, color } => {
                shapes = shapes.add(
                    Polygon::new()
                        .set("points", point_list(points))
                        .set("fill", color_to_hex(*color))
                        .set("fill-opacity", color_opacity(*color))
                        .set("fill-rule", "evenodd")
                        .set("stroke", "none"),
                );
            }
            ScenePrimitive::StrokeLine { from, to, style } => {
                let line = Line::new()
                    .set("x1", from.x)
                    .set("y1", from.y)
                    .set("x2", to.x)
                    .set("y2", to.y);
                shapes = shapes.add(apply_stroke(line, style));
            }
            ScenePrimitive::StrokePolyline { points, style } => {
                let polyline = Polyline::new()
                    .set("points", point_list(points))
                    .set("fill", "none");
                shapes = shapes.add(apply_stroke(polyline, style));
            }
            ScenePrimitive::StrokeCubic {
                from,
                ctrl1,
                ctrl2,
                to,
                style,
            } => {
                let d = format!(
                    "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
                    from.x, from.y, ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
                );
                let path = SvgPath::new().set("d", d).set("fill", "none");
                shapes = shapes.add(apply_stroke(path, style));
            }
            ScenePrimitive::Text {
                text,
                anchor,
                align,
                size,
                color,
                bold,
            } => {
                let mut node = Text::new(text.as_str())
                    .set("x", anchor.x)
                    .set("y", anchor.y)
                    .set("font-size", *size)
                    .set("fill", color_to_hex(*color))
                    .set("dominant-baseline", "middle")
                    .set("text-anchor", text_anchor(*align));
                if *bold {
                    node = node.set("font-weight", "bold");
                }
                labels = labels.add(node);
            }
        }
    }

    Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0, 0, width.round() as i32, height.round() as i32))
        .add(shapes)
        .add(labels)
}

fn apply_stroke<T: SetAttr>(element: T, style: &StrokeStyle) -> T {
    let mut element = element
        .attr("stroke", color_to_hex(style.color))
        .attr("stroke-opacity", color_opacity(style.color))
        .attr("stroke-width", style.width)
        .attr("stroke-linecap", "round");
    if let Some((dash, gap)) = style.dash {
        element = element.attr("stroke-dasharray", format!("{dash},{gap}"));
    }
    element
}

/// `set` for every element type used here.
trait SetAttr: Sized {
    fn attr<V: Into<svg::node::Value>>(self, name: &str, value: V) -> Self;
}

macro_rules! impl_set_attr {
    ($($element:ty),*) => {
        $(impl SetAttr for $element {
            fn attr<V: Into<svg::node::Value>>(self, name: &str, value: V) -> Self {
                self.set(name, value)
            }
        })*
    };
}

impl_set_attr!(Circle, Line, Polyline, SvgPath);

pub fn text_anchor(align: Align2) -> &'static str {
    if align == Align2::RIGHT_CENTER {
        "end"
    } else if align == Align2::CENTER_CENTER {
        "middle"
    } else {
        "start"
    }
}

fn point_list(points: &[Pos2]) -> String {
    points
        .iter()
        .map(|p| format!("{:.2},{:.2}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use egui::{Color32, Vec2};
    use tempfile::TempDir;

    use super::*;
    use crate::data::Dataset;
    use crate::tree::layout::{LayoutPreset, RadialLayout};
    use crate::tree::painter::TreePainter;
    use crate::tree::scene_graph::build_tree_scene;
    use crate::tree::Tree;

    #[test]
    fn maps_alignment_to_anchor() {
        assert_eq!(text_anchor(Align2::LEFT_CENTER), "start");
        assert_eq!(text_anchor(Align2::RIGHT_CENTER), "end");
        assert_eq!(text_anchor(Align2::CENTER_CENTER), "middle");
    }

    #[test]
    fn renders_dashed_strokes_and_bold_text() {
        let scene = TreeSceneGraph {
            size: Vec2::new(100.0, 50.0),
            primitives: vec![
                ScenePrimitive::StrokePolyline {
                    points: vec![Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0)],
                    style: StrokeStyle {
                        width: 0.6,
                        color: Color32::from_rgb(0xBD, 0xC3, 0xC7),
                        dash: Some((4.0, 3.0)),
                    },
                },
                ScenePrimitive::Text {
                    text: "GPT-4".to_owned(),
                    anchor: Pos2::new(20.0, 20.0),
                    align: Align2::RIGHT_CENTER,
                    size: 10.5,
                    color: Color32::BLACK,
                    bold: true,
                },
            ],
            labeled_count: 1,
        };
        let markup = scene_to_svg(&scene).to_string();
        assert!(markup.contains("stroke-dasharray=\"4,3\""));
        assert!(markup.contains("stroke=\"#bdc3c7\""));
        assert!(markup.contains("font-weight=\"bold\""));
        assert!(markup.contains("text-anchor=\"end\""));
        assert!(markup.contains("GPT-4"));
    }

    #[test]
    fn writes_builtin_tree() {
        let dataset = Dataset::builtin();
        let tree = Tree::from_records(&dataset.models).unwrap();
        let layout = RadialLayout::from_preset(&tree, LayoutPreset::Fan);
        let scene = build_tree_scene(
            &tree,
            &layout,
            &TreePainter::default(),
            &dataset,
            1200.0,
            800.0,
        );

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tree.svg");
        export_svg(&scene, &path).unwrap();

        let markup = std::fs::read_to_string(&path).unwrap();
        assert!(markup.starts_with("<svg"));
        assert!(markup.contains("Perceptron"));
        assert!(markup.contains("viewBox=\"0 0 1200 800\""));
    }
}
