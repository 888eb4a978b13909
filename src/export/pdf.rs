use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use egui::{Align2, Color32, Pos2};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, LineDashPattern, Mm, PdfDocument,
    PdfLayerReference, Point, Polygon, Pt, Rgb, TextMatrix,
};

use crate::tree::labels::estimate_text_size;
use crate::tree::scene_graph::{flatten_cubic, ScenePrimitive, StrokeStyle, TreeSceneGraph};

const PX_TO_MM: f32 = 25.4 / 96.0;
const PX_TO_PT: f32 = 72.0 / 96.0;
const CIRCLE_STEPS: usize = 24;
const CURVE_STEPS: usize = 24;

/// Page geometry shared by every drawing call: scene pixels in, PDF units out.
struct Page {
    height_px: f32,
    background: Color32,
}

impl Page {
    fn point(&self, p: Pos2) -> Point {
        Point::new(Mm(p.x * PX_TO_MM), Mm((self.height_px - p.y) * PX_TO_MM))
    }

    fn ring(&self, points: &[Pos2]) -> Vec<(Point, bool)> {
        points.iter().map(|p| (self.point(*p), false)).collect()
    }

    /// PDF layers here are opaque, so alpha is mixed into the page color.
    fn color(&self, color: Color32) -> Color {
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let [br, bg, bb, _] = self.background.to_srgba_unmultiplied();
        let alpha = f32::from(a) / 255.0;
        let mix = |src: u8, dst: u8| (f32::from(src) * alpha + f32::from(dst) * (1.0 - alpha)) / 255.0;
        Color::Rgb(Rgb::new(mix(r, br), mix(g, bg), mix(b, bb), None))
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Export a scene as a single-page vector PDF.
pub fn export_pdf(scene: &TreeSceneGraph, title: &str, path: &Path) -> Result<()> {
    let (width, height) = (scene.size.x, scene.size.y);
    let (doc, page_index, layer_index) = PdfDocument::new(
        title,
        Mm(width * PX_TO_MM),
        Mm(height * PX_TO_MM),
        "Layer 1",
    );
    let layer = doc.get_page(page_index).get_layer(layer_index);

    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| anyhow!("failed to load built-in font: {err}"))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| anyhow!("failed to load built-in font: {err}"))?,
    };

    let background = scene
        .primitives
        .iter()
        .find_map(|primitive| match primitive {
            ScenePrimitive::FillRect { color, .. } => Some(*color),
            _ => None,
        })
        .unwrap_or(Color32::WHITE);
    let page = Page {
        height_px: height,
        background,
    };

    for primitive in &scene.primitives {
        draw_primitive(&layer, &page, &fonts, primitive);
    }

    let file = File::create(path)
        .with_context(|| format!("failed to create PDF file: {}", path.display()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|err| anyhow!("failed to save PDF {}: {err}", path.display()))
}

fn draw_primitive(layer: &PdfLayerReference, page: &Page, fonts: &Fonts, primitive: &ScenePrimitive) {
    match primitive {
        ScenePrimitive::FillRect { rect, color } => {
            let corners = [
                rect.left_top(),
                rect.right_top(),
                rect.right_bottom(),
                rect.left_bottom(),
            ];
            fill_polygon(layer, page, &corners, *color);
        }
        ScenePrimitive::Circle {
            center,
            radius,
            fill,
            stroke,
        } => {
            let points = circle_points(*center, *radius);
            fill_polygon(layer, page, &points, *fill);
            if let Some(style) = stroke {
                stroke_points(layer, page, &points, style, true);
            }
        }
        ScenePrimitive::FillPolygon { points, color } => {
            fill_polygon(layer, page, points, *color);
        }
        ScenePrimitive::StrokeLine { from, to, style } => {
            stroke_points(layer, page, &[*from, *to], style, false);
        }
        ScenePrimitive::StrokePolyline { points, style } => {
            stroke_points(layer, page, points, style, false);
        }
        ScenePrimitive::StrokeCubic {
            from,
            ctrl1,
            ctrl2,
            to,
            style,
        } => {
            let points = flatten_cubic(*from, *ctrl1, *ctrl2, *to, CURVE_STEPS);
            stroke_points(layer, page, &points, style, false);
        }
        ScenePrimitive::Text {
            text,
            anchor,
            align,
            size,
            color,
            bold,
        } => {
            let estimated = estimate_text_size(text, *size);
            let left = if *align == Align2::RIGHT_CENTER {
                anchor.x - estimated.x
            } else if *align == Align2::CENTER_CENTER {
                anchor.x - estimated.x * 0.5
            } else {
                anchor.x
            };
            // Baseline sits a third of the font size below the visual center.
            let baseline = Pos2::new(left, anchor.y + size * 0.35);
            let font = if *bold { &fonts.bold } else { &fonts.regular };

            layer.begin_text_section();
            layer.set_font(font, size * PX_TO_PT);
            layer.set_fill_color(page.color(*color));
            layer.set_text_matrix(TextMatrix::Translate(
                Pt(baseline.x * PX_TO_PT),
                Pt((page.height_px - baseline.y) * PX_TO_PT),
            ));
            layer.write_text(text.as_str(), font);
            layer.end_text_section();
        }
    }
}

fn fill_polygon(layer: &PdfLayerReference, page: &Page, points: &[Pos2], color: Color32) {
    if points.len() < 3 || color.a() == 0 {
        return;
    }
    layer.set_fill_color(page.color(color));
    layer.add_polygon(Polygon {
        rings: vec![page.ring(points)],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::EvenOdd,
    });
}

fn stroke_points(
    layer: &PdfLayerReference,
    page: &Page,
    points: &[Pos2],
    style: &StrokeStyle,
    closed: bool,
) {
    if points.len() < 2 || style.color.a() == 0 {
        return;
    }
    layer.set_outline_color(page.color(style.color));
    layer.set_outline_thickness(style.width * PX_TO_PT);
    if let Some((dash, gap)) = style.dash {
        layer.set_line_dash_pattern(LineDashPattern {
            dash_1: Some((dash * PX_TO_PT).round().max(1.0) as i64),
            gap_1: Some((gap * PX_TO_PT).round().max(1.0) as i64),
            ..LineDashPattern::default()
        });
    }
    layer.add_line(Line {
        points: page.ring(points),
        is_closed: closed,
    });
    if style.dash.is_some() {
        layer.set_line_dash_pattern(LineDashPattern::default());
    }
}

fn circle_points(center: Pos2, radius: f32) -> Vec<Pos2> {
    (0..CIRCLE_STEPS)
        .map(|i| {
            let theta = std::f32::consts::TAU * i as f32 / CIRCLE_STEPS as f32;
            Pos2::new(center.x + radius * theta.cos(), center.y + radius * theta.sin())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::data::Dataset;
    use crate::tree::layout::{LayoutPreset, RadialLayout};
    use crate::tree::painter::TreePainter;
    use crate::tree::scene_graph::build_tree_scene;
    use crate::tree::Tree;

    #[test]
    fn translucent_colors_blend_into_page() {
        let page = Page {
            height_px: 100.0,
            background: Color32::WHITE,
        };
        let half_black = Color32::from_rgba_unmultiplied(0, 0, 0, 128);
        match page.color(half_black) {
            Color::Rgb(rgb) => {
                assert!((rgb.r - 0.498).abs() < 0.01);
                assert!((rgb.g - rgb.b).abs() < 1e-6);
            }
            other => panic!("unexpected color {other:?}"),
        }
    }

    #[test]
    fn flips_the_y_axis() {
        let page = Page {
            height_px: 96.0,
            background: Color32::WHITE,
        };
        let top_left = page.point(Pos2::new(0.0, 0.0));
        // 96 px is one inch.
        assert!((top_left.y.0 - 72.0).abs() < 0.1);
        let bottom = page.point(Pos2::new(0.0, 96.0));
        assert!(bottom.y.0.abs() < 1e-6);
    }

    #[test]
    fn writes_builtin_tree() {
        let dataset = Dataset::builtin();
        let tree = Tree::from_records(&dataset.models).unwrap();
        let layout = RadialLayout::from_preset(&tree, LayoutPreset::Poster);
        let painter = TreePainter::default();
        let scene = build_tree_scene(&tree, &layout, &painter, &dataset, 1200.0, 800.0);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tree.pdf");
        export_pdf(&scene, &painter.title, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
