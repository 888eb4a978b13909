use std::path::Path;

use anyhow::{anyhow, Result};
use egui::{Align2, Color32, Pos2};
use font_kit::family_name::FamilyName;
use font_kit::properties::Properties;
use font_kit::source::SystemSource;
use fontdue::layout::{CoordinateSystem, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use log::{debug, warn};
use tiny_skia::{
    Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform,
};

use crate::tree::scene_graph::{ScenePrimitive, StrokeStyle, TreeSceneGraph};

/// Rasterizes a scene with tiny-skia; glyphs come from fontdue.
pub struct SkiaTreeRenderer {
    text_font: Option<Font>,
}

impl Default for SkiaTreeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SkiaTreeRenderer {
    pub fn new() -> Self {
        let text_font = load_system_sans_font();
        if text_font.is_none() {
            warn!("no system sans-serif font found; PNG text will be skipped");
        }
        Self { text_font }
    }

    /// A renderer that draws shapes only, independent of installed fonts.
    #[cfg(test)]
    pub fn without_text() -> Self {
        Self { text_font: None }
    }

    pub fn render_scene(&self, scene: &TreeSceneGraph, scale: f32) -> Result<Pixmap> {
        let scale = scale.max(0.1);
        let width_px = (scene.size.x * scale).round().max(1.0) as u32;
        let height_px = (scene.size.y * scale).round().max(1.0) as u32;

        let mut pixmap = Pixmap::new(width_px, height_px)
            .ok_or_else(|| anyhow!("cannot allocate a {width_px}x{height_px} pixmap"))?;

        for primitive in &scene.primitives {
            self.draw(&mut pixmap, primitive, scale);
        }
        debug!("rasterized {width_px}x{height_px} pixels");
        Ok(pixmap)
    }

    pub fn save_png(&self, scene: &TreeSceneGraph, scale: f32, path: &Path) -> Result<()> {
        let pixmap = self.render_scene(scene, scale)?;
        pixmap
            .save_png(path)
            .map_err(|err| anyhow!("failed to write PNG {}: {err}", path.display()))
    }

    fn draw(&self, pixmap: &mut Pixmap, primitive: &ScenePrimitive, scale: f32) {
        match primitive {
            ScenePrimitive::FillRect { rect, color } => {
                let Some(area) = tiny_skia::Rect::from_xywh(
                    rect.min.x * scale,
                    rect.min.y * scale,
                    (rect.width() * scale).max(0.0),
                    (rect.height() * scale).max(0.0),
                ) else {
                    return;
                };
                pixmap.fill_rect(area, &paint_for(*color), Transform::identity(), None);
            }
            ScenePrimitive::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                let mut pb = PathBuilder::new();
                pb.push_circle(center.x * scale, center.y * scale, (radius * scale).max(0.5));
                let Some(path) = pb.finish() else {
                    return;
                };
                pixmap.fill_path(
                    &path,
                    &paint_for(*fill),
                    FillRule::Winding,
                    Transform::identity(),
                    None,
                );
                if let Some(style) = stroke {
                    stroke_path(pixmap, &path, style, scale);
                }
            }
            ScenePrimitive::FillPolygon { points, color } => {
                let Some(path) = polyline_path(points, scale, true) else {
                    return;
                };
                pixmap.fill_path(
                    &path,
                    &paint_for(*color),
                    FillRule::EvenOdd,
                    Transform::identity(),
                    None,
                );
            }
            ScenePrimitive::StrokeLine { from, to, style } => {
                if let Some(path) = polyline_path(&[*from, *to], scale, false) {
                    stroke_path(pixmap, &path, style, scale);
                }
            }
            ScenePrimitive::StrokePolyline { points, style } => {
                if let Some(path) = polyline_path(points, scale, false) {
                    stroke_path(pixmap, &path, style, scale);
                }
            }
            ScenePrimitive::StrokeCubic {
                from,
                ctrl1,
                ctrl2,
                to,
                style,
            } => {
                let mut pb = PathBuilder::new();
                pb.move_to(from.x * scale, from.y * scale);
                pb.cubic_to(
                    ctrl1.x * scale,
                    ctrl1.y * scale,
                    ctrl2.x * scale,
                    ctrl2.y * scale,
                    to.x * scale,
                    to.y * scale,
                );
                if let Some(path) = pb.finish() {
                    stroke_path(pixmap, &path, style, scale);
                }
            }
            ScenePrimitive::Text {
                text,
                anchor,
                align,
                size,
                color,
                bold,
            } => {
                let Some(font) = self.text_font.as_ref() else {
                    return;
                };
                let anchor = Pos2::new(anchor.x * scale, anchor.y * scale);
                let px = (size * scale).max(6.0);
                render_text(pixmap, font, text, anchor, *align, px, *color);
                if *bold {
                    let shifted = Pos2::new(anchor.x + (px * 0.04).max(0.5), anchor.y);
                    render_text(pixmap, font, text, shifted, *align, px, *color);
                }
            }
        }
    }
}

fn load_system_sans_font() -> Option<Font> {
    let handle = SystemSource::new()
        .select_best_match(&[FamilyName::SansSerif], &Properties::new())
        .ok()?;
    let font = handle.load().ok()?;
    let data = font.copy_font_data()?;
    Font::from_bytes(data.as_ref().clone(), FontSettings::default()).ok()
}

fn polyline_path(points: &[Pos2], scale: f32, close: bool) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() || (close && rest.len() < 2) {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(first.x * scale, first.y * scale);
    for point in rest {
        pb.line_to(point.x * scale, point.y * scale);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

fn paint_for(color: Color32) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(to_skia_color(color));
    paint.anti_alias = true;
    paint
}

fn stroke_path(pixmap: &mut Pixmap, path: &tiny_skia::Path, style: &StrokeStyle, scale: f32) {
    let mut stroke = Stroke {
        width: (style.width * scale).max(0.5),
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    if let Some((dash, gap)) = style.dash {
        stroke.line_cap = LineCap::Butt;
        stroke.dash = StrokeDash::new(vec![(dash * scale).max(1.0), (gap * scale).max(1.0)], 0.0);
    }
    pixmap.stroke_path(path, &paint_for(style.color), &stroke, Transform::identity(), None);
}

fn to_skia_color(color: Color32) -> Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    Color::from_rgba8(r, g, b, a)
}

/// Draw one line of text with its vertical center on `anchor`.
fn render_text(
    pixmap: &mut Pixmap,
    font: &Font,
    text: &str,
    anchor: Pos2,
    align: Align2,
    px: f32,
    color: Color32,
) {
    if text.is_empty() {
        return;
    }

    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings::default());
    layout.append(&[font], &TextStyle::new(text, px, 0));

    let glyphs = layout.glyphs();
    let Some(line_width) = glyphs
        .iter()
        .map(|g| g.x + g.width as f32)
        .reduce(f32::max)
    else {
        return;
    };
    let line_height = layout.height();

    let left = if align == Align2::RIGHT_CENTER {
        anchor.x - line_width
    } else if align == Align2::CENTER_CENTER {
        anchor.x - line_width * 0.5
    } else {
        anchor.x
    };
    let top = anchor.y - line_height * 0.5;

    let width = pixmap.width() as usize;
    let data = pixmap.data_mut();
    for glyph in glyphs {
        if glyph.width == 0 || glyph.height == 0 {
            continue;
        }
        let (metrics, bitmap) = font.rasterize_config(glyph.key);
        let origin_x = (left + glyph.x).round() as i32;
        let origin_y = (top + glyph.y).round() as i32;
        for y in 0..metrics.height {
            for x in 0..metrics.width {
                let coverage = f32::from(bitmap[y * metrics.width + x]) / 255.0;
                blend_pixel_premultiplied(
                    data,
                    width,
                    origin_x + x as i32,
                    origin_y + y as i32,
                    color,
                    coverage * f32::from(color.a()) / 255.0,
                );
            }
        }
    }
}

/// Source-over blend of an unmultiplied color into premultiplied RGBA bytes.
fn blend_pixel_premultiplied(
    data: &mut [u8],
    width: usize,
    x: i32,
    y: i32,
    color: Color32,
    src_a: f32,
) {
    if src_a <= 0.0 || x < 0 || y < 0 || width == 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    let height = data.len() / (width * 4);
    if x >= width || y >= height {
        return;
    }
    let idx = (y * width + x) * 4;
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    let src = [r, g, b].map(|c| f32::from(c) / 255.0 * src_a);

    for (channel, value) in src.iter().enumerate() {
        let dst = f32::from(data[idx + channel]) / 255.0;
        data[idx + channel] = ((value + dst * (1.0 - src_a)).clamp(0.0, 1.0) * 255.0).round() as u8;
    }
    let dst_a = f32::from(data[idx + 3]) / 255.0;
    data[idx + 3] = ((src_a + dst_a * (1.0 - src_a)).clamp(0.0, 1.0) * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use egui::{Rect, Vec2};
    use tempfile::TempDir;

    use super::*;
    use crate::data::Dataset;
    use crate::tree::layout::{LayoutPreset, RadialLayout};
    use crate::tree::painter::TreePainter;
    use crate::tree::scene_graph::build_tree_scene;
    use crate::tree::Tree;

    fn tiny_scene(primitives: Vec<ScenePrimitive>) -> TreeSceneGraph {
        TreeSceneGraph {
            size: Vec2::new(20.0, 10.0),
            primitives,
            labeled_count: 0,
        }
    }

    #[test]
    fn pixmap_is_scaled() {
        let scene = tiny_scene(Vec::new());
        let pixmap = SkiaTreeRenderer::without_text()
            .render_scene(&scene, 2.0)
            .unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (40, 20));
    }

    #[test]
    fn fills_background_and_circles() {
        let scene = tiny_scene(vec![
            ScenePrimitive::FillRect {
                rect: Rect::from_min_size(Pos2::ZERO, Vec2::new(20.0, 10.0)),
                color: Color32::from_rgb(0xFC, 0xFC, 0xFA),
            },
            ScenePrimitive::Circle {
                center: Pos2::new(15.0, 5.0),
                radius: 3.0,
                fill: Color32::from_rgb(255, 0, 0),
                stroke: None,
            },
        ]);
        let pixmap = SkiaTreeRenderer::without_text()
            .render_scene(&scene, 1.0)
            .unwrap();

        let corner = pixmap.pixel(1, 1).unwrap();
        assert_eq!(
            (corner.red(), corner.green(), corner.blue(), corner.alpha()),
            (0xFC, 0xFC, 0xFA, 255)
        );
        let dot = pixmap.pixel(15, 5).unwrap();
        assert_eq!((dot.red(), dot.green(), dot.blue()), (255, 0, 0));
    }

    #[test]
    fn blending_respects_alpha() {
        let mut data = vec![255u8; 4];
        blend_pixel_premultiplied(&mut data, 1, 0, 0, Color32::BLACK, 0.5);
        assert_eq!(data, vec![128, 128, 128, 255]);

        // Out of bounds is ignored.
        blend_pixel_premultiplied(&mut data, 1, 3, 0, Color32::BLACK, 1.0);
        blend_pixel_premultiplied(&mut data, 1, -1, 0, Color32::BLACK, 1.0);
        assert_eq!(data, vec![128, 128, 128, 255]);
    }

    #[test]
    fn writes_png_for_builtin_tree() {
        let dataset = Dataset::builtin();
        let tree = Tree::from_records(&dataset.models).unwrap();
        let layout = RadialLayout::from_preset(&tree, LayoutPreset::Semicircular);
        let painter = TreePainter::default();
        let scene = build_tree_scene(&tree, &layout, &painter, &dataset, 600.0, 400.0);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tree.png");
        SkiaTreeRenderer::without_text()
            .save_png(&scene, 1.0, &path)
            .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
