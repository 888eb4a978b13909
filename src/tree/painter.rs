use std::f64::consts::FRAC_PI_2;

use egui::{Color32, Pos2, Rect};

use super::layout::RadialLayoutConfig;
use crate::data::{scheme_color, ModelRecord};

/// How parent/child connectors are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BranchStyle {
    Straight,
    #[default]
    Curved,
}

/// Style sheet shared by every backend.
#[derive(Debug, Clone)]
pub struct TreePainter {
    pub background_color: Color32,
    pub label_color: Color32,
    pub title_color: Color32,
    pub muted_color: Color32,
    pub ring_color: Color32,
    pub extinction_color: Color32,
    pub breakthrough_color: Color32,
    pub fallback_color: Color32,
    pub branch_style: BranchStyle,
    pub branch_width_per_importance: f32,
    pub branch_alpha: f32,
    pub extinct_branch_alpha: f32,
    pub node_radius_per_importance: f32,
    pub node_alpha: f32,
    pub extinct_node_alpha: f32,
    pub node_outline_width: f32,
    /// Models below this importance are never labelled.
    pub label_threshold: u8,
    pub label_font_size: f32,
    pub major_label_font_size: f32,
    pub label_padding: f32,
    pub title: String,
    pub subtitle: String,
    pub show_labels: bool,
    pub show_timeline: bool,
    pub show_extinction_events: bool,
    pub show_breakthroughs: bool,
    pub show_legend: bool,
    pub show_title: bool,
    pub show_caption: bool,
    pub timeline_years: Vec<i32>,
    /// Added to layout angles before projecting, so angle 0 points up.
    pub rotation: f64,
}

impl Default for TreePainter {
    fn default() -> Self {
        Self {
            background_color: Color32::from_rgb(0xFC, 0xFC, 0xFA),
            label_color: Color32::from_rgb(0x1A, 0x1A, 0x1A),
            title_color: Color32::from_rgb(0x1C, 0x28, 0x33),
            muted_color: Color32::from_rgb(0x7F, 0x8C, 0x8D),
            ring_color: Color32::from_rgb(0xBD, 0xC3, 0xC7),
            extinction_color: Color32::from_rgba_unmultiplied(0x8B, 0x00, 0x00, 20),
            breakthrough_color: Color32::from_rgba_unmultiplied(0xFF, 0xD7, 0x00, 150),
            fallback_color: Color32::from_rgb(0x80, 0x80, 0x80),
            branch_style: BranchStyle::Curved,
            branch_width_per_importance: 1.2,
            branch_alpha: 0.7,
            extinct_branch_alpha: 0.25,
            node_radius_per_importance: 2.5,
            node_alpha: 0.95,
            extinct_node_alpha: 0.4,
            node_outline_width: 0.8,
            label_threshold: 4,
            label_font_size: 9.0,
            major_label_font_size: 10.5,
            label_padding: 6.0,
            title: "The Phylogenetic Tree of Artificial Intelligence".to_owned(),
            subtitle: "Evolution from Perceptrons to AGI • 1958–2025".to_owned(),
            show_labels: true,
            show_timeline: true,
            show_extinction_events: true,
            show_breakthroughs: true,
            show_legend: true,
            show_title: true,
            show_caption: true,
            timeline_years: vec![1960, 1970, 1980, 1990, 2000, 2010, 2020, 2025],
            rotation: FRAC_PI_2,
        }
    }
}

impl TreePainter {
    /// The record's own color, else its branch type's scheme color.
    pub fn record_color(&self, record: &ModelRecord) -> Color32 {
        parse_hex_color(&record.color)
            .or_else(|| scheme_color(&record.branch_type).and_then(parse_hex_color))
            .unwrap_or(self.fallback_color)
    }

    pub fn branch_width(&self, record: &ModelRecord) -> f32 {
        f32::from(record.importance) * self.branch_width_per_importance
    }

    pub fn branch_color(&self, record: &ModelRecord) -> Color32 {
        let alpha = if record.extinct {
            self.extinct_branch_alpha
        } else {
            self.branch_alpha
        };
        with_alpha(self.record_color(record), alpha)
    }

    pub fn node_radius(&self, record: &ModelRecord) -> f32 {
        f32::from(record.importance) * self.node_radius_per_importance
    }

    pub fn node_color(&self, record: &ModelRecord) -> Color32 {
        let alpha = if record.extinct {
            self.extinct_node_alpha
        } else {
            self.node_alpha
        };
        with_alpha(self.record_color(record), alpha)
    }

    /// Importance 4 and up get a halo and a highlight dot.
    pub fn has_glow(&self, record: &ModelRecord) -> bool {
        record.importance >= 4
    }

    pub fn wants_label(&self, record: &ModelRecord) -> bool {
        self.show_labels && record.importance >= self.label_threshold
    }

    pub fn label_font_size(&self, record: &ModelRecord) -> f32 {
        if record.importance >= 5 {
            self.major_label_font_size
        } else {
            self.label_font_size
        }
    }

    /// Height reserved above the tree for title and legend.
    pub fn header_height(&self) -> f32 {
        let mut height = 16.0;
        if self.show_title {
            height += 54.0;
        }
        if self.show_legend {
            height += 36.0;
        }
        height
    }

    pub fn footer_height(&self) -> f32 {
        if self.show_caption {
            36.0
        } else {
            16.0
        }
    }

    /// Part of the canvas labels may occupy: below the header, above the caption.
    pub fn label_area(&self, width: f32, height: f32) -> Rect {
        Rect::from_min_max(
            Pos2::new(0.0, self.header_height()),
            Pos2::new(width, (height - self.footer_height()).max(self.header_height())),
        )
    }

    /// Fit the layout's angular interval into the free part of the canvas.
    pub fn create_to_screen_transform(
        &self,
        config: &RadialLayoutConfig,
        width: f32,
        height: f32,
    ) -> RadialTransform {
        let margin = (width.min(height) * 0.04).clamp(12.0, 60.0);
        let area = Rect::from_min_max(
            Pos2::new(margin, self.header_height()),
            Pos2::new(width - margin, height - self.footer_height()),
        );
        RadialTransform::fit(config, self.rotation, area)
    }
}

/// Maps normalized polar positions to screen pixels (y pointing down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialTransform {
    pub center: Pos2,
    /// Pixels per unit of normalized radius.
    pub scale: f32,
    pub rotation: f64,
}

impl RadialTransform {
    pub fn fit(config: &RadialLayoutConfig, rotation: f64, area: Rect) -> Self {
        let (min_x, max_x, min_y, max_y) =
            sector_bounds(config.angle_min + rotation, config.angle_max + rotation);
        let box_w = (max_x - min_x).max(1e-6) as f32;
        let box_h = (max_y - min_y).max(1e-6) as f32;

        let scale = (area.width().max(1.0) / box_w)
            .min(area.height().max(1.0) / box_h)
            .max(1e-3);

        let left = area.left() + (area.width() - box_w * scale) * 0.5;
        let top = area.top() + (area.height() - box_h * scale) * 0.5;
        let center = Pos2::new(
            left - min_x as f32 * scale,
            top + max_y as f32 * scale,
        );

        Self {
            center,
            scale,
            rotation,
        }
    }

    pub fn map_polar(&self, radius: f64, angle: f64) -> Pos2 {
        let theta = self.screen_angle(angle);
        let r = radius as f32 * self.scale;
        Pos2::new(
            self.center.x + r * theta.cos() as f32,
            self.center.y - r * theta.sin() as f32,
        )
    }

    /// Counter-clockwise angle on screen for a layout angle.
    pub fn screen_angle(&self, angle: f64) -> f64 {
        angle + self.rotation
    }

    /// Unit vector pointing away from the center along a layout angle.
    pub fn outward(&self, angle: f64) -> (f32, f32) {
        let theta = self.screen_angle(angle);
        (theta.cos() as f32, -theta.sin() as f32)
    }
}

/// Bounding box of the unit sector `[start, end]` including its apex.
fn sector_bounds(start: f64, end: f64) -> (f64, f64, f64, f64) {
    let (lo, hi) = (start.min(end), start.max(end));
    let mut xs = vec![0.0, lo.cos(), hi.cos()];
    let mut ys = vec![0.0, lo.sin(), hi.sin()];

    let first = (lo / FRAC_PI_2).ceil() as i64;
    let last = (hi / FRAC_PI_2).floor() as i64;
    for k in first..=last {
        let axis = k as f64 * FRAC_PI_2;
        xs.push(axis.cos());
        ys.push(axis.sin());
    }

    let fold = |values: &[f64]| {
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    };
    let (min_x, max_x) = fold(&xs);
    let (min_y, max_y) = fold(&ys);
    (min_x, max_x, min_y, max_y)
}

/// Parse `#RRGGBB` or `#RGB`.
pub fn parse_hex_color(raw: &str) -> Option<Color32> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color32::from_rgb(r, g, b))
        }
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
            Some(Color32::from_rgb(digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

pub fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

pub fn color_to_hex(color: Color32) -> String {
    let [r, g, b, _a] = color.to_srgba_unmultiplied();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

pub fn color_opacity(color: Color32) -> f32 {
    f32::from(color.a()) / 255.0
}
