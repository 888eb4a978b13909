pub mod html;
pub mod json;
pub mod newick;
pub mod pdf;
pub mod png;
pub mod svg;

use std::path::Path;

use anyhow::Result;
use log::info;

use crate::app::ExportFormat;
use crate::data::Dataset;
use crate::tree::layout::RadialLayout;
use crate::tree::painter::TreePainter;
use crate::tree::scene_graph::{build_tree_scene, TreeSceneGraph};
use crate::tree::skia_renderer::SkiaTreeRenderer;
use crate::tree::Tree;

/// Everything needed to write one laid-out tree in any format.
///
/// The scene is built once and shared by the SVG, PNG and PDF writers.
pub struct ExportJob<'a> {
    pub tree: &'a Tree,
    pub layout: &'a RadialLayout,
    pub painter: &'a TreePainter,
    pub scene: TreeSceneGraph,
    /// PNG device pixels per scene pixel.
    pub scale: f32,
    renderer: Option<SkiaTreeRenderer>,
}

impl<'a> ExportJob<'a> {
    pub fn new(
        tree: &'a Tree,
        layout: &'a RadialLayout,
        painter: &'a TreePainter,
        dataset: &Dataset,
        size: (f32, f32),
        scale: f32,
    ) -> Self {
        let scene = build_tree_scene(tree, layout, painter, dataset, size.0, size.1);
        Self {
            tree,
            layout,
            painter,
            scene,
            scale,
            renderer: None,
        }
    }

    /// Replace the raster backend, e.g. with a text-free one.
    #[cfg(test)]
    pub fn with_renderer(mut self, renderer: SkiaTreeRenderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn write(&mut self, format: ExportFormat, path: &Path) -> Result<()> {
        match format {
            ExportFormat::Svg => svg::export_svg(&self.scene, path)?,
            ExportFormat::Png => {
                let renderer = self.renderer.get_or_insert_with(SkiaTreeRenderer::new);
                png::export_png(renderer, &self.scene, self.scale, path)?;
            }
            ExportFormat::Pdf => pdf::export_pdf(&self.scene, &self.painter.title, path)?,
            ExportFormat::Html => html::export_html(self.tree, self.layout, self.painter, path)?,
            ExportFormat::Json => json::export_json(self.tree, path)?,
            ExportFormat::Newick => newick::export_newick(self.tree, path)?,
        }
        info!("Rendered {format}: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;
    use tempfile::TempDir;

    use super::*;
    use crate::tree::layout::LayoutPreset;

    #[test]
    fn writes_every_format() {
        let dataset = Dataset::builtin();
        let tree = Tree::from_records(&dataset.models).unwrap();
        let layout = RadialLayout::from_preset(&tree, LayoutPreset::Artistic);
        let painter = TreePainter::default();
        let mut job = ExportJob::new(&tree, &layout, &painter, &dataset, (800.0, 600.0), 1.0)
            .with_renderer(SkiaTreeRenderer::without_text());

        let dir = TempDir::new().unwrap();
        for format in ExportFormat::value_variants() {
            let path = dir.path().join(format!("tree.{}", format.extension()));
            job.write(*format, &path).unwrap();
            let written = std::fs::metadata(&path).unwrap();
            assert!(written.len() > 0, "{format} output is empty");
        }
    }

    #[test]
    fn reports_unwritable_paths() {
        let dataset = Dataset::builtin();
        let tree = Tree::from_records(&dataset.models).unwrap();
        let layout = RadialLayout::from_preset(&tree, LayoutPreset::Fan);
        let painter = TreePainter::default();
        let mut job = ExportJob::new(&tree, &layout, &painter, &dataset, (400.0, 300.0), 1.0);

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("tree.json");
        let err = job.write(ExportFormat::Json, &path).unwrap_err();
        assert!(format!("{err:#}").contains("tree.json"));
    }
}
