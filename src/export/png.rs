use std::path::Path;

use anyhow::Result;

use crate::tree::scene_graph::TreeSceneGraph;
use crate::tree::skia_renderer::SkiaTreeRenderer;

/// Rasterize at `scale` device pixels per scene pixel.
pub fn export_png(
    renderer: &SkiaTreeRenderer,
    scene: &TreeSceneGraph,
    scale: f32,
    path: &Path,
) -> Result<()> {
    renderer.save_png(scene, scale, path)
}
