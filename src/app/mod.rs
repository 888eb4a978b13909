use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};

use crate::data::Dataset;
use crate::export::ExportJob;
use crate::tree::layout::{LayoutPreset, ParentAnchor, RadialLayout, RadialLayoutConfig, SpanWeight};
use crate::tree::painter::{BranchStyle, TreePainter};
use crate::tree::Tree;
use crate::{io, ui};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "ailineage",
    about = "Render the lineage of AI models as a radial phylogenetic tree."
)]
pub struct AppConfig {
    /// Directory the artifacts are written to.
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// File stem for every artifact (defaults to ai_tree_<preset>).
    #[arg(long, value_name = "STEM")]
    pub name: Option<String>,

    /// Angular interval and radius exponent preset.
    #[arg(short, long, value_enum, default_value_t = LayoutPreset::Fan)]
    pub preset: LayoutPreset,

    /// Output formats; repeat the flag or separate with commas.
    #[arg(
        short,
        long = "format",
        value_enum,
        value_delimiter = ',',
        default_values_t = [ExportFormat::Svg, ExportFormat::Png]
    )]
    pub formats: Vec<ExportFormat>,

    /// Canvas width in pixels
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Canvas height in pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Override the preset's radius exponent.
    #[arg(long, value_name = "P")]
    pub exponent: Option<f64>,

    /// Override the start of the angular interval, in radians.
    #[arg(long, value_name = "RAD", allow_negative_numbers = true)]
    pub angle_min: Option<f64>,

    /// Override the end of the angular interval, in radians.
    #[arg(long, value_name = "RAD", allow_negative_numbers = true)]
    pub angle_max: Option<f64>,

    /// Year mapped to the center.
    #[arg(long, default_value_t = 1958)]
    pub min_year: i32,

    /// Year mapped to the outer rim.
    #[arg(long, default_value_t = 2026)]
    pub max_year: i32,

    /// How a parent's span is divided among its children.
    #[arg(long, value_enum, default_value_t = SpanWeight::LeafCount)]
    pub weight: SpanWeight,

    /// Where a parent sits inside its span.
    #[arg(long, value_enum, default_value_t = ParentAnchor::ChildMean)]
    pub anchor: ParentAnchor,

    /// Draw straight connectors instead of curves.
    #[arg(long)]
    pub straight: bool,

    /// Minimum importance for a model to be labelled.
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub label_threshold: u8,

    /// PNG pixel multiplier.
    #[arg(long, default_value_t = 2.0)]
    pub scale: f32,

    /// Skip node labels.
    #[arg(long)]
    pub no_labels: bool,

    /// Skip timeline rings, extinction bands and breakthrough markers.
    #[arg(long)]
    pub no_annotations: bool,

    /// Skip the color legend.
    #[arg(long)]
    pub no_legend: bool,

    /// Print the summary only; write no files.
    #[arg(long)]
    pub headless_summary: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum ExportFormat {
    Svg,
    Png,
    Pdf,
    Html,
    Json,
    Newick,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Html => "html",
            ExportFormat::Json => "json",
            ExportFormat::Newick => "nwk",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Svg => write!(f, "svg"),
            ExportFormat::Png => write!(f, "png"),
            ExportFormat::Pdf => write!(f, "pdf"),
            ExportFormat::Html => write!(f, "html"),
            ExportFormat::Json => write!(f, "json"),
            ExportFormat::Newick => write!(f, "newick"),
        }
    }
}

impl AppConfig {
    pub fn layout_config(&self) -> Result<RadialLayoutConfig> {
        let mut config = self.preset.config();
        if let Some(exponent) = self.exponent {
            if !exponent.is_finite() || exponent <= 0.0 {
                bail!("--exponent must be a positive number, got {exponent}");
            }
            config.exponent = exponent;
        }
        config.angle_min = self.angle_min.unwrap_or(config.angle_min);
        config.angle_max = self.angle_max.unwrap_or(config.angle_max);
        if !(config.angle_min < config.angle_max) {
            bail!(
                "angle interval is empty: [{}, {}]",
                config.angle_min,
                config.angle_max
            );
        }
        if self.min_year >= self.max_year {
            bail!(
                "--min-year ({}) must be before --max-year ({})",
                self.min_year,
                self.max_year
            );
        }
        config.min_year = self.min_year;
        config.max_year = self.max_year;
        config.weight = self.weight;
        config.anchor = self.anchor;
        Ok(config)
    }

    pub fn painter(&self) -> TreePainter {
        TreePainter {
            branch_style: if self.straight {
                BranchStyle::Straight
            } else {
                BranchStyle::Curved
            },
            label_threshold: self.label_threshold,
            show_labels: !self.no_labels,
            show_timeline: !self.no_annotations,
            show_extinction_events: !self.no_annotations,
            show_breakthroughs: !self.no_annotations,
            show_legend: !self.no_legend,
            ..TreePainter::default()
        }
    }

    pub fn file_stem(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("ai_tree_{}", self.preset.name()))
    }

    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            bail!("canvas must be at least 1x1 pixels");
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            bail!("--scale must be a positive number, got {}", self.scale);
        }
        if self.formats.is_empty() && !self.headless_summary {
            bail!("no output format selected");
        }
        io::validate_stem(&self.file_stem())
    }
}

pub struct LineageApp;

impl LineageApp {
    pub fn run(config: &AppConfig) -> Result<()> {
        config.validate()?;
        let layout_config = config.layout_config()?;

        info!("Loading data...");
        let dataset = Dataset::builtin();
        let tree = Tree::from_records(&dataset.models)?;
        debug!("{} records, {} reachable", tree.len(), tree.reachable().len());

        info!("Computing {} layout...", config.preset.name());
        let layout = RadialLayout::from_tree(&tree, &layout_config);
        let painter = config.painter();

        ui::render_preview(&tree, &layout, config);
        if config.headless_summary {
            return Ok(());
        }

        io::ensure_output_dir(&config.output_dir)?;
        let stem = config.file_stem();
        let mut job = ExportJob::new(
            &tree,
            &layout,
            &painter,
            &dataset,
            (config.width as f32, config.height as f32),
            config.scale,
        );
        for &format in &config.formats {
            let path = io::output_path(&config.output_dir, &stem, format);
            job.write(format, &path)?;
        }
        ui::report_outputs(&config.output_dir, &stem, &config.formats, job.scene.labeled_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use tempfile::TempDir;

    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        AppConfig::try_parse_from(std::iter::once("ailineage").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_match_the_fan_poster() {
        let config = parse(&[]);
        assert_eq!(config.preset, LayoutPreset::Fan);
        assert_eq!(config.formats, vec![ExportFormat::Svg, ExportFormat::Png]);
        assert_eq!((config.width, config.height), (1200, 800));
        assert_eq!(config.file_stem(), "ai_tree_fan");

        let layout = config.layout_config().unwrap();
        assert_eq!(layout, LayoutPreset::Fan.config());
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let config = parse(&[
            "--preset",
            "semicircular",
            "--exponent",
            "0.5",
            "--angle-min",
            "-1.0",
            "--weight",
            "descendant",
            "--anchor",
            "midpoint",
            "-f",
            "json,newick",
            "--format",
            "html",
        ]);
        let layout = config.layout_config().unwrap();
        assert_eq!(layout.exponent, 0.5);
        assert_eq!(layout.angle_min, -1.0);
        assert_eq!(layout.angle_max, PI / 2.0);
        assert_eq!(layout.weight, SpanWeight::DescendantCount);
        assert_eq!(layout.anchor, ParentAnchor::SpanMidpoint);
        assert_eq!(
            config.formats,
            vec![ExportFormat::Json, ExportFormat::Newick, ExportFormat::Html]
        );
    }

    #[test]
    fn rejects_bad_combinations() {
        assert!(parse(&["--angle-min", "1", "--angle-max", "0"]).layout_config().is_err());
        assert!(parse(&["--min-year", "2030"]).layout_config().is_err());
        assert!(parse(&["--exponent", "0"]).layout_config().is_err());
        assert!(AppConfig::try_parse_from(["ailineage", "--label-threshold", "9"]).is_err());
        assert!(parse(&["--name", "a/b"]).validate().is_err());
        assert!(parse(&["--width", "0"]).validate().is_err());
    }

    #[test]
    fn flags_toggle_painter() {
        let painter = parse(&["--straight", "--no-annotations", "--no-labels"]).painter();
        assert_eq!(painter.branch_style, BranchStyle::Straight);
        assert!(!painter.show_labels);
        assert!(!painter.show_timeline && !painter.show_extinction_events);
        assert!(painter.show_legend);
    }

    #[test]
    fn runs_end_to_end() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let config = parse(&[
            "-o",
            out.to_str().unwrap(),
            "--name",
            "lineage",
            "-f",
            "svg,json,newick,html,pdf",
            "--width",
            "600",
            "--height",
            "400",
        ]);
        LineageApp::run(&config).unwrap();

        for ext in ["svg", "json", "nwk", "html", "pdf"] {
            assert!(out.join(format!("lineage.{ext}")).is_file(), "missing {ext}");
        }
    }

    #[test]
    fn summary_mode_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let config = parse(&["-o", out.to_str().unwrap(), "--headless-summary"]);
        LineageApp::run(&config).unwrap();
        assert!(!out.exists());
    }
}
