use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::json::{hierarchy, HierarchyNode};
use crate::io;
use crate::tree::layout::RadialLayout;
use crate::tree::painter::TreePainter;
use crate::tree::Tree;

const D3_CDN: &str = "https://d3js.org/d3.v7.min.js";

/// A node as the page script sees it: record fields plus its polar position.
#[derive(Debug, Serialize)]
struct PlacedNode<'a> {
    name: &'a str,
    parent: Option<&'a str>,
    year: i32,
    color: &'a str,
    importance: u8,
    branch_type: &'a str,
    extinct: bool,
    radius: f64,
    angle: f64,
}

#[derive(Debug, Serialize)]
struct PageData<'a> {
    title: &'a str,
    subtitle: &'a str,
    hierarchy: HierarchyNode<'a>,
    nodes: Vec<PlacedNode<'a>>,
    label_threshold: u8,
}

pub fn render_html(tree: &Tree, layout: &RadialLayout, painter: &TreePainter) -> Result<String> {
    let nodes = tree
        .reachable()
        .into_iter()
        .filter_map(|id| {
            let position = layout.get(id)?;
            let node = &tree.nodes[id];
            let record = &node.record;
            Some(PlacedNode {
                name: &record.name,
                parent: node.parent.map(|parent| tree.nodes[parent].name()),
                year: record.year,
                color: &record.color,
                importance: record.importance,
                branch_type: &record.branch_type,
                extinct: record.extinct,
                radius: position.radius,
                angle: position.angle,
            })
        })
        .collect();

    let data = PageData {
        title: &painter.title,
        subtitle: &painter.subtitle,
        hierarchy: hierarchy(tree),
        nodes,
        label_threshold: if painter.show_labels {
            painter.label_threshold
        } else {
            u8::MAX
        },
    };
    // A literal "</" would close the script element early.
    let payload = serde_json::to_string(&data)
        .context("failed to serialize page data")?
        .replace("</", "<\\/");

    Ok(PAGE_TEMPLATE
        .replace("{{title}}", &escape_html(&painter.title))
        .replace("{{d3}}", D3_CDN)
        .replace("{{data}}", &payload))
}

pub fn export_html(
    tree: &Tree,
    layout: &RadialLayout,
    painter: &TreePainter,
    path: &Path,
) -> Result<()> {
    io::write_text(path, &render_html(tree, layout, painter)?)
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{title}}</title>
<script src="{{d3}}"></script>
<style>
  body { margin: 0; background: #FCFCFA; font-family: Helvetica, Arial, sans-serif; }
  header { text-align: center; padding: 16px 0 0; }
  header h1 { margin: 0; font-size: 24px; color: #1C2833; }
  header p { margin: 4px 0 0; color: #7F8C8D; font-style: italic; }
  #chart { width: 100vw; height: calc(100vh - 80px); }
  .link { fill: none; }
  .node { stroke: #fff; stroke-width: 0.8px; }
  .label { font-size: 9px; fill: #1A1A1A; pointer-events: none; }
  .tooltip { position: absolute; pointer-events: none; background: rgba(255,255,255,0.95);
             border: 1px solid #BDC3C7; border-radius: 4px; padding: 6px 10px; font-size: 12px;
             line-height: 1.4; opacity: 0; }
</style>
</head>
<body>
<header><h1 id="title"></h1><p id="subtitle"></p></header>
<svg id="chart"></svg>
<div class="tooltip" id="tooltip"></div>
<script>
const DATA = {{data}};

document.getElementById("title").textContent = DATA.title;
document.getElementById("subtitle").textContent = DATA.subtitle;

const svg = d3.select("#chart");
const box = svg.node().getBoundingClientRect();
const radius = Math.min(box.width, box.height) * 0.45;
const root = svg.append("g");
const view = root.append("g")
  .attr("transform", `translate(${box.width / 2},${box.height / 2})`);

svg.call(d3.zoom().scaleExtent([0.3, 8]).on("zoom", (event) => {
  root.attr("transform", event.transform);
}));

// Angle 0 points up; positive angles turn counter-clockwise.
const project = (d) => [
  -d.radius * radius * Math.sin(d.angle),
  -d.radius * radius * Math.cos(d.angle),
];
const byName = new Map(DATA.nodes.map((d) => [d.name, d]));

const links = DATA.nodes
  .filter((d) => d.parent && byName.has(d.parent))
  .map((d) => ({ source: byName.get(d.parent), target: d }));

view.append("g").selectAll("path")
  .data(links)
  .join("path")
  .attr("class", "link")
  .attr("d", (l) => {
    const [x1, y1] = project(l.source);
    const [x2, y2] = project(l.target);
    const mx = (x1 + x2) / 2;
    const my = (y1 + y2) / 2;
    return `M${x1},${y1} Q${mx * 1.05},${my * 1.05} ${x2},${y2}`;
  })
  .attr("stroke", (l) => l.target.color)
  .attr("stroke-width", (l) => l.target.importance * 0.8)
  .attr("stroke-opacity", (l) => (l.target.extinct ? 0.25 : 0.7));

const tooltip = d3.select("#tooltip");

view.append("g").selectAll("circle")
  .data(DATA.nodes)
  .join("circle")
  .attr("class", "node")
  .attr("cx", (d) => project(d)[0])
  .attr("cy", (d) => project(d)[1])
  .attr("r", (d) => d.importance * 1.6)
  .attr("fill", (d) => d.color)
  .attr("fill-opacity", (d) => (d.extinct ? 0.4 : 0.95))
  .on("mouseover", (event, d) => {
    tooltip.style("opacity", 1).html(
      `<strong>${d.name}</strong><br>Year: ${d.year}<br>Branch: ${d.branch_type}` +
      `<br>Importance: ${"★".repeat(d.importance)}` +
      `<br>Status: ${d.extinct ? "Extinct" : "Active"}` +
      (d.parent ? `<br>Parent: ${d.parent}` : "")
    );
  })
  .on("mousemove", (event) => {
    tooltip.style("left", `${event.pageX + 12}px`).style("top", `${event.pageY - 12}px`);
  })
  .on("mouseout", () => tooltip.style("opacity", 0));

view.append("g").selectAll("text")
  .data(DATA.nodes.filter((d) => d.importance >= DATA.label_threshold))
  .join("text")
  .attr("class", "label")
  .attr("x", (d) => project(d)[0] + (Math.sin(d.angle) <= 0 ? 8 : -8))
  .attr("y", (d) => project(d)[1])
  .attr("dy", "0.35em")
  .attr("text-anchor", (d) => (Math.sin(d.angle) <= 0 ? "start" : "end"))
  .style("font-weight", (d) => (d.importance >= 5 ? "bold" : null))
  .text((d) => d.name);
</script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use serde_json::Value;
    use tempfile::TempDir;

    use super::*;
    use crate::data::ai_models;
    use crate::tree::layout::LayoutPreset;
    use crate::tree::tests::sample_tree;

    fn embedded_data(page: &str) -> Value {
        let start = page.find("const DATA = ").unwrap() + "const DATA = ".len();
        let end = start + page[start..].find(";\n").unwrap();
        serde_json::from_str(&page[start..end]).unwrap()
    }

    #[test]
    fn embeds_positions_and_hierarchy() {
        let tree = sample_tree();
        let layout = RadialLayout::from_preset(&tree, LayoutPreset::Radial);
        let page = render_html(&tree, &layout, &TreePainter::default()).unwrap();

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(D3_CDN));
        assert!(page.contains("d3.zoom()"));

        let data = embedded_data(&page);
        assert_eq!(data["hierarchy"]["name"], "Perceptron");
        let nodes = data["nodes"].as_array().unwrap();
        assert_eq!(nodes.len(), tree.len());
        let a = nodes.iter().find(|n| n["name"] == "A").unwrap();
        assert_eq!(a["parent"], "Perceptron");
        assert!((a["radius"].as_f64().unwrap() - 28.0 / 68.0).abs() < 1e-9);
        assert!(nodes[0]["parent"].is_null());
    }

    #[test]
    fn escapes_title_and_script_breakers() {
        let tree = sample_tree();
        let layout = RadialLayout::from_preset(&tree, LayoutPreset::Radial);
        let painter = TreePainter {
            title: "Models </script> & more".to_owned(),
            ..TreePainter::default()
        };
        let page = render_html(&tree, &layout, &painter).unwrap();
        assert!(page.contains("<title>Models &lt;/script&gt; &amp; more</title>"));
        assert_eq!(page.matches("</script>").count(), 2);
    }

    #[test]
    fn writes_builtin_page() {
        let tree = Tree::from_records(&ai_models()).unwrap();
        let layout = RadialLayout::from_preset(&tree, LayoutPreset::Fan);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tree.html");
        export_html(&tree, &layout, &TreePainter::default(), &path).unwrap();

        let page = std::fs::read_to_string(&path).unwrap();
        assert!(page.contains("\"name\":\"Perceptron\""));
        assert!(page.trim_end().ends_with("</html>"));
    }
}
