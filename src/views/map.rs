//! Standalone SVG drawing of a `MapLayout`.

use crate::export::escape_xml;
use crate::layout::{GrowAnimation, LaidOut, MapLayout, NODE_H, NODE_W, RADIUS, Viewport};
use crate::shared::table::truncate_with_ellipsis;
use std::fmt::Write as _;

const TITLE_CHARS: usize = 30;
const CHIP_CHARS: usize = 36;
const MAX_CHIP_TAGS: usize = 3;

struct Theme {
    background: &'static str,
    fill: &'static str,
    text: &'static str,
    muted: &'static str,
    edge: &'static str,
}

const DARK: Theme = Theme {
    background: "#0f1115",
    fill: "#171a21",
    text: "#e6e6e6",
    muted: "#9aa4b2",
    edge: "#3a4150",
};

const LIGHT: Theme = Theme {
    background: "#f7f7f9",
    fill: "#ffffff",
    text: "#1b1f24",
    muted: "#5b6470",
    edge: "#c4c9d1",
};

#[derive(Debug, Clone, Default)]
pub struct MapOptions {
    pub viewport: Viewport,
    pub animate: Option<GrowAnimation>,
    pub dark: bool,
}

/// Cubic edge from the right middle of `parent` to the left middle of `child`.
pub fn edge_path(parent: &LaidOut<'_>, child: &LaidOut<'_>) -> String {
    let (x1, y1) = (parent.right(), parent.center_y());
    let (x2, y2) = (child.x, child.center_y());
    let mx = (x1 + x2) / 2.0;
    format!("M {x1} {y1} C {mx} {y1}, {mx} {y2}, {x2} {y2}")
}

/// Type first, then up to three tags.
pub fn chip_text(item: &LaidOut<'_>) -> String {
    let node = item.node;
    let mut chips: Vec<&str> = Vec::new();
    if !node.kind.is_empty() {
        chips.push(&node.kind);
    }
    chips.extend(node.tags.iter().take(MAX_CHIP_TAGS).map(String::as_str));
    chips.join(" · ")
}

fn tooltip(item: &LaidOut<'_>) -> String {
    let node = item.node;
    let mut lines = vec![node.title.clone()];
    if !node.summary.is_empty() {
        lines.push(node.summary.clone());
    }
    if !node.kind.is_empty() {
        lines.push(node.kind.clone());
    }
    if !node.tags.is_empty() {
        lines.push(
            node.tags
                .iter()
                .map(|t| crate::tags::display_tag(t))
                .collect::<Vec<_>>()
                .join(" "),
        );
    }
    lines.join("\n")
}

fn draw_edges(item: &LaidOut<'_>, out: &mut String) {
    for child in &item.children {
        let _ = writeln!(out, "    <path class=\"edge\" d=\"{}\"/>", edge_path(item, child));
        draw_edges(child, out);
    }
}

fn draw_box(item: &LaidOut<'_>, out: &mut String) {
    let node = item.node;
    let (x, y) = (item.x, item.y);
    let _ = writeln!(out, "    <g class=\"node\" data-id=\"{}\">", escape_xml(&node.id));
    let _ = writeln!(out, "      <title>{}</title>", escape_xml(&tooltip(item)));
    let _ = writeln!(
        out,
        "      <rect class=\"node-rect\" x=\"{x}\" y=\"{y}\" width=\"{NODE_W}\" height=\"{NODE_H}\" rx=\"{RADIUS}\" stroke=\"{}\"/>",
        escape_xml(node.color_hex())
    );
    let _ = writeln!(
        out,
        "      <text class=\"node-title\" x=\"{}\" y=\"{}\">{}</text>",
        x + 12.0,
        y + 22.0,
        escape_xml(&truncate_with_ellipsis(&node.title, TITLE_CHARS))
    );
    let chips = chip_text(item);
    if !chips.is_empty() {
        let _ = writeln!(
            out,
            "      <text class=\"node-chip\" x=\"{}\" y=\"{}\">{}</text>",
            x + 12.0,
            y + 40.0,
            escape_xml(&truncate_with_ellipsis(&chips, CHIP_CHARS))
        );
    }
    if node.has_children() {
        let glyph = if item.collapsed { "▸" } else { "▾" };
        let _ = writeln!(
            out,
            "      <text class=\"node-toggle\" x=\"{}\" y=\"{}\">{glyph}</text>",
            x + NODE_W - 18.0,
            y + 22.0
        );
    }
    out.push_str("    </g>\n");
    for child in &item.children {
        draw_box(child, out);
    }
}

fn draw_animation(anim: &GrowAnimation, out: &mut String) {
    let dur = anim.duration_ms;
    // keySplines approximates ease-out cubic.
    let _ = writeln!(
        out,
        "    <animateTransform attributeName=\"transform\" type=\"translate\" from=\"{} 0\" to=\"0 0\" dur=\"{dur}ms\" fill=\"freeze\" calcMode=\"spline\" keyTimes=\"0;1\" keySplines=\"0.33 1 0.68 1\"/>",
        anim.offset_x
    );
    let _ = writeln!(
        out,
        "    <animateTransform attributeName=\"transform\" type=\"scale\" additive=\"sum\" from=\"{}\" to=\"1\" dur=\"{dur}ms\" fill=\"freeze\" calcMode=\"spline\" keyTimes=\"0;1\" keySplines=\"0.33 1 0.68 1\"/>",
        anim.from_scale
    );
}

pub fn render_svg(layout: &MapLayout<'_>, opts: &MapOptions) -> String {
    let theme = if opts.dark { &DARK } else { &LIGHT };
    let (w, h) = (layout.width.max(NODE_W), layout.height.max(NODE_H));
    let mut out = String::new();
    let _ = writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
    );
    let _ = writeln!(
        out,
        "  <style>\
.edge{{fill:none;stroke:{edge};stroke-width:2}}\
.node-rect{{fill:{fill};stroke-width:2}}\
.node-title{{fill:{text};font:600 14px system-ui,sans-serif}}\
.node-chip{{fill:{muted};font:12px system-ui,sans-serif}}\
.node-toggle{{fill:{muted};font:14px system-ui,sans-serif;cursor:pointer}}\
</style>",
        edge = theme.edge,
        fill = theme.fill,
        text = theme.text,
        muted = theme.muted
    );
    let _ = writeln!(
        out,
        "  <rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    );
    let _ = writeln!(out, "  <g id=\"world\" transform=\"{}\">", opts.viewport.transform());
    out.push_str("   <g id=\"grow\">\n");
    if let Some(anim) = &opts.animate {
        draw_animation(anim, &mut out);
    }
    for root in &layout.roots {
        draw_edges(root, &mut out);
    }
    for root in &layout.roots {
        draw_box(root, &mut out);
    }
    out.push_str("   </g>\n");
    out.push_str("  </g>\n");
    out.push_str("</svg>\n");
    out
}
