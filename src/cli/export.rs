use std::fmt::Write;

use crate::layout::geometry::fmt_num;
use crate::layout::{ConnectorKind, MapLayout};
use crate::model::config::UiConfig;
use crate::util::unicode::truncate_to_width;

const DEFAULT_BACKGROUND: &str = "#1E1E2E";
const DEFAULT_NODE_FILL: &str = "#2A2A40";
const DEFAULT_TEXT: &str = "#E0E0F0";
const DEFAULT_DIM: &str = "#6C6C8A";

/// Approximate pixels per character of the 14px label font
const LABEL_CHAR_WIDTH: f64 = 8.0;

/// Render the layout as a standalone SVG document. The view box reaches
/// past the canvas far enough to show connectors that detour around it.
pub fn render_svg(layout: &MapLayout<'_>, ui: &UiConfig) -> String {
    let cfg = &layout.config;
    let color = |name: &str, default: &'static str| ui.colors.get(name).cloned().unwrap_or_else(|| default.to_string());
    let background = color("background", DEFAULT_BACKGROUND);
    let node_fill = color("node", DEFAULT_NODE_FILL);
    let text = color("text", DEFAULT_TEXT);
    let dim = color("dim", DEFAULT_DIM);
    let palette = ui.depth_palette();

    let margin = cfg.detour_margin + cfg.vertical_spacing;
    let vb_w = layout.bounds.width + 2.0 * margin;
    let vb_h = layout.bounds.height + 2.0 * margin;

    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{} {} {} {}" width="{}" height="{}">"#,
        fmt_num(-margin),
        fmt_num(-margin),
        fmt_num(vb_w),
        fmt_num(vb_h),
        fmt_num(vb_w),
        fmt_num(vb_h),
    );
    let _ = writeln!(
        out,
        r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
        fmt_num(-margin),
        fmt_num(-margin),
        fmt_num(vb_w),
        fmt_num(vb_h),
        background
    );

    out.push_str("  <g fill=\"none\" stroke-width=\"2\">\n");
    for curve in &layout.connectors {
        let stroke = &palette[curve.color_index(palette.len())];
        let dash = match curve.kind {
            ConnectorKind::Hierarchical => "",
            ConnectorKind::Custom => r#" stroke-dasharray="6 4""#,
        };
        let _ = writeln!(
            out,
            r#"    <path d="{}" stroke="{}"{}/>"#,
            curve.path.to_svg_path(),
            stroke,
            dash
        );
    }
    out.push_str("  </g>\n");

    let max_chars = ((cfg.node_width - 16.0) / LABEL_CHAR_WIDTH).max(1.0) as usize;
    out.push_str("  <g font-family=\"sans-serif\" font-size=\"14\">\n");
    for pos in &layout.positions {
        let rect = pos.rect(cfg);
        let border = &palette[pos.depth % palette.len()];
        let _ = writeln!(
            out,
            r#"    <rect x="{}" y="{}" width="{}" height="{}" rx="8" fill="{}" stroke="{}"/>"#,
            fmt_num(rect.x),
            fmt_num(rect.y),
            fmt_num(rect.width),
            fmt_num(rect.height),
            node_fill,
            border
        );
        let (fill, decoration) = if pos.task.completed {
            (&dim, r#" text-decoration="line-through""#)
        } else {
            (&text, "")
        };
        let _ = writeln!(
            out,
            r#"    <text x="{}" y="{}" fill="{}" text-anchor="middle" dominant-baseline="middle"{}>{}</text>"#,
            fmt_num(rect.x + rect.width / 2.0),
            fmt_num(rect.y + rect.height / 2.0),
            fill,
            decoration,
            escape_xml(&truncate_to_width(&pos.task.title, max_chars))
        );
    }
    out.push_str("  </g>\n");
    out.push_str("</svg>\n");
    out
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
