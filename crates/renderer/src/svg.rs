//! SVG output for the dashboard.

use std::fmt::Write;

use crate::chart::{ChartLayout, LineChart};
use crate::color::Color;

const FONT: &str = "Helvetica, Arial, sans-serif";

/// Render `chart` as a standalone SVG document.
pub fn render_svg(chart: &LineChart, width: f64, height: f64) -> String {
    layout_to_svg(&chart.layout(width, height))
}

/// Serialize an already computed layout.
pub fn layout_to_svg(layout: &ChartLayout) -> String {
    let mut out = String::with_capacity(4096);
    let plot = layout.plot;

    // Writing to a String cannot fail.
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="{font}">"#,
        w = fmt_num(layout.width),
        h = fmt_num(layout.height),
        font = FONT
    );
    let _ = writeln!(
        out,
        r##"<rect x="0" y="0" width="{}" height="{}" fill="#ffffff"/>"##,
        fmt_num(layout.width),
        fmt_num(layout.height)
    );

    // Grid and ticks
    for tick in &layout.x_ticks {
        let _ = writeln!(
            out,
            r#"<line x1="{x}" y1="{top}" x2="{x}" y2="{bottom}" stroke="{grid}" stroke-width="0.5"/>"#,
            x = fmt_num(tick.position),
            top = fmt_num(plot.y),
            bottom = fmt_num(plot.bottom()),
            grid = Color::GRID.to_hex()
        );
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" font-size="10" text-anchor="middle">{}</text>"#,
            fmt_num(tick.position),
            fmt_num(plot.bottom() + 14.0),
            escape(&tick.label)
        );
    }
    for tick in &layout.y_ticks {
        let _ = writeln!(
            out,
            r#"<line x1="{left}" y1="{y}" x2="{right}" y2="{y}" stroke="{grid}" stroke-width="0.5"/>"#,
            y = fmt_num(tick.position),
            left = fmt_num(plot.x),
            right = fmt_num(plot.right()),
            grid = Color::GRID.to_hex()
        );
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" font-size="10" text-anchor="end">{}</text>"#,
            fmt_num(plot.x - 6.0),
            fmt_num(tick.position + 3.5),
            escape(&tick.label)
        );
    }

    if let Some(y) = layout.zero_line {
        let _ = writeln!(
            out,
            r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="1" stroke-dasharray="4 3"/>"#,
            fmt_num(plot.x),
            fmt_num(plot.right()),
            Color::ZERO_LINE.to_hex(),
            y = fmt_num(y)
        );
    }

    for line in &layout.lines {
        if line.points.is_empty() {
            continue;
        }
        let points: Vec<String> = line
            .points
            .iter()
            .map(|(x, y)| format!("{},{}", fmt_num(*x), fmt_num(*y)))
            .collect();
        let dash = if line.dashed {
            r#" stroke-dasharray="6 4""#
        } else {
            ""
        };
        let _ = writeln!(
            out,
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="1.5"{}/>"#,
            points.join(" "),
            line.color.to_hex(),
            dash
        );
    }

    let _ = writeln!(
        out,
        r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="1"/>"#,
        fmt_num(plot.x),
        fmt_num(plot.y),
        fmt_num(plot.width),
        fmt_num(plot.height),
        Color::AXIS.to_hex()
    );

    // Legend, top-right inside the plot
    for (i, entry) in layout.legend.iter().enumerate() {
        let y = plot.y + 14.0 + i as f64 * 14.0;
        let x = plot.right() - 150.0;
        let dash = if entry.dashed {
            r#" stroke-dasharray="6 4""#
        } else {
            ""
        };
        let _ = writeln!(
            out,
            r#"<line x1="{}" y1="{y}" x2="{}" y2="{y}" stroke="{}" stroke-width="1.5"{}/>"#,
            fmt_num(x),
            fmt_num(x + 20.0),
            entry.color.to_hex(),
            dash,
            y = fmt_num(y)
        );
        let _ = writeln!(
            out,
            r#"<text x="{}" y="{}" font-size="10">{}</text>"#,
            fmt_num(x + 26.0),
            fmt_num(y + 3.5),
            escape(&entry.label)
        );
    }

    let _ = writeln!(
        out,
        r#"<text x="{}" y="{}" font-size="14" font-weight="bold" text-anchor="middle">{}</text>"#,
        fmt_num(plot.center_x()),
        fmt_num(plot.y - 14.0),
        escape(&layout.title)
    );
    let _ = writeln!(
        out,
        r#"<text x="{}" y="{}" font-size="11" text-anchor="middle">{}</text>"#,
        fmt_num(plot.center_x()),
        fmt_num(layout.height - 12.0),
        escape(&layout.x_label)
    );
    let _ = writeln!(
        out,
        r#"<text x="{x}" y="{y}" font-size="11" text-anchor="middle" transform="rotate(-90 {x} {y})">{label}</text>"#,
        x = fmt_num(16.0),
        y = fmt_num(plot.center_y()),
        label = escape(&layout.y_label)
    );

    out.push_str("</svg>\n");
    out
}

/// Two decimals, trailing zeros trimmed.
fn fmt_num(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
