//! Server-rendered HTML pages.

use std::fmt::Write;
use std::sync::Arc;

use axum::{extract::Extension, response::Html};
use bts_parser::AnalysisResult;
use dfos_common::{Channel, ChannelSeries};
use renderer::{render_svg, Color, LineChart, Series};

use super::common::escape_html;
use crate::session::Session;
use crate::state::AppState;

const CHART_WIDTH: f64 = 720.0;
const CHART_HEIGHT: f64 = 320.0;

/// Line colors for overlay charts, cycled per file.
const OVERLAY_PALETTE: [&str; 8] = [
    "#e74c3c", "#3498db", "#2ecc71", "#f39c12", "#9b59b6", "#1abc9c", "#34495e", "#e67e22",
];

const STYLE: &str = r#"
body { font-family: Helvetica, Arial, sans-serif; margin: 0; background: #f5f6fa; color: #2c3e50; }
header { background: #2c3e50; color: #fff; padding: 12px 24px; display: flex; gap: 24px; align-items: baseline; }
header a { color: #ecf0f1; }
main { padding: 16px 24px; }
section { background: #fff; border-radius: 6px; padding: 12px 16px; margin-bottom: 16px; }
table { border-collapse: collapse; }
td, th { padding: 4px 10px; border-bottom: 1px solid #ecf0f1; text-align: left; }
.error { color: #c0392b; }
.ok { color: #27ae60; }
.channel { display: flex; gap: 16px; align-items: flex-start; flex-wrap: wrap; }
.stats { font-family: Courier, monospace; white-space: pre; }
form.inline { display: inline; }
input[type=number] { width: 90px; }
"#;

/// GET /
pub async fn dashboard_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    let session = state.session.lock().await;
    let mut body = String::new();

    upload_section(&mut body, &session);
    batch_section(&mut body, &session);
    files_section(&mut body, &session);
    overlay_section(&mut body, &session);
    compare_section(&mut body, &session);

    Html(page("DFOS Monitor", &body))
}

/// GET /history
pub async fn history_handler(Extension(state): Extension<Arc<AppState>>) -> Html<String> {
    let session = state.session.lock().await;
    let mut body = String::new();

    let _ = write!(body, "<section><h2>Processing History</h2>");
    let mut rows = session.history().peekable();
    if rows.peek().is_none() {
        body.push_str("<p>No files processed yet.</p>");
    } else {
        body.push_str(
            "<table><tr><th>Processed (UTC)</th><th>File</th><th>Status</th><th>Type</th><th>Time (ms)</th><th>Message</th></tr>",
        );
        for entry in rows {
            let _ = write!(
                body,
                "<tr><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{:.1}</td><td>{}</td></tr>",
                entry.processed_at.format("%Y-%m-%d %H:%M:%S"),
                escape_html(&entry.file),
                if entry.success { "ok" } else { "error" },
                if entry.success { "Success" } else { "Failed" },
                entry.file_type.map(|t| t.description()).unwrap_or("-"),
                entry.duration_ms,
                escape_html(entry.message.as_deref().unwrap_or("")),
            );
        }
        body.push_str("</table>");
    }
    body.push_str(
        r#"<form method="post" action="/history/clear"><button type="submit">Clear history</button></form></section>"#,
    );

    Html(page("DFOS Monitor: History", &body))
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en"><head><meta charset="utf-8"><title>{title}</title><style>{style}</style></head>
<body><header><h1>{title}</h1><a href="/">Dashboard</a><a href="/history">History</a><a href="/api/files">API</a></header>
<main>{body}</main></body></html>"#,
        title = escape_html(title),
        style = STYLE,
        body = body
    )
}

fn upload_section(out: &mut String, session: &Session) {
    out.push_str(
        r#"<section><h2>Upload</h2>
<form method="post" action="/upload" enctype="multipart/form-data">
<input type="file" name="files" accept=".h5,.bts" multiple> <button type="submit">Upload</button></form>"#,
    );

    let pending = session.pending();
    if !pending.is_empty() {
        out.push_str("<h3>Pending</h3><table>");
        for upload in &pending {
            let _ = write!(
                out,
                r#"<tr><td>{}</td><td>{:.2} MB</td><td><form class="inline" method="post" action="/process/{}"><button type="submit">Process</button></form></td></tr>"#,
                escape_html(&upload.name),
                upload.size as f64 / (1024.0 * 1024.0),
                urlencoding::encode(&upload.name),
            );
        }
        out.push_str(
            r#"</table><form method="post" action="/process-all"><button type="submit">Process all</button></form>"#,
        );
    }
    out.push_str(
        r#"<form method="post" action="/clear"><button type="submit">Clear all files</button></form></section>"#,
    );
}

fn batch_section(out: &mut String, session: &Session) {
    let Some(batch) = session.last_batch() else {
        return;
    };
    let _ = write!(
        out,
        "<section><h2>Last batch</h2><p>{} succeeded, {} failed</p><ul>",
        batch.succeeded, batch.failed
    );
    for outcome in &batch.outcomes {
        match &outcome.message {
            None => {
                let _ = write!(
                    out,
                    "<li class=\"ok\">{}: {}</li>",
                    escape_html(&outcome.file),
                    outcome.file_type.map(|t| t.description()).unwrap_or(""),
                );
            }
            Some(message) => {
                let _ = write!(
                    out,
                    "<li class=\"error\">{}: {}</li>",
                    escape_html(&outcome.file),
                    escape_html(message),
                );
            }
        }
    }
    out.push_str("</ul></section>");
}

fn files_section(out: &mut String, session: &Session) {
    for summary in session.summaries() {
        let name = &summary.name;
        let encoded = urlencoding::encode(name);
        let _ = write!(out, "<section><h2>{}</h2>", escape_html(name));

        let extraction = match session.result(name) {
            Ok(AnalysisResult::Success(extraction)) => extraction,
            Ok(AnalysisResult::Failure(err)) => {
                let _ = write!(out, "<p class=\"error\">{}</p>", escape_html(&err.to_string()));
                remove_button(out, &encoded);
                out.push_str("</section>");
                continue;
            }
            Err(_) => continue,
        };

        let _ = write!(
            out,
            "<p>{} &middot; {} distance points &middot; {} time samples</p>",
            extraction.file_type.description(),
            extraction.distance_points,
            extraction.time.len()
        );

        for channel in extraction.display_channels() {
            match session.channel_series(name, channel) {
                Ok(series) => channel_block(out, name, &encoded, &series),
                Err(err) => {
                    let _ = write!(out, "<p class=\"error\">{}</p>", escape_html(&err.to_string()));
                }
            }
        }

        let _ = write!(
            out,
            r#"<p><a href="/files/{e}/export.csv">Download CSV</a> &middot; <a href="/files/{e}/report.pdf">Download PDF report</a> &middot; <a href="/api/files/{e}">JSON</a></p>"#,
            e = encoded
        );
        remove_button(out, &encoded);
        out.push_str("</section>");
    }
}

fn remove_button(out: &mut String, encoded: &str) {
    let _ = write!(
        out,
        r#"<form method="post" action="/files/{}/remove"><button type="submit">Remove</button></form>"#,
        encoded
    );
}

fn channel_block(out: &mut String, name: &str, encoded: &str, series: &ChannelSeries) {
    let channel = series.channel;
    let color = Color::from_hex(channel.color()).unwrap_or_default();
    let chart = LineChart::new(
        format!("{} - {}", channel.title(), name),
        "Distance Index",
        channel.axis_label(),
    )
    .with_series(Series::new(series.x_values(), series.values.clone(), color));

    let stats = series
        .stats()
        .map(|s| s.lines(channel.unit()).join("\n"))
        .unwrap_or_default();

    let _ = write!(
        out,
        r#"<div class="channel"><div>{svg}</div><div><div class="stats">{stats}</div>
<form method="post" action="/files/{encoded}/controls">
<input type="hidden" name="channel" value="{channel}">
<label>Offset ({unit}) <input type="number" step="any" name="offset" value="{offset}"></label><br>
<label>X min <input type="number" min="0" name="x_min" value="{x_min}"></label>
<label>X max <input type="number" min="0" name="x_max" value="{x_max}"></label>
<button type="submit">Apply</button></form></div></div>"#,
        svg = render_svg(&chart, CHART_WIDTH, CHART_HEIGHT),
        stats = escape_html(&stats),
        encoded = encoded,
        channel = channel.as_str(),
        unit = escape_html(channel.unit()),
        offset = series.offset,
        x_min = series.range.min,
        x_max = series.range.max,
    );
}

fn overlay_section(out: &mut String, session: &Session) {
    for channel in Channel::ALL {
        let overlay = session.overlay(channel);
        if overlay.len() < 2 {
            continue;
        }

        let mut chart = LineChart::new(
            format!("{} Comparison", channel.label()),
            "Distance Index",
            channel.axis_label(),
        );
        for (index, (name, series)) in overlay.iter().enumerate() {
            let color = Color::from_hex(OVERLAY_PALETTE[index % OVERLAY_PALETTE.len()])
                .unwrap_or_default();
            chart = chart.with_series(
                Series::new(series.x_values(), series.values.clone(), color).labelled(name.clone()),
            );
        }

        let range = session.overlay_range(channel);
        let _ = write!(
            out,
            r#"<section><h2>{label} overlay</h2>{svg}
<form method="post" action="/overlay/controls">
<input type="hidden" name="channel" value="{channel}">
<label>X min <input type="number" min="0" name="x_min" value="{x_min}"></label>
<label>X max <input type="number" min="0" name="x_max" value="{x_max}"></label>
<button type="submit">Apply to all files</button></form></section>"#,
            label = channel.label(),
            svg = render_svg(&chart, CHART_WIDTH, CHART_HEIGHT),
            channel = channel.as_str(),
            x_min = range.map(|r| r.min.to_string()).unwrap_or_default(),
            x_max = range.map(|r| r.max.to_string()).unwrap_or_default(),
        );
    }
}

fn compare_section(out: &mut String, session: &Session) {
    let names = session.processed_names();
    if names.len() < 2 {
        return;
    }

    let options = |selected: usize| {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                format!(
                    "<option value=\"{v}\"{s}>{v}</option>",
                    v = escape_html(name),
                    s = if i == selected { " selected" } else { "" }
                )
            })
            .collect::<String>()
    };

    let _ = write!(
        out,
        r#"<section><h2>Compare two files</h2>
<form method="get" action="/compare/report.pdf">
<label>File 1 <select name="first">{first}</select></label>
<label>File 2 <select name="second">{second}</select></label>
<button type="submit">Download comparison PDF</button></form></section>"#,
        first = options(0),
        second = options(1),
    );
}
