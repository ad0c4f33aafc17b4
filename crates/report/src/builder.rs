//! Single-file and comparison PDF reports.

use chrono::NaiveDateTime;
use dfos_common::stats::difference;
use dfos_common::{Channel, ChannelSeries, DifferenceStats, XRange};
use renderer::{ChartLayout, Color, LineChart, Series};
use tracing::info;

use crate::error::{ReportError, ReportResult};
use crate::pdf::{Align, Font, Page, PdfDocument};
use crate::ReportFile;

const MARGIN: f64 = 36.0;
const CHART_WIDTH: f64 = 540.0;
const CHART_HEIGHT: f64 = 380.0;
const HALF_CHART_HEIGHT: f64 = 320.0;

const GRAY: Color = Color::new(0x7f, 0x7f, 0x7f);
const SUMMARY_FILL: Color = Color::new(0xfb, 0xf3, 0xe4);
const BOX_STROKE: Color = Color::new(0xbb, 0xbb, 0xbb);
const WHITE: Color = Color::new(0xff, 0xff, 0xff);
/// Difference line colors, by display position.
const DIFFERENCE_COLORS: [Color; 2] = [
    Color::new(0x27, 0xae, 0x60),
    Color::new(0xbf, 0x3f, 0xbf),
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Cover page, then one plot page per channel with summary statistics.
pub fn single_report(file: &ReportFile, generated_at: NaiveDateTime) -> ReportResult<Vec<u8>> {
    let mut doc = PdfDocument::new().with_title(format!("DFOS Monitoring Report - {}", file.name));

    let mut cover = cover_page("DFOS Monitoring Report", generated_at);
    cover.text(
        306.0,
        396.0,
        14.0,
        Font::Regular,
        Color::BLACK,
        Align::Center,
        &format!("File: {}", file.name),
    );
    draw_summary(&mut cover, file);
    doc.add_page(cover);

    for series in &file.series {
        doc.add_page(channel_page(file, series));
    }

    info!(file = %file.name, pages = doc.page_count(), "Built single-file report");
    doc.to_bytes()
}

/// Cover page, one overlay page per channel, and a difference page when both
/// files have the same number of distance points.
pub fn comparison_report(
    first: &ReportFile,
    second: &ReportFile,
    generated_at: NaiveDateTime,
) -> ReportResult<Vec<u8>> {
    if first.file_type != second.file_type {
        return Err(ReportError::Incompatible(format!(
            "'{}' is {} but '{}' is {}",
            first.name,
            first.file_type.description(),
            second.name,
            second.file_type.description()
        )));
    }

    let mut doc = PdfDocument::new().with_title(format!(
        "DFOS Comparison Report - {} vs {}",
        first.name, second.name
    ));

    let mut cover = cover_page("DFOS Comparison Report", generated_at);
    for (i, file) in [first, second].iter().enumerate() {
        cover.text(
            306.0,
            396.0 + i as f64 * 22.0,
            12.0,
            Font::Regular,
            Color::BLACK,
            Align::Center,
            &format!("File {}: {}", i + 1, file.name),
        );
    }
    doc.add_page(cover);

    let channels = first.file_type.display_channels();
    for channel in channels {
        let a = first.series(channel).ok_or(ReportError::MissingChannel(channel))?;
        let b = second.series(channel).ok_or(ReportError::MissingChannel(channel))?;
        doc.add_page(overlay_page(first, a, second, b));
    }

    let with_difference = first.distance_points == second.distance_points;
    if with_difference {
        let mut page = Page::letter();
        for (slot, channel) in channels.into_iter().enumerate() {
            let a = first.series(channel).ok_or(ReportError::MissingChannel(channel))?;
            let b = second.series(channel).ok_or(ReportError::MissingChannel(channel))?;
            let top = MARGIN + slot as f64 * (HALF_CHART_HEIGHT + 40.0);
            draw_difference(&mut page, top, a, b, DIFFERENCE_COLORS[slot]);
        }
        doc.add_page(page);
    }

    info!(
        first = %first.name,
        second = %second.name,
        pages = doc.page_count(),
        with_difference,
        "Built comparison report"
    );
    doc.to_bytes()
}

fn cover_page(title: &str, generated_at: NaiveDateTime) -> Page {
    let mut page = Page::letter();
    page.text(306.0, 238.0, 30.0, Font::Bold, Color::BLACK, Align::Center, title);
    page.text(
        306.0,
        317.0,
        18.0,
        Font::Regular,
        GRAY,
        Align::Center,
        "Distributed Fiber Optic Sensing",
    );
    page.text(
        306.0,
        450.0,
        11.0,
        Font::Regular,
        GRAY,
        Align::Center,
        &format!("Generated: {}", generated_at.format(TIMESTAMP_FORMAT)),
    );
    page
}

fn draw_summary(page: &mut Page, file: &ReportFile) {
    let shape = file
        .data_shape
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut lines = vec![
        "Analysis Summary:".to_string(),
        "-".repeat(40),
        format!("File Type: {}", file.file_type),
        format!("Distance Points: {}", file.distance_points),
        format!("Time Samples: {}", file.time_samples),
        format!("Data Shape: ({})", shape),
        String::new(),
    ];
    for series in &file.series {
        if let Some(stats) = series.stats() {
            lines.push(format!(
                "{} Range: {:.2} - {:.2} {}",
                series.channel.label(),
                stats.min,
                stats.max,
                series.channel.unit()
            ));
        }
    }

    let line_height = 13.0;
    let width = 340.0;
    let height = lines.len() as f64 * line_height + 16.0;
    let top = 520.0;
    let left = 306.0 - width / 2.0;
    page.rect(left, top, width, height, Some(SUMMARY_FILL), Some(BOX_STROKE));
    for (i, line) in lines.iter().enumerate() {
        page.text(
            left + 12.0,
            top + 18.0 + i as f64 * line_height,
            10.0,
            Font::Mono,
            Color::BLACK,
            Align::Left,
            line,
        );
    }
}

fn channel_page(file: &ReportFile, series: &ChannelSeries) -> Page {
    let channel = series.channel;
    let mut page = Page::letter();
    page.text(
        MARGIN,
        MARGIN + 12.0,
        10.0,
        Font::Regular,
        GRAY,
        Align::Left,
        &format!(
            "File: {}    Range: {}    Offset: {:+.2} {}",
            file.name,
            range_text(&series.range),
            series.offset,
            channel.unit()
        ),
    );

    let chart = LineChart::new(
        format!("{} (First Sweep)", channel.title()),
        "Distance Index",
        channel.axis_label(),
    )
    .with_series(Series::new(
        series.x_values(),
        series.values.clone(),
        channel_color(channel),
    ));

    let origin = (MARGIN, MARGIN + 30.0);
    let layout = chart.layout(CHART_WIDTH, CHART_HEIGHT);
    draw_chart(&mut page, &layout, origin);

    if let Some(stats) = series.stats() {
        let lines = stats.lines(channel.unit());
        draw_stats_box(&mut page, &layout, origin, &lines);
    }
    page
}

fn overlay_page(
    first: &ReportFile,
    a: &ChannelSeries,
    second: &ReportFile,
    b: &ChannelSeries,
) -> Page {
    let channel = a.channel;
    let chart = LineChart::new(
        format!("{} Comparison", channel.label()),
        "Distance Index",
        channel.axis_label(),
    )
    .with_series(
        Series::new(a.x_values(), a.values.clone(), channel_color(channel))
            .labelled(format!("File 1: {}", first.name)),
    )
    .with_series(
        Series::new(
            b.x_values(),
            b.values.clone(),
            Color::from_hex(channel.comparison_color()).unwrap_or_default(),
        )
        .labelled(format!("File 2: {}", second.name))
        .dashed(),
    );

    let mut page = Page::letter();
    let layout = chart.layout(CHART_WIDTH, CHART_HEIGHT);
    draw_chart(&mut page, &layout, (MARGIN, MARGIN + 30.0));
    page
}

fn draw_difference(page: &mut Page, top: f64, a: &ChannelSeries, b: &ChannelSeries, color: Color) {
    let channel = a.channel;
    let title = format!("{} Difference (File 2 - File 1)", channel.label());

    let overlap = a.range.intersect(&b.range);
    let diff = overlap.and_then(|range| {
        let a_values = slice_range(a, &range);
        let b_values = slice_range(b, &range);
        difference(a_values, b_values).map(|values| (range, values))
    });

    let Some((range, values)) = diff else {
        page.text(MARGIN, top + 20.0, 14.0, Font::Bold, Color::BLACK, Align::Left, &title);
        page.text(
            MARGIN,
            top + 40.0,
            11.0,
            Font::Regular,
            GRAY,
            Align::Left,
            "The selected distance ranges do not overlap.",
        );
        return;
    };

    let chart = LineChart::new(
        title,
        "Distance Index",
        format!("{} Difference ({})", channel.label(), channel.unit()),
    )
    .with_series(Series::new(
        range.indices().map(|i| i as f64).collect(),
        values.clone(),
        color,
    ))
    .with_zero_line();

    let origin = (MARGIN, top);
    let layout = chart.layout(CHART_WIDTH, HALF_CHART_HEIGHT);
    draw_chart(page, &layout, origin);

    if let Some(stats) = DifferenceStats::compute(&values) {
        let unit = channel.unit();
        let lines = [
            format!("Max: {:.2} {}", stats.max_abs, unit),
            format!("Mean: {:.2} {}", stats.mean, unit),
        ];
        draw_stats_box(page, &layout, origin, &lines);
    }
}

/// Draw a chart layout with its top-left corner at `origin`.
fn draw_chart(page: &mut Page, layout: &ChartLayout, origin: (f64, f64)) {
    let (ox, oy) = origin;
    let at = |x: f64, y: f64| (ox + x, oy + y);
    let plot = layout.plot;

    for tick in &layout.x_ticks {
        page.line(
            at(tick.position, plot.y),
            at(tick.position, plot.bottom()),
            Color::GRID,
            0.5,
            false,
        );
        let (x, y) = at(tick.position, plot.bottom() + 14.0);
        page.text(x, y, 9.0, Font::Regular, Color::AXIS, Align::Center, &tick.label);
    }
    for tick in &layout.y_ticks {
        page.line(
            at(plot.x, tick.position),
            at(plot.right(), tick.position),
            Color::GRID,
            0.5,
            false,
        );
        let (x, y) = at(plot.x - 5.0, tick.position + 3.0);
        page.text(x, y, 9.0, Font::Regular, Color::AXIS, Align::Right, &tick.label);
    }

    if let Some(zero) = layout.zero_line {
        page.line(at(plot.x, zero), at(plot.right(), zero), Color::ZERO_LINE, 0.75, true);
    }

    for line in &layout.lines {
        let points: Vec<(f64, f64)> = line.points.iter().map(|&(x, y)| at(x, y)).collect();
        page.polyline(&points, line.color, 1.5, line.dashed);
    }

    let (x, y) = at(plot.x, plot.y);
    page.rect(x, y, plot.width, plot.height, None, Some(Color::AXIS));

    for (i, entry) in layout.legend.iter().enumerate() {
        let (x, y) = at(plot.right() - 170.0, plot.y + 14.0 + i as f64 * 14.0);
        page.line((x, y - 3.0), (x + 20.0, y - 3.0), entry.color, 1.5, entry.dashed);
        page.text(x + 26.0, y, 9.0, Font::Regular, Color::BLACK, Align::Left, &entry.label);
    }

    let (x, y) = at(plot.center_x(), plot.y - 12.0);
    page.text(x, y, 13.0, Font::Bold, Color::BLACK, Align::Center, &layout.title);
    let (x, y) = at(plot.center_x(), layout.height - 10.0);
    page.text(x, y, 10.0, Font::Regular, Color::BLACK, Align::Center, &layout.x_label);
    let (x, y) = at(16.0, plot.center_y());
    page.text_vertical(x, y, 10.0, Font::Regular, Color::BLACK, &layout.y_label);
}

/// Boxed text lines in the top-left corner of the plot area.
fn draw_stats_box<S: AsRef<str>>(
    page: &mut Page,
    layout: &ChartLayout,
    origin: (f64, f64),
    lines: &[S],
) {
    let x = origin.0 + layout.plot.x + 8.0;
    let y = origin.1 + layout.plot.y + 8.0;
    let width = lines
        .iter()
        .map(|l| Font::Regular.text_width(l.as_ref(), 9.0))
        .fold(0.0, f64::max)
        + 12.0;
    let height = lines.len() as f64 * 12.0 + 8.0;
    page.rect(x, y, width, height, Some(WHITE), Some(BOX_STROKE));
    for (i, line) in lines.iter().enumerate() {
        page.text(
            x + 6.0,
            y + 14.0 + i as f64 * 12.0,
            9.0,
            Font::Regular,
            Color::BLACK,
            Align::Left,
            line.as_ref(),
        );
    }
}

fn slice_range<'a>(series: &'a ChannelSeries, range: &XRange) -> &'a [f64] {
    let start = range.min - series.range.min;
    let end = range.max - series.range.min;
    &series.values[start..=end]
}

fn range_text(range: &XRange) -> String {
    format!("{} - {}", range.min, range.max)
}

fn channel_color(channel: Channel) -> Color {
    Color::from_hex(channel.color()).unwrap_or_default()
}
