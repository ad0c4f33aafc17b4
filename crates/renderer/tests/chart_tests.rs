//! Tests for chart layout and SVG output.

use renderer::ticks::MAX_LEVELS;
use renderer::{render_svg, Color, LineChart, Series};
use test_utils::assert_approx_eq;

fn temperature_chart() -> LineChart {
    LineChart::new("Temperature Distribution", "Distance Index", "Temperature (°C)").with_series(
        Series::new(
            vec![2.0, 3.0, 4.0, 5.0, 6.0],
            vec![17.0, 18.0, 19.0, 20.0, 21.0],
            Color::new(0xe7, 0x4c, 0x3c),
        ),
    )
}

// ============================================================================
// Layout tests
// ============================================================================

#[test]
fn test_points_span_the_plot_horizontally() {
    let layout = temperature_chart().layout(600.0, 400.0);
    let line = &layout.lines[0];

    assert_eq!(line.points.len(), 5);
    assert_approx_eq!(line.points[0].0, layout.plot.x, 1e-9);
    assert_approx_eq!(line.points[4].0, layout.plot.right(), 1e-9);
}

#[test]
fn test_higher_values_are_drawn_higher() {
    let layout = temperature_chart().layout(600.0, 400.0);
    let points = &layout.lines[0].points;
    for pair in points.windows(2) {
        assert!(pair[1].1 < pair[0].1, "y must decrease as values increase");
    }
    for (_, y) in points {
        assert!(*y >= layout.plot.y && *y <= layout.plot.bottom());
    }
}

#[test]
fn test_ticks_fall_inside_plot() {
    let layout = temperature_chart().layout(600.0, 400.0);
    assert!(!layout.x_ticks.is_empty());
    assert!(!layout.y_ticks.is_empty());
    for tick in &layout.x_ticks {
        assert!(tick.value >= 2.0 && tick.value <= 6.0);
        assert!(tick.position >= layout.plot.x - 1e-9);
        assert!(tick.position <= layout.plot.right() + 1e-9);
    }
    let labels: Vec<&str> = layout.x_ticks.iter().map(|t| t.label.as_str()).collect();
    assert!(labels.contains(&"2") && labels.contains(&"6"));
}

#[test]
fn test_non_finite_values_are_skipped() {
    let chart = LineChart::new("t", "x", "y").with_series(Series::new(
        vec![0.0, 1.0, 2.0],
        vec![1.0, f64::NAN, 3.0],
        Color::BLACK,
    ));
    let layout = chart.layout(300.0, 200.0);
    assert_eq!(layout.lines[0].points.len(), 2);
}

#[test]
fn test_constant_series_gets_a_visible_range() {
    let chart = LineChart::new("t", "x", "y").with_series(Series::new(
        vec![0.0, 1.0],
        vec![5.0, 5.0],
        Color::BLACK,
    ));
    let layout = chart.layout(300.0, 200.0);
    let y = layout.lines[0].points[0].1;
    assert_approx_eq!(y, layout.plot.center_y(), 1e-9);
}

#[test]
fn test_zero_line_only_when_in_view() {
    let crossing = LineChart::new("diff", "x", "d")
        .with_series(Series::new(vec![0.0, 1.0], vec![-1.0, 1.0], Color::BLACK))
        .with_zero_line();
    assert!(crossing.layout(300.0, 200.0).zero_line.is_some());

    let positive = LineChart::new("diff", "x", "d")
        .with_series(Series::new(vec![0.0, 1.0], vec![10.0, 11.0], Color::BLACK))
        .with_zero_line();
    assert!(positive.layout(300.0, 200.0).zero_line.is_none());
}

#[test]
fn test_legend_lists_labelled_series() {
    let chart = LineChart::new("Temperature Comparison", "Distance Index", "Temperature (°C)")
        .with_series(
            Series::new(vec![0.0, 1.0], vec![1.0, 2.0], Color::BLACK).labelled("File 1: a.h5"),
        )
        .with_series(
            Series::new(vec![0.0, 1.0], vec![2.0, 3.0], Color::BLACK)
                .labelled("File 2: b.h5")
                .dashed(),
        )
        .with_series(Series::new(vec![0.0], vec![0.0], Color::BLACK));
    let layout = chart.layout(600.0, 400.0);

    assert_eq!(layout.legend.len(), 2);
    assert!(layout.legend[1].dashed);
    assert_eq!(layout.legend[0].label, "File 1: a.h5");
}

#[test]
fn test_empty_chart_still_lays_out() {
    let layout = LineChart::new("Empty", "x", "y").layout(300.0, 200.0);
    assert!(layout.lines.is_empty());
    assert!(!layout.x_ticks.is_empty());
}

#[test]
fn test_layout_with_overflowing_value_span() {
    let chart = LineChart::new("Extreme", "x", "y").with_series(Series::new(
        vec![0.0, 1.0],
        vec![-1e308, 1e308],
        Color::BLACK,
    ));
    let layout = chart.layout(600.0, 400.0);
    assert!(layout.y_ticks.len() <= MAX_LEVELS);
    assert_eq!(layout.lines[0].points.len(), 2);
}

#[test]
fn test_layout_with_huge_offsets() {
    for offset in [1e15, 5e16, 1e17, 1e300] {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y: Vec<f64> = (0..10).map(|i| f64::from(i * 3) + offset).collect();
        let layout = LineChart::new("Offset", "x", "y")
            .with_series(Series::new(x, y, Color::BLACK))
            .layout(600.0, 400.0);
        assert!(layout.y_ticks.len() <= MAX_LEVELS, "offset {}", offset);
        assert!(!layout.x_ticks.is_empty());
    }
}

// ============================================================================
// SVG tests
// ============================================================================

#[test]
fn test_svg_document() {
    let svg = render_svg(&temperature_chart(), 600.0, 400.0);
    assert!(svg.starts_with("<svg"));
    assert!(svg.trim_end().ends_with("</svg>"));
    assert!(svg.contains(r##"<rect x="0" y="0" width="600" height="400" fill="#ffffff"/>"##));
    assert!(svg.contains("<polyline"));
    assert!(svg.contains("#e74c3c"));
    assert!(svg.contains("Temperature Distribution"));
    assert!(svg.contains("Temperature (°C)"));
}

#[test]
fn test_svg_dashed_series() {
    let chart = LineChart::new("t", "x", "y").with_series(
        Series::new(vec![0.0, 1.0], vec![0.0, 1.0], Color::BLACK).dashed(),
    );
    assert!(render_svg(&chart, 300.0, 200.0).contains("stroke-dasharray=\"6 4\""));
}

#[test]
fn test_svg_escapes_labels() {
    let chart = LineChart::new("a <b> & c", "x", "y");
    let svg = render_svg(&chart, 300.0, 200.0);
    assert!(svg.contains("a &lt;b&gt; &amp; c"));
}
