//! Line chart model and layout.
//!
//! A [`LineChart`] describes what to draw in data coordinates. [`layout`]
//! turns it into a [`ChartLayout`] in output units with the origin at the
//! top-left corner; the SVG and PDF backends only draw what the layout says.
//!
//! [`layout`]: LineChart::layout

use serde::Serialize;

use crate::color::Color;
use crate::ticks::{format_tick, integer_ticks, nice_ticks};

/// Space reserved around the plot area.
const MARGIN_LEFT: f64 = 72.0;
const MARGIN_RIGHT: f64 = 24.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 52.0;

/// Fraction of the value span added above and below the data.
const Y_PADDING: f64 = 0.05;

const TARGET_X_TICKS: usize = 8;
const TARGET_Y_TICKS: usize = 6;

/// One plotted line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub color: Color,
    pub dashed: bool,
    /// Legend text. Unlabelled series get no legend entry.
    pub label: Option<String>,
}

impl Series {
    pub fn new(x: Vec<f64>, y: Vec<f64>, color: Color) -> Self {
        Self {
            x,
            y,
            color,
            dashed: false,
            label: None,
        }
    }

    pub fn dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Finite `(x, y)` pairs.
    fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(&x, &y)| (x, y))
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    }
}

/// A titled XY line chart. The x axis is a distance index.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LineChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub series: Vec<Series>,
    /// Draw a horizontal reference line at `y = 0` when it is in view.
    pub zero_line: bool,
}

impl LineChart {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            series: Vec::new(),
            zero_line: false,
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_zero_line(mut self) -> Self {
        self.zero_line = true;
        self
    }

    /// Data bounds over all finite points, `((x_min, x_max), (y_min, y_max))`.
    pub fn data_bounds(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut points = self.series.iter().flat_map(|s| s.points()).peekable();
        let (x0, y0) = *points.peek()?;
        let mut bounds = ((x0, x0), (y0, y0));
        for (x, y) in points {
            bounds.0 .0 = bounds.0 .0.min(x);
            bounds.0 .1 = bounds.0 .1.max(x);
            bounds.1 .0 = bounds.1 .0.min(y);
            bounds.1 .1 = bounds.1 .1.max(y);
        }
        Some(bounds)
    }

    /// Place every element for a `width` x `height` canvas.
    pub fn layout(&self, width: f64, height: f64) -> ChartLayout {
        let plot = Rect {
            x: MARGIN_LEFT,
            y: MARGIN_TOP,
            width: (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0),
            height: (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0),
        };

        let ((x_min, x_max), (y_min, y_max)) =
            self.data_bounds().unwrap_or(((0.0, 1.0), (0.0, 1.0)));
        let x_domain = widen(x_min, x_max, 0.0);
        let y_domain = widen(y_min, y_max, Y_PADDING);

        let scale = Scale {
            plot,
            x_domain,
            y_domain,
        };

        let (x_values, x_step) = integer_ticks(x_domain.0, x_domain.1, TARGET_X_TICKS);
        let x_ticks = x_values
            .into_iter()
            .map(|value| Tick {
                value,
                position: scale.x(value),
                label: format_tick(value, x_step),
            })
            .collect();

        let (y_values, y_step) = nice_ticks(y_domain.0, y_domain.1, TARGET_Y_TICKS);
        let y_ticks = y_values
            .into_iter()
            .map(|value| Tick {
                value,
                position: scale.y(value),
                label: format_tick(value, y_step),
            })
            .collect();

        let lines = self
            .series
            .iter()
            .map(|series| PlacedLine {
                points: series.points().map(|(x, y)| (scale.x(x), scale.y(y))).collect(),
                color: series.color,
                dashed: series.dashed,
            })
            .collect();

        let legend = self
            .series
            .iter()
            .filter_map(|series| {
                series.label.as_ref().map(|label| LegendEntry {
                    label: label.clone(),
                    color: series.color,
                    dashed: series.dashed,
                })
            })
            .collect();

        let zero_line = (self.zero_line && y_domain.0 <= 0.0 && y_domain.1 >= 0.0)
            .then(|| scale.y(0.0));

        ChartLayout {
            width,
            height,
            plot,
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
            x_ticks,
            y_ticks,
            lines,
            legend,
            zero_line,
        }
    }
}

/// Axis-aligned rectangle, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }
}

/// Axis tick at `position` (x for the x axis, y for the y axis).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLine {
    pub points: Vec<(f64, f64)>,
    pub color: Color,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
    pub dashed: bool,
}

/// A chart resolved to output coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub plot: Rect,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_ticks: Vec<Tick>,
    pub y_ticks: Vec<Tick>,
    pub lines: Vec<PlacedLine>,
    pub legend: Vec<LegendEntry>,
    /// Vertical position of the zero reference line.
    pub zero_line: Option<f64>,
}

struct Scale {
    plot: Rect,
    x_domain: (f64, f64),
    y_domain: (f64, f64),
}

impl Scale {
    fn x(&self, value: f64) -> f64 {
        let (lo, hi) = self.x_domain;
        self.plot.x + (value - lo) / (hi - lo) * self.plot.width
    }

    fn y(&self, value: f64) -> f64 {
        let (lo, hi) = self.y_domain;
        self.plot.bottom() - (value - lo) / (hi - lo) * self.plot.height
    }
}

/// Pad a domain by `fraction` of its span; degenerate domains get ±1.
fn widen(min: f64, max: f64, fraction: f64) -> (f64, f64) {
    let span = max - min;
    if span <= 0.0 || !span.is_finite() {
        let pad = if min.abs() > 1.0 { min.abs() * 0.05 } else { 1.0 };
        return (min - pad, max + pad);
    }
    (min - span * fraction, max + span * fraction)
}
