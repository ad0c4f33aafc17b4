//! Line chart rendering for distributed fibre measurements.
//!
//! Charts are described once as a [`LineChart`] and laid out into
//! output coordinates. The dashboard draws the layout as SVG; the report
//! crate draws the same layout into PDF pages.

pub mod chart;
pub mod color;
pub mod svg;
pub mod ticks;

pub use chart::{ChartLayout, LegendEntry, LineChart, PlacedLine, Rect, Series, Tick};
pub use color::Color;
pub use svg::{layout_to_svg, render_svg};
