//! Exports of extracted DFOS measurements.
//!
//! - [`csv`]: one row per distance index of the active view
//! - [`pdf`]: a small PDF 1.4 writer
//! - [`builder`]: single-file and comparison reports built on [`pdf`]
//!
//! Every export starts from a [`ReportFile`], which holds the transformed
//! channel series so offsets and ranges match what the dashboard shows.

pub mod builder;
pub mod csv;
pub mod error;
pub mod pdf;

use bts_parser::Extraction;
use chrono::NaiveDateTime;
use dfos_common::{Channel, ChannelControls, ChannelSeries, SchemaVariant};

pub use crate::builder::{comparison_report, single_report};
pub use crate::csv::write_csv;
pub use error::{ReportError, ReportResult};

/// One processed file prepared for export.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFile {
    pub name: String,
    pub file_type: SchemaVariant,
    pub distance_points: usize,
    pub time_samples: usize,
    /// Native shape of the dataset that defines the distance axis.
    pub data_shape: Vec<usize>,
    /// Transformed series in display order.
    pub series: Vec<ChannelSeries>,
}

impl ReportFile {
    /// Apply each channel's controls to the extraction's first frames.
    pub fn new<F>(name: impl Into<String>, extraction: &Extraction, controls: F) -> ReportResult<Self>
    where
        F: Fn(Channel) -> ChannelControls,
    {
        let series = extraction
            .display_channels()
            .into_iter()
            .map(|channel| {
                let first_frame = extraction
                    .first_frame(channel)
                    .ok_or(ReportError::MissingChannel(channel))?;
                Ok(ChannelSeries::from_first_frame(
                    channel,
                    first_frame,
                    &controls(channel),
                )?)
            })
            .collect::<ReportResult<Vec<_>>>()?;

        Ok(Self {
            name: name.into(),
            file_type: extraction.file_type,
            distance_points: extraction.distance_points,
            time_samples: extraction.time.len(),
            data_shape: extraction.channels[0].full.shape().to_vec(),
            series,
        })
    }

    pub fn series(&self, channel: Channel) -> Option<&ChannelSeries> {
        self.series.iter().find(|s| s.channel == channel)
    }
}

/// Download name such as `DFOS_Report_20240131_081500.pdf`.
pub fn export_file_name(prefix: &str, extension: &str, at: NaiveDateTime) -> String {
    format!("{}_{}.{}", prefix, at.format("%Y%m%d_%H%M%S"), extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_export_file_name() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        assert_eq!(
            export_file_name("DFOS_Report", "pdf", at),
            "DFOS_Report_20240131_081500.pdf"
        );
    }
}
