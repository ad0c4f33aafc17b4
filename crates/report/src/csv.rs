//! CSV export of a transformed file view.

use dfos_common::XRange;
use tracing::debug;

use crate::error::{ReportError, ReportResult};
use crate::ReportFile;

pub const DISTANCE_COLUMN: &str = "Distance_Index";

/// Write `Distance_Index` plus one column per display channel.
///
/// Rows cover the indices every channel's range includes. Values carry the
/// channel offsets.
pub fn write_csv(file: &ReportFile) -> ReportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![DISTANCE_COLUMN];
    header.extend(file.series.iter().map(|s| s.channel.csv_header()));
    writer.write_record(&header)?;

    let rows = common_range(file);
    if let Some(range) = rows {
        for index in range.indices() {
            let mut record = vec![index.to_string()];
            for series in &file.series {
                let value = series.value_at(index).unwrap_or(f64::NAN);
                record.push(value.to_string());
            }
            writer.write_record(&record)?;
        }
    }

    debug!(
        file = %file.name,
        rows = rows.map(|r| r.len()).unwrap_or(0),
        "Wrote CSV export"
    );

    writer.into_inner().map_err(|e| {
        ReportError::Io(std::io::Error::new(e.error().kind(), e.error().to_string()))
    })
}

fn common_range(file: &ReportFile) -> Option<XRange> {
    let mut ranges = file.series.iter().map(|s| s.range);
    let first = ranges.next()?;
    ranges.try_fold(first, |acc, range| acc.intersect(&range))
}
