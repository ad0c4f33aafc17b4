//! Error types for exports.

use dfos_common::{Channel, DfosError};
use thiserror::Error;

pub type ReportResult<T> = Result<T, ReportError>;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The extraction has no data for a channel the report needs.
    #[error("Channel {0} is not present in the extraction")]
    MissingChannel(Channel),

    /// Comparison of files with different dataset pairs.
    #[error("Files cannot be compared: {0}")]
    Incompatible(String),

    #[error(transparent)]
    View(#[from] DfosError),
}

impl From<ReportError> for DfosError {
    fn from(err: ReportError) -> Self {
        match err {
            ReportError::View(inner) => inner,
            ReportError::Incompatible(message) => DfosError::IncompatibleFiles(message),
            other => DfosError::ExportError(other.to_string()),
        }
    }
}
