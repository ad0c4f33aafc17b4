//! Error types for BTS container extraction.

use thiserror::Error;

use crate::schema::DatasetPresence;

/// Result type for BTS parser operations.
pub type BtsResult<T> = Result<T, BtsError>;

/// Everything that can go wrong turning a container into an [`Extraction`].
///
/// Payloads are plain strings so results can be cloned, compared and kept in
/// a session after the container is gone.
///
/// [`Extraction`]: crate::Extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BtsError {
    /// Bytes are not a readable HDF5 container, or a dataset could not be read.
    #[error("Invalid file format: {0}")]
    Format(String),

    /// The acquisition time dataset is absent.
    #[error("Missing mandatory data: {0}")]
    MissingMandatoryData(String),

    /// Neither dataset pair is fully present.
    #[error("Unsupported file structure. Found: {0}")]
    UnsupportedStructure(DatasetPresence),

    /// The second array of the pair disagrees on the distance dimension.
    #[error("Inconsistent shape: {0}")]
    InconsistentShape(String),

    /// An array has no frames or is not two-dimensional.
    #[error("Empty data: {0}")]
    EmptyData(String),
}

impl BtsError {
    /// Stable machine-readable tag.
    pub fn kind(&self) -> &'static str {
        match self {
            BtsError::Format(_) => "format_error",
            BtsError::MissingMandatoryData(_) => "missing_mandatory_data",
            BtsError::UnsupportedStructure(_) => "unsupported_structure",
            BtsError::InconsistentShape(_) => "inconsistent_shape",
            BtsError::EmptyData(_) => "empty_data",
        }
    }
}
