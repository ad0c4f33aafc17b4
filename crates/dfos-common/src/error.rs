//! Error types for DFOS monitor services.

use thiserror::Error;

/// Result type alias using DfosError.
pub type DfosResult<T> = Result<T, DfosError>;

/// Primary error type for presentation-side operations.
#[derive(Debug, Error)]
pub enum DfosError {
    // === Request Errors ===
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    #[error("Unsupported upload '{0}': expected a .h5 or .bts file")]
    UnsupportedUpload(String),

    #[error("Upload '{name}' is {size} bytes, limit is {limit} bytes")]
    UploadTooLarge { name: String, size: usize, limit: usize },

    // === Session Errors ===
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File '{name}' could not be processed: {message}")]
    NotProcessed { name: String, message: String },

    #[error("Channel {channel} is not available in '{name}'")]
    ChannelUnavailable { name: String, channel: String },

    #[error("Files cannot be compared: {0}")]
    IncompatibleFiles(String),

    // === Export Errors ===
    #[error("Export failed: {0}")]
    ExportError(String),

    // === Infrastructure Errors ===
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl DfosError {
    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            DfosError::MissingParameter(_)
            | DfosError::InvalidParameter { .. }
            | DfosError::UnsupportedUpload(_) => 400,

            DfosError::UploadTooLarge { .. } => 413,

            DfosError::FileNotFound(_) | DfosError::ChannelUnavailable { .. } => 404,

            DfosError::NotProcessed { .. } | DfosError::IncompatibleFiles(_) => 409,

            _ => 500,
        }
    }

    /// Shorthand for an invalid parameter error.
    pub fn invalid(param: &str, message: impl Into<String>) -> Self {
        DfosError::InvalidParameter {
            param: param.to_string(),
            message: message.into(),
        }
    }
}

// Conversion from common error types
impl From<std::io::Error> for DfosError {
    fn from(err: std::io::Error) -> Self {
        DfosError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for DfosError {
    fn from(err: serde_json::Error) -> Self {
        DfosError::InternalError(format!("JSON error: {}", err))
    }
}
