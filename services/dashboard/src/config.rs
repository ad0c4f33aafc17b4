//! Dashboard configuration from the environment.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Default per-file upload limit: 512 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Largest accepted upload, per file.
    pub max_upload_bytes: usize,
    /// Processing history entries kept, newest first.
    pub history_limit: usize,
    /// Where uploads are staged for the HDF5 library. `None` picks
    /// `/dev/shm` when writable, else the system temp directory.
    pub temp_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            history_limit: DEFAULT_HISTORY_LIMIT,
            temp_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Read `DFOS_MAX_UPLOAD_BYTES`, `DFOS_HISTORY_LIMIT` and `DFOS_TEMP_DIR`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let max_upload_bytes = match lookup("DFOS_MAX_UPLOAD_BYTES") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("DFOS_MAX_UPLOAD_BYTES is not a byte count: {}", value))?,
            None => defaults.max_upload_bytes,
        };

        let history_limit = match lookup("DFOS_HISTORY_LIMIT") {
            Some(value) => value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("DFOS_HISTORY_LIMIT is not a count: {}", value))?,
            None => defaults.history_limit,
        };

        let temp_dir = lookup("DFOS_TEMP_DIR")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            max_upload_bytes,
            history_limit,
            temp_dir,
        })
    }

    /// Request body limit for multipart uploads, leaving room for several
    /// files plus form overhead.
    pub fn request_body_limit(&self) -> usize {
        self.max_upload_bytes.saturating_mul(4).saturating_add(1024 * 1024)
    }
}
