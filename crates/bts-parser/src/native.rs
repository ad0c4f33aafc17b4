//! HDF5 backend.
//!
//! The HDF5 library needs a file path, so uploaded bytes are staged to a
//! temporary file first. On Linux the file goes to `/dev/shm` when it is
//! writable, which keeps staging off the disk.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Once;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::container::{Container, ContainerOpener};
use crate::error::{BtsError, BtsResult};

/// Silence HDF5's automatic error printing to stderr.
///
/// Looking up optional datasets makes the C library print a diagnostic stack
/// for every miss even though the error is handled. Safe to call repeatedly.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: null handler and client data disable automatic printing,
        // which is a documented use of H5Eset_auto2.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Opens uploaded bytes as an HDF5 file.
#[derive(Debug, Clone, Default)]
pub struct Hdf5Opener {
    temp_dir: Option<PathBuf>,
}

impl Hdf5Opener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage uploads in `dir` instead of the automatically chosen directory.
    pub fn with_temp_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            temp_dir: Some(dir.into()),
        }
    }
}

impl ContainerOpener for Hdf5Opener {
    fn open(&self, data: &[u8]) -> BtsResult<Box<dyn Container>> {
        silence_hdf5_errors();

        let dir = self.temp_dir.clone().unwrap_or_else(get_optimal_temp_dir);
        let mut spill = tempfile::Builder::new()
            .prefix("bts_upload_")
            .suffix(".h5")
            .tempfile_in(&dir)
            .map_err(|e| BtsError::Format(format!("cannot stage upload in {:?}: {}", dir, e)))?;
        spill
            .write_all(data)
            .and_then(|_| spill.flush())
            .map_err(|e| BtsError::Format(format!("cannot stage upload: {}", e)))?;

        debug!(path = ?spill.path(), bytes = data.len(), "Staged upload for HDF5");

        let file = hdf5::File::open(spill.path())
            .map_err(|e| BtsError::Format(format!("not a readable HDF5 file: {}", e)))?;

        Ok(Box::new(Hdf5Container { file, _spill: spill }))
    }
}

/// An open HDF5 file plus the staged bytes backing it.
///
/// Field order matters: the file handle closes before the staging file is
/// removed.
pub struct Hdf5Container {
    file: hdf5::File,
    _spill: NamedTempFile,
}

impl Hdf5Container {
    fn dataset(&self, path: &str) -> BtsResult<hdf5::Dataset> {
        self.file
            .dataset(path)
            .map_err(|e| BtsError::Format(format!("{}: {}", path, e)))
    }
}

impl Container for Hdf5Container {
    fn has_path(&self, path: &str) -> bool {
        // link_exists only checks the final component, so walk every prefix.
        let mut current = String::new();
        for part in path.trim_matches('/').split('/') {
            if part.is_empty() {
                return false;
            }
            if !current.is_empty() {
                current.push('/');
            }
            current.push_str(part);
            if !self.file.link_exists(&current) {
                return false;
            }
        }
        !current.is_empty()
    }

    fn shape(&self, path: &str) -> BtsResult<Vec<usize>> {
        Ok(self.dataset(path)?.shape())
    }

    fn read_values(&self, path: &str) -> BtsResult<Vec<f64>> {
        self.dataset(path)?
            .read_raw::<f64>()
            .map_err(|e| BtsError::Format(format!("{}: {}", path, e)))
    }
}

/// Get the best directory for staging uploads.
///
/// Prefers `/dev/shm` on Linux when it is writable, otherwise the system temp
/// directory.
fn get_optimal_temp_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        use std::path::Path;
        let shm_path = Path::new("/dev/shm");
        if shm_path.is_dir() {
            let marker = shm_path.join(format!(".bts_write_check_{}", std::process::id()));
            if std::fs::write(&marker, b"ok").is_ok() {
                let _ = std::fs::remove_file(&marker);
                return shm_path.to_path_buf();
            }
        }
    }

    std::env::temp_dir()
}
