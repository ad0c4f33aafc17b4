//! Hierarchical container access.
//!
//! Extraction only needs three things from a container: whether a path
//! exists, the shape of a dataset, and its values as `f64`. The [`Container`]
//! trait captures exactly that so the HDF5 backend and in-memory fixtures are
//! interchangeable.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{BtsError, BtsResult};
use crate::native::Hdf5Opener;

/// Group holding every acquisition dataset.
pub const ACQUISITION_PREFIX: &str = "Acquisition/Custom/Brillouin[0]/";

/// Name of the mandatory per-frame time dataset.
pub const TIME_DATASET: &str = "BrillouinDataTime";

/// Accepted upload extensions, compared case-insensitively.
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["h5", "bts"];

/// Full path of a dataset under the acquisition group.
pub fn dataset_path(name: &str) -> String {
    format!("{}{}", ACQUISITION_PREFIX, name)
}

/// Whether a file name carries one of [`SUPPORTED_EXTENSIONS`].
pub fn is_supported_file_name(name: &str) -> bool {
    name.rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty()
                && SUPPORTED_EXTENSIONS
                    .iter()
                    .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}

/// Read access to a hierarchical numeric container.
pub trait Container {
    /// True when every component of `path` exists.
    fn has_path(&self, path: &str) -> bool;

    /// Native shape of the dataset at `path`.
    fn shape(&self, path: &str) -> BtsResult<Vec<usize>>;

    /// All values of the dataset at `path`, row-major, converted to `f64`.
    fn read_values(&self, path: &str) -> BtsResult<Vec<f64>>;
}

/// Opens a container from raw uploaded bytes.
pub trait ContainerOpener: Send + Sync {
    fn open(&self, data: &[u8]) -> BtsResult<Box<dyn Container>>;
}

/// The production opener: HDF5 via the native library.
///
/// `temp_dir` overrides where uploaded bytes are staged before HDF5 opens them.
pub fn default_opener(temp_dir: Option<PathBuf>) -> Box<dyn ContainerOpener> {
    match temp_dir {
        Some(dir) => Box::new(Hdf5Opener::with_temp_dir(dir)),
        None => Box::new(Hdf5Opener::new()),
    }
}

/// One dataset of a [`MemoryContainer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDataset {
    pub shape: Vec<usize>,
    pub values: Vec<f64>,
}

/// A container held entirely in memory, keyed by full dataset path.
///
/// Groups are implied by the dataset paths. Serializes to JSON, which makes
/// it convenient as a test fixture format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryContainer {
    datasets: BTreeMap<String, MemoryDataset>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a dataset. The value count must match the shape.
    pub fn insert(
        &mut self,
        path: impl Into<String>,
        shape: Vec<usize>,
        values: Vec<f64>,
    ) -> BtsResult<()> {
        let path = normalize(&path.into()).to_string();
        let expected: usize = shape.iter().product();
        if expected != values.len() {
            return Err(BtsError::Format(format!(
                "{}: shape {:?} needs {} values, got {}",
                path,
                shape,
                expected,
                values.len()
            )));
        }
        self.datasets.insert(path, MemoryDataset { shape, values });
        Ok(())
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with_dataset(
        mut self,
        path: impl Into<String>,
        shape: Vec<usize>,
        values: Vec<f64>,
    ) -> BtsResult<Self> {
        self.insert(path, shape, values)?;
        Ok(self)
    }

    pub fn remove(&mut self, path: &str) -> Option<MemoryDataset> {
        self.datasets.remove(normalize(path))
    }

    pub fn dataset_paths(&self) -> impl Iterator<Item = &str> {
        self.datasets.keys().map(String::as_str)
    }

    pub fn from_json(data: &[u8]) -> BtsResult<Self> {
        let container: MemoryContainer = serde_json::from_slice(data)
            .map_err(|e| BtsError::Format(format!("not a container document: {}", e)))?;
        for (path, dataset) in &container.datasets {
            let expected: usize = dataset.shape.iter().product();
            if expected != dataset.values.len() {
                return Err(BtsError::Format(format!(
                    "{}: shape {:?} does not match {} values",
                    path,
                    dataset.shape,
                    dataset.values.len()
                )));
            }
        }
        Ok(container)
    }

    pub fn to_json(&self) -> BtsResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| BtsError::Format(e.to_string()))
    }

    fn dataset(&self, path: &str) -> BtsResult<&MemoryDataset> {
        self.datasets
            .get(normalize(path))
            .ok_or_else(|| BtsError::Format(format!("{}: no such dataset", path)))
    }
}

impl Container for MemoryContainer {
    fn has_path(&self, path: &str) -> bool {
        let path = normalize(path);
        if path.is_empty() {
            return false;
        }
        self.datasets.keys().any(|key| {
            key == path
                || key
                    .strip_prefix(path)
                    .map(|rest| rest.starts_with('/'))
                    .unwrap_or(false)
        })
    }

    fn shape(&self, path: &str) -> BtsResult<Vec<usize>> {
        Ok(self.dataset(path)?.shape.clone())
    }

    fn read_values(&self, path: &str) -> BtsResult<Vec<f64>> {
        Ok(self.dataset(path)?.values.clone())
    }
}

fn normalize(path: &str) -> &str {
    path.trim_matches('/')
}
