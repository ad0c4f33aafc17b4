//! BTS acquisition file ingestion.
//!
//! A BTS file is an HDF5 container holding one Brillouin acquisition under
//! `Acquisition/Custom/Brillouin[0]/`: a per-frame time vector and one of two
//! dataset pairs (strain/temperature or frequency/amplitude), each shaped
//! `[frames, distance_points]`.
//!
//! This crate detects which pair is present and extracts the first frame of
//! each array, reporting every problem as a typed [`BtsError`] inside an
//! [`AnalysisResult`].

pub mod container;
pub mod error;
pub mod extract;
pub mod native;
pub mod result;
pub mod schema;

pub use container::{
    dataset_path, default_opener, is_supported_file_name, Container, ContainerOpener,
    MemoryContainer, MemoryDataset, ACQUISITION_PREFIX, SUPPORTED_EXTENSIONS, TIME_DATASET,
};
pub use error::{BtsError, BtsResult};
pub use extract::{extract, extract_bytes, extract_from};
pub use native::{silence_hdf5_errors, Hdf5Container, Hdf5Opener};
pub use result::{AnalysisResult, ChannelData, Extraction, Frames, ShapeMetadata};
pub use schema::DatasetPresence;
