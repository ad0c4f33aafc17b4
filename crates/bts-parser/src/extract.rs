//! First-sweep extraction.
//!
//! Reads the time vector, detects the dataset pair, reads both arrays and
//! slices out frame 0. Every failure becomes an [`AnalysisResult::Failure`];
//! nothing here panics on bad input.

use std::io::{Read, Seek, SeekFrom};

use dfos_common::Channel;
use tracing::{debug, info, warn};

use crate::container::{dataset_path, Container, ContainerOpener, TIME_DATASET};
use crate::error::{BtsError, BtsResult};
use crate::result::{AnalysisResult, ChannelData, Extraction, Frames, ShapeMetadata};
use crate::schema::DatasetPresence;

/// Extract from a seekable byte source.
///
/// The source is rewound before reading, so the same handle can be passed
/// again and yields an identical result.
pub fn extract<R: Read + Seek>(opener: &dyn ContainerOpener, mut source: R) -> AnalysisResult {
    let mut data = Vec::new();
    let read = source
        .seek(SeekFrom::Start(0))
        .and_then(|_| source.read_to_end(&mut data));
    if let Err(e) = read {
        warn!(error = %e, "Failed to read upload");
        return AnalysisResult::Failure(BtsError::Format(format!("cannot read source: {}", e)));
    }
    extract_bytes(opener, &data)
}

/// Extract from bytes already in memory.
pub fn extract_bytes(opener: &dyn ContainerOpener, data: &[u8]) -> AnalysisResult {
    match opener.open(data) {
        Ok(container) => extract_from(container.as_ref()),
        Err(err) => {
            warn!(error = %err, bytes = data.len(), "Failed to open container");
            AnalysisResult::Failure(err)
        }
    }
}

/// Extract from an already opened container.
pub fn extract_from<C: Container + ?Sized>(container: &C) -> AnalysisResult {
    let result = try_extract(container);
    match &result {
        Ok(extraction) => info!(
            file_type = %extraction.file_type,
            frames = extraction.num_frames(),
            distance_points = extraction.distance_points,
            "Extracted first sweep"
        ),
        Err(err) => warn!(kind = err.kind(), error = %err, "Extraction failed"),
    }
    result.into()
}

fn try_extract<C: Container + ?Sized>(container: &C) -> BtsResult<Extraction> {
    let time_path = dataset_path(TIME_DATASET);
    if !container.has_path(&time_path) {
        return Err(BtsError::MissingMandatoryData(format!("{} not found", time_path)));
    }
    let time_shape = container.shape(&time_path)?;
    let time = container.read_values(&time_path)?;

    let presence = DatasetPresence::scan(container);
    let file_type = presence
        .detect()
        .ok_or(BtsError::UnsupportedStructure(presence))?;
    debug!(%file_type, %presence, "Detected dataset pair");

    let [lead, follow] = file_type.channels();
    let lead = read_channel(container, lead)?;
    let follow = read_channel(container, follow)?;

    let distance_points = lead.full.distance_points;
    if follow.full.distance_points != distance_points {
        return Err(BtsError::InconsistentShape(format!(
            "{} has {} distance points but {} has {}",
            follow.channel.dataset_name(),
            follow.full.distance_points,
            lead.channel.dataset_name(),
            distance_points
        )));
    }

    let mut metadata = ShapeMetadata {
        time_shape,
        ..Default::default()
    };
    for data in [&lead, &follow] {
        metadata
            .shapes
            .insert(data.channel, data.full.shape().to_vec());
    }

    Ok(Extraction {
        file_type,
        time,
        distance: (0..distance_points).collect(),
        distance_points,
        channels: [lead, follow],
        metadata,
    })
}

fn read_channel<C: Container + ?Sized>(container: &C, channel: Channel) -> BtsResult<ChannelData> {
    let name = channel.dataset_name();
    let path = dataset_path(name);
    let shape = container.shape(&path)?;
    let values = container.read_values(&path)?;
    let full = Frames::from_shape(name, &shape, values)?;
    let first_frame = full
        .frame(0)
        .ok_or_else(|| BtsError::EmptyData(format!("{} has no frames", name)))?
        .to_vec();

    Ok(ChannelData {
        channel,
        full,
        first_frame,
    })
}
