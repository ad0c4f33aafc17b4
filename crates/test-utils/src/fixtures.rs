//! In-memory BTS containers for tests.
//!
//! Fixtures are [`MemoryContainer`]s. [`FixtureOpener`] reads their JSON form
//! as if it were an uploaded file, so the whole upload-to-export path can run
//! without libhdf5.

use bts_parser::{
    dataset_path, BtsResult, Container, ContainerOpener, MemoryContainer, TIME_DATASET,
};
use dfos_common::Channel;

use crate::generators::{
    amplitude_frames, frequency_frames, indexed_frames, ramp, strain_frames, temperature_frames,
};

/// Builds a container dataset by dataset.
#[derive(Debug, Clone, Default)]
pub struct FixtureBuilder {
    container: MemoryContainer,
}

impl FixtureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time vector of `frames` samples, one minute apart.
    pub fn time(self, frames: usize) -> Self {
        let values = (0..frames).map(|i| i as f64 * 60.0).collect();
        self.time_values(values)
    }

    pub fn time_values(self, values: Vec<f64>) -> Self {
        let len = values.len();
        self.dataset(TIME_DATASET, vec![len], values)
    }

    /// `[frames, points]` array for `channel`.
    pub fn channel(self, channel: Channel, frames: usize, points: usize, values: Vec<f64>) -> Self {
        self.dataset(channel.dataset_name(), vec![frames, points], values)
    }

    /// Any dataset under the acquisition group.
    pub fn dataset(mut self, name: &str, shape: Vec<usize>, values: Vec<f64>) -> Self {
        self.container
            .insert(dataset_path(name), shape, values)
            .expect("fixture shape must match its values");
        self
    }

    pub fn build(self) -> MemoryContainer {
        self.container
    }

    /// Upload bytes understood by [`FixtureOpener`].
    pub fn to_bytes(&self) -> Vec<u8> {
        self.container
            .to_json()
            .expect("fixture containers always serialize")
    }
}

/// Opens fixture documents produced by [`FixtureBuilder::to_bytes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureOpener;

impl ContainerOpener for FixtureOpener {
    fn open(&self, data: &[u8]) -> BtsResult<Box<dyn Container>> {
        Ok(Box::new(MemoryContainer::from_json(data)?))
    }
}

/// Two frames over ten points:
/// strain frame 0 is `0..9`, temperature frame 0 is `10..19`.
pub fn small_temp_strain() -> FixtureBuilder {
    FixtureBuilder::new()
        .time(2)
        .channel(
            Channel::Strain,
            2,
            10,
            [ramp(0.0, 10), ramp(100.0, 10)].concat(),
        )
        .channel(
            Channel::Temperature,
            2,
            10,
            [ramp(10.0, 10), ramp(200.0, 10)].concat(),
        )
}

/// Strain and temperature with `row * 1000 + col` cells.
pub fn indexed_temp_strain(frames: usize, points: usize) -> FixtureBuilder {
    FixtureBuilder::new()
        .time(frames)
        .channel(Channel::Strain, frames, points, indexed_frames(frames, points))
        .channel(
            Channel::Temperature,
            frames,
            points,
            indexed_frames(frames, points),
        )
}

/// Realistic-looking strain and temperature profiles.
pub fn temp_strain(frames: usize, points: usize) -> FixtureBuilder {
    FixtureBuilder::new()
        .time(frames)
        .channel(Channel::Strain, frames, points, strain_frames(frames, points))
        .channel(
            Channel::Temperature,
            frames,
            points,
            temperature_frames(frames, points),
        )
}

/// Realistic-looking frequency and amplitude profiles.
pub fn brill_frequency(frames: usize, points: usize) -> FixtureBuilder {
    FixtureBuilder::new()
        .time(frames)
        .channel(
            Channel::Frequency,
            frames,
            points,
            frequency_frames(frames, points),
        )
        .channel(
            Channel::Amplitude,
            frames,
            points,
            amplitude_frames(frames, points),
        )
}

/// All four channel datasets present.
pub fn all_channels(frames: usize, points: usize) -> FixtureBuilder {
    let brill = brill_frequency(frames, points).build();
    let mut builder = temp_strain(frames, points);
    for channel in [Channel::Frequency, Channel::Amplitude] {
        let path = dataset_path(channel.dataset_name());
        let shape = brill.shape(&path).expect("fixture dataset exists");
        let values = brill.read_values(&path).expect("fixture dataset exists");
        builder = builder.dataset(channel.dataset_name(), shape, values);
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_fixture_paths() {
        let container = small_temp_strain().build();
        assert!(container.has_path(&dataset_path(TIME_DATASET)));
        assert!(container.has_path(&dataset_path("StrainData")));
        assert!(!container.has_path(&dataset_path("FrequencyData")));
    }

    #[test]
    fn test_fixture_opener_round_trip() {
        let builder = brill_frequency(2, 5);
        let container = FixtureOpener.open(&builder.to_bytes()).unwrap();
        assert_eq!(
            container.shape(&dataset_path("AmplitudeData")).unwrap(),
            vec![2, 5]
        );
    }

    #[test]
    fn test_fixture_opener_rejects_garbage() {
        assert!(FixtureOpener.open(b"\x89HDF\r\n\x1a\n").is_err());
    }

    #[test]
    fn test_all_channels() {
        let container = all_channels(1, 4).build();
        for channel in Channel::ALL {
            assert!(container.has_path(&dataset_path(channel.dataset_name())));
        }
    }
}
