//! Dataset-pair detection.

use std::fmt;

use dfos_common::{Channel, SchemaVariant};
use serde::Serialize;

use crate::container::{dataset_path, Container};

/// Which of the four channel datasets exist in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DatasetPresence {
    pub strain: bool,
    pub temperature: bool,
    pub frequency: bool,
    pub amplitude: bool,
}

impl DatasetPresence {
    /// Check a container for every channel dataset.
    pub fn scan<C: Container + ?Sized>(container: &C) -> Self {
        let exists = |channel: Channel| container.has_path(&dataset_path(channel.dataset_name()));
        Self {
            strain: exists(Channel::Strain),
            temperature: exists(Channel::Temperature),
            frequency: exists(Channel::Frequency),
            amplitude: exists(Channel::Amplitude),
        }
    }

    pub fn has(&self, channel: Channel) -> bool {
        match channel {
            Channel::Strain => self.strain,
            Channel::Temperature => self.temperature,
            Channel::Frequency => self.frequency,
            Channel::Amplitude => self.amplitude,
        }
    }

    /// First variant in detection order whose pair is complete.
    pub fn detect(&self) -> Option<SchemaVariant> {
        SchemaVariant::DETECTION_ORDER
            .into_iter()
            .find(|variant| variant.channels().iter().all(|&c| self.has(c)))
    }
}

impl fmt::Display for DatasetPresence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |present: bool| if present { "True" } else { "False" };
        write!(
            f,
            "StrainData={}, TemperatureData={}, FrequencyData={}, AmplitudeData={}",
            flag(self.strain),
            flag(self.temperature),
            flag(self.frequency),
            flag(self.amplitude)
        )
    }
}
