//! Measurement channels and the two acquisition schema variants.
//!
//! A BTS container carries exactly one dataset pair under the Brillouin
//! acquisition group. The pair decides the [`SchemaVariant`], and each
//! dataset of the pair maps to one [`Channel`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One per-distance measurement quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Temperature,
    Strain,
    Frequency,
    Amplitude,
}

impl Channel {
    /// All channels, in display order.
    pub const ALL: [Channel; 4] = [
        Channel::Temperature,
        Channel::Strain,
        Channel::Frequency,
        Channel::Amplitude,
    ];

    /// Dataset name under the acquisition group.
    pub fn dataset_name(&self) -> &'static str {
        match self {
            Channel::Temperature => "TemperatureData",
            Channel::Strain => "StrainData",
            Channel::Frequency => "FrequencyData",
            Channel::Amplitude => "AmplitudeData",
        }
    }

    /// Lowercase identifier used in URLs and forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Temperature => "temperature",
            Channel::Strain => "strain",
            Channel::Frequency => "frequency",
            Channel::Amplitude => "amplitude",
        }
    }

    /// Human-readable quantity name.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Temperature => "Temperature",
            Channel::Strain => "Strain",
            Channel::Frequency => "Frequency",
            Channel::Amplitude => "Amplitude",
        }
    }

    /// Display unit.
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::Temperature => "°C",
            Channel::Strain => "µε",
            Channel::Frequency => "GHz",
            Channel::Amplitude => "a.u.",
        }
    }

    /// Y-axis label, e.g. `Temperature (°C)`.
    pub fn axis_label(&self) -> String {
        format!("{} ({})", self.label(), self.unit())
    }

    /// Column header used by the CSV export.
    pub fn csv_header(&self) -> &'static str {
        match self {
            Channel::Temperature => "Temperature_C",
            Channel::Strain => "Strain_ue",
            Channel::Frequency => "Frequency_GHz",
            Channel::Amplitude => "Amplitude",
        }
    }

    /// Chart title for a single-file plot.
    pub fn title(&self) -> &'static str {
        match self {
            Channel::Temperature => "Temperature Distribution",
            Channel::Strain => "Strain Distribution",
            Channel::Frequency => "Brillouin Frequency Distribution",
            Channel::Amplitude => "Brillouin Amplitude Distribution",
        }
    }

    /// Line color (hex) for the primary file.
    pub fn color(&self) -> &'static str {
        match self {
            Channel::Temperature => "#e74c3c",
            Channel::Strain => "#3498db",
            Channel::Frequency => "#9b59b6",
            Channel::Amplitude => "#16a085",
        }
    }

    /// Line color (hex) for the second file of a comparison.
    pub fn comparison_color(&self) -> &'static str {
        match self {
            Channel::Temperature => "#f39c12",
            Channel::Strain => "#9b59b6",
            Channel::Frequency => "#e67e22",
            Channel::Amplitude => "#2c3e50",
        }
    }

    /// Schema variant this channel belongs to.
    pub fn variant(&self) -> SchemaVariant {
        match self {
            Channel::Temperature | Channel::Strain => SchemaVariant::TempStrain,
            Channel::Frequency | Channel::Amplitude => SchemaVariant::BrillFrequency,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "temperature" | "temp" => Ok(Channel::Temperature),
            "strain" => Ok(Channel::Strain),
            "frequency" | "freq" => Ok(Channel::Frequency),
            "amplitude" | "amp" => Ok(Channel::Amplitude),
            other => Err(format!("unknown channel '{}'", other)),
        }
    }
}

/// The two mutually exclusive dataset-pair layouts of a BTS container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVariant {
    TempStrain,
    BrillFrequency,
}

impl SchemaVariant {
    /// Detection order. Earlier variants win when several match.
    pub const DETECTION_ORDER: [SchemaVariant; 2] =
        [SchemaVariant::TempStrain, SchemaVariant::BrillFrequency];

    /// Dataset pair in source order. The first entry defines the distance
    /// dimension of the whole file.
    pub fn channels(&self) -> [Channel; 2] {
        match self {
            SchemaVariant::TempStrain => [Channel::Strain, Channel::Temperature],
            SchemaVariant::BrillFrequency => [Channel::Frequency, Channel::Amplitude],
        }
    }

    /// Channel order for charts, tables and reports.
    pub fn display_channels(&self) -> [Channel; 2] {
        match self {
            SchemaVariant::TempStrain => [Channel::Temperature, Channel::Strain],
            SchemaVariant::BrillFrequency => [Channel::Frequency, Channel::Amplitude],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::TempStrain => "TempStrain",
            SchemaVariant::BrillFrequency => "BrillFrequency",
        }
    }

    /// Short description shown next to a processed file.
    pub fn description(&self) -> &'static str {
        match self {
            SchemaVariant::TempStrain => "Temperature & Strain",
            SchemaVariant::BrillFrequency => "Frequency & Amplitude",
        }
    }

    pub fn has_channel(&self, channel: Channel) -> bool {
        channel.variant() == *self
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
