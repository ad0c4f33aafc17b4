//! Extraction output types.

use std::collections::BTreeMap;

use dfos_common::{Channel, SchemaVariant};
use serde::Serialize;

use crate::error::{BtsError, BtsResult};

/// A two-dimensional `[frames, distance_points]` array, row-major.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frames {
    pub num_frames: usize,
    pub distance_points: usize,
    pub values: Vec<f64>,
}

impl Frames {
    /// Build from a native shape. Anything other than 2-D is rejected.
    pub fn from_shape(name: &str, shape: &[usize], values: Vec<f64>) -> BtsResult<Self> {
        let [num_frames, distance_points] = match shape {
            [frames, points] => [*frames, *points],
            _ => {
                return Err(BtsError::EmptyData(format!(
                    "{} has shape {:?}, expected [frames, distance_points]",
                    name, shape
                )))
            }
        };
        if num_frames * distance_points != values.len() {
            return Err(BtsError::Format(format!(
                "{}: shape {:?} does not match {} values",
                name,
                shape,
                values.len()
            )));
        }
        Ok(Self {
            num_frames,
            distance_points,
            values,
        })
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.num_frames, self.distance_points]
    }

    /// One frame (time sample) across the distance axis.
    pub fn frame(&self, index: usize) -> Option<&[f64]> {
        if index >= self.num_frames {
            return None;
        }
        let start = index * self.distance_points;
        self.values.get(start..start + self.distance_points)
    }
}

/// Full array plus first frame for one channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelData {
    pub channel: Channel,
    pub full: Frames,
    pub first_frame: Vec<f64>,
}

/// Native shapes as read from the container.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ShapeMetadata {
    pub time_shape: Vec<usize>,
    pub shapes: BTreeMap<Channel, Vec<usize>>,
}

/// Everything downstream views need from one container.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub file_type: SchemaVariant,
    pub time: Vec<f64>,
    /// Dataset pair in source order; the first entry defines the distance axis.
    pub channels: [ChannelData; 2],
    /// `0..distance_points`.
    pub distance: Vec<usize>,
    pub distance_points: usize,
    pub metadata: ShapeMetadata,
}

impl Extraction {
    pub fn channel(&self, channel: Channel) -> Option<&ChannelData> {
        self.channels.iter().find(|data| data.channel == channel)
    }

    pub fn first_frame(&self, channel: Channel) -> Option<&[f64]> {
        self.channel(channel).map(|data| data.first_frame.as_slice())
    }

    pub fn num_frames(&self) -> usize {
        self.channels[0].full.num_frames
    }

    /// Channels in display order.
    pub fn display_channels(&self) -> [Channel; 2] {
        self.file_type.display_channels()
    }
}

/// Outcome of one extraction. Exactly one of success or failure.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Success(Box<Extraction>),
    Failure(BtsError),
}

impl AnalysisResult {
    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisResult::Success(_))
    }

    pub fn extraction(&self) -> Option<&Extraction> {
        match self {
            AnalysisResult::Success(extraction) => Some(extraction.as_ref()),
            AnalysisResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&BtsError> {
        match self {
            AnalysisResult::Success(_) => None,
            AnalysisResult::Failure(err) => Some(err),
        }
    }

    pub fn into_result(self) -> BtsResult<Extraction> {
        match self {
            AnalysisResult::Success(extraction) => Ok(*extraction),
            AnalysisResult::Failure(err) => Err(err),
        }
    }
}

impl From<BtsResult<Extraction>> for AnalysisResult {
    fn from(result: BtsResult<Extraction>) -> Self {
        match result {
            Ok(extraction) => AnalysisResult::Success(Box::new(extraction)),
            Err(err) => AnalysisResult::Failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_rows() {
        let frames = Frames::from_shape("x", &[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        assert_eq!(frames.shape(), [2, 3]);
        assert_eq!(frames.frame(0), Some(&[1.0, 2.0, 3.0][..]));
        assert_eq!(frames.frame(1), Some(&[4.0, 5.0, 6.0][..]));
        assert_eq!(frames.frame(2), None);
    }

    #[test]
    fn test_frames_rejects_wrong_rank() {
        assert!(matches!(
            Frames::from_shape("x", &[6], vec![0.0; 6]),
            Err(BtsError::EmptyData(_))
        ));
        assert!(matches!(
            Frames::from_shape("x", &[1, 2, 3], vec![0.0; 6]),
            Err(BtsError::EmptyData(_))
        ));
    }

    #[test]
    fn test_frames_without_rows() {
        let frames = Frames::from_shape("x", &[0, 4], vec![]).unwrap();
        assert_eq!(frames.frame(0), None);
    }
}
