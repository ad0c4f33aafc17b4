//! User-controlled views over a first-frame channel array.
//!
//! Every surface that shows or exports a channel (charts, overlays, CSV rows,
//! PDF pages and their statistics) goes through [`ChannelSeries`], so the
//! offset and range transforms are applied exactly once and identically.

use serde::{Deserialize, Serialize};

use crate::channel::Channel;
use crate::error::{DfosError, DfosResult};
use crate::stats::SummaryStats;

/// Inclusive index range over the distance axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct XRange {
    pub min: usize,
    pub max: usize,
}

impl XRange {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// The whole axis, `[0, distance_points - 1]`. `None` for an empty axis.
    pub fn full(distance_points: usize) -> Option<Self> {
        distance_points.checked_sub(1).map(|max| Self { min: 0, max })
    }

    /// Validate a user-supplied range against an axis of `distance_points`.
    ///
    /// `max` is clamped to the last index; `min` beyond `max` is rejected.
    pub fn resolve(min: usize, max: usize, distance_points: usize) -> DfosResult<Self> {
        let last = distance_points
            .checked_sub(1)
            .ok_or_else(|| DfosError::invalid("x_max", "the distance axis is empty"))?;
        let max = max.min(last);
        if min > max {
            return Err(DfosError::invalid(
                "x_min",
                format!("{} exceeds x_max {}", min, max),
            ));
        }
        Ok(Self { min, max })
    }

    /// Number of indices covered. Never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.max - self.min + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.min && index <= self.max
    }

    /// Overlap of two ranges, if any.
    pub fn intersect(&self, other: &XRange) -> Option<XRange> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(XRange { min, max })
    }

    /// Clamp to an axis of `distance_points`. `None` when nothing remains.
    pub fn clamp_to(&self, distance_points: usize) -> Option<XRange> {
        XRange::full(distance_points).and_then(|full| self.intersect(&full))
    }

    pub fn indices(&self) -> impl Iterator<Item = usize> {
        self.min..=self.max
    }
}

/// Offset and range controls for one channel of one file.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ChannelControls {
    /// Added to every value before display or export.
    pub offset: f64,
    /// `None` selects the full distance axis.
    pub range: Option<XRange>,
}

impl ChannelControls {
    pub fn new(offset: f64, range: Option<XRange>) -> DfosResult<Self> {
        if !offset.is_finite() {
            return Err(DfosError::invalid("offset", "must be a finite number"));
        }
        Ok(Self { offset, range })
    }

    /// Range actually applied to an axis of `distance_points`.
    pub fn effective_range(&self, distance_points: usize) -> Option<XRange> {
        match self.range {
            Some(range) => range.clamp_to(distance_points),
            None => XRange::full(distance_points),
        }
    }

    /// Same offset, different range.
    pub fn with_range(&self, range: Option<XRange>) -> Self {
        Self {
            offset: self.offset,
            range,
        }
    }
}

/// A channel after the offset and range transforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelSeries {
    pub channel: Channel,
    pub offset: f64,
    pub range: XRange,
    /// Distance indices `range.min..=range.max`.
    pub distance: Vec<usize>,
    /// `first_frame[i] + offset` for every index in `distance`.
    pub values: Vec<f64>,
}

impl ChannelSeries {
    /// Apply `controls` to a first-frame array.
    pub fn from_first_frame(
        channel: Channel,
        first_frame: &[f64],
        controls: &ChannelControls,
    ) -> DfosResult<Self> {
        let range = controls.effective_range(first_frame.len()).ok_or_else(|| {
            DfosError::invalid(
                "x_min",
                format!("range does not overlap the {} distance points", first_frame.len()),
            )
        })?;

        let offset = controls.offset;
        let values = first_frame[range.min..=range.max]
            .iter()
            .map(|v| v + offset)
            .collect();

        Ok(Self {
            channel,
            offset,
            range,
            distance: range.indices().collect(),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Transformed value at an absolute distance index.
    pub fn value_at(&self, distance_index: usize) -> Option<f64> {
        if !self.range.contains(distance_index) {
            return None;
        }
        self.values.get(distance_index - self.range.min).copied()
    }

    /// Summary statistics over the transformed values.
    pub fn stats(&self) -> Option<SummaryStats> {
        SummaryStats::compute(&self.values)
    }

    /// Distance axis as `f64`, for plotting.
    pub fn x_values(&self) -> Vec<f64> {
        self.distance.iter().map(|&d| d as f64).collect()
    }
}
