//! Common types and utilities shared across the DFOS monitor crates.

pub mod channel;
pub mod error;
pub mod stats;
pub mod view;

pub use channel::{Channel, SchemaVariant};
pub use error::{DfosError, DfosResult};
pub use stats::{DifferenceStats, SummaryStats};
pub use view::{ChannelControls, ChannelSeries, XRange};
