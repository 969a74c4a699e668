//! Domain types and models

pub mod record;
pub mod stats;

pub use record::Record;
pub use stats::{
    MetricKind, MetricReading, ReadingSource, SnapshotBaseline, SnapshotRow, StatisticsSnapshot,
};
