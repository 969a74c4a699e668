//! Scheduling infrastructure for background refresh
//!
//! Schedulers follow one lifecycle shape:
//! - Explicit `start`/`stop`
//! - Join handle for the spawned task, awaited with a timeout on stop
//! - Cancellation token, also cancelled on drop

pub mod error;
pub mod stats_refresher;

pub use error::{SchedulerError, SchedulerResult};
pub use stats_refresher::{SnapshotReceiver, StatsRefresher, StatsRefresherConfig};
