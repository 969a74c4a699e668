//! Recording `SnapshotStore` mock.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use interconnect_core::SnapshotStore;
use interconnect_domain::{InterconnectError, Result, SnapshotBaseline, StatisticsSnapshot};
use parking_lot::Mutex;

/// In-memory snapshot store that records loads and saves.
///
/// Saved snapshots become the next baseline, like the gateway-backed store.
#[derive(Default)]
pub struct RecordingSnapshotStore {
    baseline: Mutex<Option<SnapshotBaseline>>,
    saved: Mutex<Vec<StatisticsSnapshot>>,
    load_calls: AtomicUsize,
    load_delay: Option<Duration>,
    fail_loads: bool,
    fail_saves: bool,
}

impl RecordingSnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_baseline(self, baseline: SnapshotBaseline) -> Self {
        *self.baseline.lock() = Some(baseline);
        self
    }

    /// Delay every load; pair with paused tokio time
    #[must_use]
    pub fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn failing_loads(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    #[must_use]
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    pub fn saved(&self) -> Vec<StatisticsSnapshot> {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl SnapshotStore for RecordingSnapshotStore {
    async fn load_latest(&self) -> Result<Option<SnapshotBaseline>> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.load_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_loads {
            return Err(InterconnectError::Network("connection reset".into()));
        }
        Ok(self.baseline.lock().clone())
    }

    async fn save(&self, snapshot: &StatisticsSnapshot) -> Result<()> {
        if self.fail_saves {
            return Err(InterconnectError::Persistence("read-only replica".into()));
        }
        self.saved.lock().push(snapshot.clone());
        *self.baseline.lock() = Some(SnapshotBaseline::from(snapshot));
        Ok(())
    }
}
