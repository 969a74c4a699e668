//! Periodic statistics refresh.
//!
//! Runs [`StatsAggregator::aggregate`] immediately on start and then once per
//! interval, publishing every snapshot on a `watch` channel.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use interconnect_core::StatsAggregator;
//! use interconnect_infra::scheduling::{StatsRefresher, StatsRefresherConfig};
//!
//! # async fn example(aggregator: StatsAggregator) -> Result<(), Box<dyn std::error::Error>> {
//! let mut refresher = StatsRefresher::new(
//!     aggregator,
//!     StatsRefresherConfig { interval: Duration::from_secs(30), ..Default::default() },
//! );
//! let mut updates = refresher.subscribe();
//!
//! refresher.start().await?;
//! updates.changed().await?;
//! println!("{:?}", refresher.latest());
//! refresher.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use interconnect_core::StatsAggregator;
use interconnect_domain::constants::DEFAULT_REFRESH_INTERVAL_SECS;
use interconnect_domain::StatisticsSnapshot;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

type TaskHandle = Arc<Mutex<Option<JoinHandle<()>>>>;

/// Latest snapshot, `None` until the first cycle completes
pub type SnapshotReceiver = watch::Receiver<Option<StatisticsSnapshot>>;

/// Configuration for the stats refresher
#[derive(Debug, Clone)]
pub struct StatsRefresherConfig {
    /// Pause between the end of one cycle and the start of the next
    pub interval: Duration,
    /// How long `stop` waits for the background task
    pub join_timeout: Duration,
}

impl Default for StatsRefresherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Background task keeping a fresh [`StatisticsSnapshot`]
pub struct StatsRefresher {
    aggregator: StatsAggregator,
    config: StatsRefresherConfig,
    cancellation_token: CancellationToken,
    task_handle: TaskHandle,
    sender: Arc<watch::Sender<Option<StatisticsSnapshot>>>,
}

impl StatsRefresher {
    pub fn new(aggregator: StatsAggregator, config: StatsRefresherConfig) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            aggregator,
            config,
            cancellation_token: CancellationToken::new(),
            task_handle: Arc::new(Mutex::new(None)),
            sender: Arc::new(sender),
        }
    }

    /// Receiver notified after every completed cycle
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.sender.subscribe()
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> Option<StatisticsSnapshot> {
        self.sender.borrow().clone()
    }

    /// Start the refresh loop
    ///
    /// # Errors
    ///
    /// Returns error if the refresher is already running
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        // Fresh token so the refresher can restart after stop
        self.cancellation_token = CancellationToken::new();

        let aggregator = self.aggregator.clone();
        let sender = Arc::clone(&self.sender);
        let interval = self.config.interval;
        let cancel = self.cancellation_token.clone();

        let handle = tokio::spawn(async move {
            Self::refresh_loop(aggregator, sender, interval, cancel).await;
        });
        *self.task_handle.lock().await = Some(handle);

        info!(interval_secs = interval.as_secs(), "stats refresher started");
        Ok(())
    }

    /// Stop the refresh loop and wait for the task to finish
    ///
    /// # Errors
    ///
    /// Returns error if the refresher is not running or the task does not
    /// finish within the join timeout
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation_token.cancel();

        if let Some(handle) = self.task_handle.lock().await.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })??;
        }

        info!("stats refresher stopped");
        Ok(())
    }

    /// Whether the background task is alive
    pub fn is_running(&self) -> bool {
        self.task_handle
            .try_lock()
            .ok()
            .and_then(|guard| guard.as_ref().map(|h| !h.is_finished()))
            .unwrap_or(false)
    }

    async fn refresh_loop(
        aggregator: StatsAggregator,
        sender: Arc<watch::Sender<Option<StatisticsSnapshot>>>,
        interval: Duration,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("refresh loop cancelled during cycle");
                    break;
                }
                snapshot = aggregator.aggregate() => {
                    debug!(captured_at = %snapshot.captured_at, "publishing snapshot");
                    sender.send_replace(Some(snapshot));
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("refresh loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }
    }
}

impl Drop for StatsRefresher {
    fn drop(&mut self) {
        if !self.cancellation_token.is_cancelled() && self.is_running() {
            warn!("StatsRefresher dropped while running; cancelling");
        }
        self.cancellation_token.cancel();
    }
}
