//! Async test helpers

use std::future::Future;
use std::time::Duration;

/// Re-check `condition` every `interval` until it holds or `timeout` elapses.
///
/// Sleeps on tokio's clock, so paused-time tests advance through it instantly.
/// The condition gets one last check at the deadline.
pub async fn poll_until<F, Fut>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        if condition().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}
