//! Deadline wrapper for async operations

use std::future::Future;
use std::time::Duration;

use crate::error::{CommonError, CommonResult};

/// Run `future` with a deadline.
///
/// Returns [`CommonError::Timeout`] naming `operation` when `duration`
/// elapses first. The future is dropped on timeout.
///
/// # Errors
///
/// Returns `CommonError::Timeout` if the deadline is reached.
pub async fn with_timeout<F>(operation: &str, duration: Duration, future: F) -> CommonResult<F::Output>
where
    F: Future,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| CommonError::timeout(operation, duration))
}
