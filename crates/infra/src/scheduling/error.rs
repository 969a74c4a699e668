//! Lifecycle errors of background refresh tasks

use interconnect_domain::InterconnectError;
use thiserror::Error;

use crate::errors::InfraError;

/// Failures starting, stopping or joining a background task
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("background task is already running")]
    AlreadyRunning,

    #[error("background task is not running")]
    NotRunning,

    /// Background task did not finish within the join timeout
    #[error("background task did not stop within {seconds}s")]
    Timeout { seconds: u64 },

    /// Task panicked or was aborted
    #[error("background task failed: {0}")]
    TaskJoinFailed(String),
}

impl From<tokio::task::JoinError> for SchedulerError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::TaskJoinFailed(err.to_string())
    }
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        let inner = match err {
            SchedulerError::AlreadyRunning | SchedulerError::NotRunning => {
                InterconnectError::InvalidInput(err.to_string())
            }
            SchedulerError::Timeout { .. } => InterconnectError::Timeout(err.to_string()),
            SchedulerError::TaskJoinFailed(_) => InterconnectError::Internal(err.to_string()),
        };
        InfraError(inner)
    }
}

impl From<SchedulerError> for InterconnectError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Result of refresher lifecycle calls
pub type SchedulerResult<T> = Result<T, SchedulerError>;
