//! Errors produced by the generic runtime utilities
//!
//! Domain crates convert [`CommonError`] into their own error type at the
//! boundary instead of leaking it.

use std::fmt;
use std::time::Duration;

/// Standard result type using CommonError
pub type CommonResult<T> = Result<T, CommonError>;

/// Failures of the timeout and fallback utilities
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommonError {
    /// An operation exceeded its deadline
    Timeout { operation: String, duration: Duration },
}

impl fmt::Display for CommonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { operation, duration } => {
                write!(f, "Operation '{operation}' timed out after {duration:?}")
            }
        }
    }
}

impl std::error::Error for CommonError {}

impl CommonError {
    pub fn timeout<S: Into<String>>(operation: S, duration: Duration) -> Self {
        Self::Timeout { operation: operation.into(), duration }
    }
}
