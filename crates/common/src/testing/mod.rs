//! Testing utilities shared by the workspace's test suites
//!
//! - **[`assertions`]**: float comparisons for percentages
//! - **[`async_utils`]**: polling helpers for background tasks
//!
//! Mock time lives in [`crate::resilience::MockClock`].

pub mod assertions;
pub mod async_utils;

pub use assertions::assert_approx_eq;
pub use async_utils::poll_until;
