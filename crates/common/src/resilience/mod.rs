//! Resilience patterns for degrading gracefully
//!
//! - **Clock**: time abstraction shared by caches and services
//! - **Timeout**: per-call deadlines mapped onto `CommonError::Timeout`
//! - **Fallback**: ordered "attempt, then next" evaluation of candidate
//!   strategies

pub mod clock;
pub mod fallback;
pub mod timeout;

pub use clock::{Clock, MockClock, SharedClock, SystemClock};
pub use fallback::{first_success, FallbackExhausted, FallbackSuccess, TierFailure};
pub use timeout::with_timeout;
