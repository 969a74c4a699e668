//! Shared test helpers for `interconnect-core` integration tests.
//!
//! Scripted gateway and snapshot store mocks, plus a calculator context
//! pinned to a fixed calendar date so month windows are deterministic.

#![allow(dead_code)]

pub mod gateway;
pub mod snapshots;

use std::sync::Arc;
use std::time::Duration;

use interconnect_common::resilience::MockClock;
use interconnect_core::stats::{CalculatorContext, SchemaResolver};
use interconnect_core::DataGateway;

pub use gateway::{Scripted, ScriptedGateway};
pub use snapshots::RecordingSnapshotStore;

/// 2025-03-14T09:30:00Z
pub const FIXED_UNIX_SECS: u64 = 1_741_944_600;

pub const TEST_USER: &str = "user-1";

pub const CACHE_TTL: Duration = Duration::from_secs(300);

pub const CALL_TIMEOUT: Duration = Duration::from_secs(5);

/// Clock pinned to [`FIXED_UNIX_SECS`]
pub fn fixed_clock() -> Arc<MockClock> {
    Arc::new(MockClock::at_unix_secs(FIXED_UNIX_SECS))
}

/// Calculator context over `gateway` with [`TEST_USER`] as current user
pub fn context(gateway: Arc<ScriptedGateway>, clock: Arc<MockClock>) -> CalculatorContext {
    let gateway: Arc<dyn DataGateway> = gateway;
    CalculatorContext {
        resolver: Arc::new(SchemaResolver::new(Arc::clone(&gateway), CALL_TIMEOUT)),
        gateway,
        clock,
        cache_ttl: CACHE_TTL,
        call_timeout: CALL_TIMEOUT,
        current_user: Some(TEST_USER.to_string()),
    }
}
