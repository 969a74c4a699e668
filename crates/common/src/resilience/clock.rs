//! Time abstraction for testability
//!
//! Caches, timeouts and the statistics services read time through [`Clock`]
//! so that tests can drive TTL expiry and month boundaries deterministically
//! with [`MockClock`] instead of sleeping.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of monotonic and wall-clock time
pub trait Clock: Send + Sync + 'static {
    /// Monotonic instant, for ages and TTLs
    fn now(&self) -> Instant;

    /// Wall-clock time, for calendar math and timestamps
    fn system_time(&self) -> SystemTime;
}

/// Shared, type-erased clock handle
pub type SharedClock = Arc<dyn Clock>;

/// The operating system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Forward through `Arc` so `Arc<dyn Clock>` and `Arc<MockClock>` are clocks
impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn system_time(&self) -> SystemTime {
        (**self).system_time()
    }
}

/// Manually advanced clock for tests
///
/// Monotonic and wall time move together and only through [`advance`].
/// Clones share the same offset. Wall time starts at the UNIX epoch unless
/// pinned with [`MockClock::at_unix_secs`].
///
/// [`advance`]: MockClock::advance
#[derive(Debug, Clone)]
pub struct MockClock {
    base_instant: Instant,
    base_wall: SystemTime,
    offset: Arc<Mutex<Duration>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::at_unix_secs(0)
    }

    /// Clock whose wall time reads `secs` after the epoch
    pub fn at_unix_secs(secs: u64) -> Self {
        Self {
            base_instant: Instant::now(),
            base_wall: UNIX_EPOCH + Duration::from_secs(secs),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut offset) = self.offset.lock() {
            *offset += by;
        }
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Total time advanced so far
    pub fn elapsed(&self) -> Duration {
        self.offset.lock().map(|offset| *offset).unwrap_or_default()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.base_instant + self.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        self.base_wall + self.elapsed()
    }
}
