//! Cache configuration

use std::time::Duration;

/// How long entries stay servable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheConfig {
    /// Time-to-live for entries (None = entries never expire)
    pub ttl: Option<Duration>,
}

impl CacheConfig {
    /// Entries live for `duration`
    pub const fn ttl(duration: Duration) -> Self {
        Self { ttl: Some(duration) }
    }

    /// Entries live until removed or cleared
    pub const fn no_expiry() -> Self {
        Self { ttl: None }
    }

    /// Whether an entry of this `age` is past its TTL
    pub fn is_expired(&self, age: Duration) -> bool {
        self.ttl.is_some_and(|ttl| age >= ttl)
    }
}
