//! Async TTL cache.
//!
//! Entries remember when they were computed. A lookup only returns an entry
//! while `now - computed_at < ttl`; an expired entry is removed on access and
//! reported as a miss, never served.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use tokio::sync::RwLock;

use super::config::CacheConfig;
use super::stats::{CacheStats, Counter, Counters};
use crate::resilience::{Clock, SystemClock};

/// A live cache entry as seen by callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue<V> {
    /// Cached value
    pub value: V,
    /// Wall-clock time at which the value was stored
    pub computed_at: SystemTime,
    /// Time elapsed since the value was stored
    pub age: Duration,
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    computed_at: SystemTime,
}

/// Async cache with TTL expiry.
///
/// Clones share storage and counters.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use interconnect_common::cache::{AsyncCache, CacheConfig};
///
/// #[tokio::main]
/// async fn main() {
///     let cache: AsyncCache<String, u64> =
///         AsyncCache::new(CacheConfig::ttl(Duration::from_secs(300)));
///
///     cache.insert("total_members:0".to_string(), 1150).await;
///     assert_eq!(cache.get(&"total_members:0".to_string()).await, Some(1150));
/// }
/// ```
pub struct AsyncCache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    storage: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    config: CacheConfig,
    counters: Counters,
    clock: C,
}

impl<K, V> AsyncCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates a cache backed by the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> AsyncCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Creates a cache that reads time from `clock`.
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
            config,
            counters: Counters::default(),
            clock,
        }
    }

    /// Configured time-to-live, if any
    pub const fn ttl(&self) -> Option<Duration> {
        self.config.ttl
    }

    /// Stores `value`, replacing any previous entry and restarting its TTL.
    pub async fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
            computed_at: self.clock.system_time(),
        };
        self.storage.write().await.insert(key, entry);
        self.counters.bump(Counter::Insert);
    }

    /// Returns the value for `key` if a live entry exists.
    pub async fn get(&self, key: &K) -> Option<V> {
        self.get_entry(key).await.map(|entry| entry.value)
    }

    /// Returns the live entry for `key` with its timestamps.
    ///
    /// An expired entry is removed and counted as both an expiration and a
    /// miss.
    pub async fn get_entry(&self, key: &K) -> Option<CachedValue<V>> {
        let now = self.clock.now();
        let mut storage = self.storage.write().await;

        let Some(entry) = storage.get(key) else {
            self.counters.bump(Counter::Miss);
            return None;
        };

        let age = now.saturating_duration_since(entry.stored_at);
        if self.config.is_expired(age) {
            storage.remove(key);
            self.counters.bump(Counter::Expiration);
            self.counters.bump(Counter::Miss);
            return None;
        }

        self.counters.bump(Counter::Hit);
        Some(CachedValue { value: entry.value.clone(), computed_at: entry.computed_at, age })
    }

    /// Removes and returns the stored value, live or not.
    pub async fn remove(&self, key: &K) -> Option<V> {
        self.storage.write().await.remove(key).map(|entry| entry.value)
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.storage.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.storage.read().await.is_empty()
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        self.storage.write().await.clear();
    }

    /// Drops expired entries and returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut storage = self.storage.write().await;
        let before = storage.len();

        storage.retain(|_, entry| !self.config.is_expired(now.saturating_duration_since(entry.stored_at)));

        let removed = before - storage.len();
        self.counters.add(Counter::Expiration, removed as u64);
        removed
    }

    /// Current counters.
    ///
    /// Uses a non-blocking read; size reports 0 while a writer holds the
    /// lock.
    pub fn stats(&self) -> CacheStats {
        let size = self.storage.try_read().map(|s| s.len()).unwrap_or(0);
        self.counters.read(size)
    }
}

impl<K, V, C> Clone for AsyncCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config,
            counters: self.counters.clone(),
            clock: self.clock.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::async_core.
    use std::time::Duration;

    use super::*;
    use crate::resilience::MockClock;

    fn ttl_cache(ttl_secs: u64) -> (AsyncCache<String, u64, MockClock>, MockClock) {
        let clock = MockClock::new();
        let cache =
            AsyncCache::with_clock(CacheConfig::ttl(Duration::from_secs(ttl_secs)), clock.clone());
        (cache, clock)
    }

    /// Validates `AsyncCache::insert` behavior for the basic insert and get
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms `cache.get(&"a".to_string()).await` equals `Some(1)`.
    /// - Confirms `cache.get(&"missing".to_string()).await` equals `None`.
    #[tokio::test]
    async fn test_basic_insert_and_get() {
        let (cache, _clock) = ttl_cache(60);

        cache.insert("a".to_string(), 1).await;

        assert_eq!(cache.get(&"a".to_string()).await, Some(1));
        assert_eq!(cache.get(&"missing".to_string()).await, None);
    }

    /// Validates `AsyncCache::get` behavior at the TTL boundary.
    ///
    /// Assertions:
    /// - Confirms the entry is served one millisecond before the TTL.
    /// - Confirms the entry is gone once its age equals the TTL.
    /// - Confirms the expiration and miss were counted.
    #[tokio::test]
    async fn test_entry_expires_when_age_reaches_ttl() {
        let (cache, clock) = ttl_cache(300);
        cache.insert("events:0".to_string(), 12).await;

        clock.advance(Duration::from_millis(299_999));
        assert_eq!(cache.get(&"events:0".to_string()).await, Some(12));

        clock.advance_millis(1);
        assert_eq!(cache.get(&"events:0".to_string()).await, None);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.size, 0);
    }

    /// Validates `AsyncCache::insert` behavior for the overwrite restarts TTL
    /// scenario.
    ///
    /// Assertions:
    /// - Confirms a recomputed value replaces the old one and gets a fresh
    ///   TTL.
    #[tokio::test]
    async fn test_overwrite_restarts_ttl() {
        let (cache, clock) = ttl_cache(10);
        cache.insert("k".to_string(), 1).await;

        clock.advance(Duration::from_secs(9));
        cache.insert("k".to_string(), 2).await;
        clock.advance(Duration::from_secs(9));

        assert_eq!(cache.get(&"k".to_string()).await, Some(2));
    }

    /// Validates `AsyncCache::get_entry` behavior for the timestamps scenario.
    ///
    /// Assertions:
    /// - Confirms `computed_at` is the wall time at insert.
    /// - Confirms `age` reflects elapsed mock time.
    #[tokio::test]
    async fn test_get_entry_reports_timestamps() {
        let clock = MockClock::at_unix_secs(1_000);
        let cache: AsyncCache<&'static str, u64, MockClock> =
            AsyncCache::with_clock(CacheConfig::ttl(Duration::from_secs(60)), clock.clone());

        cache.insert("k", 5).await;
        clock.advance(Duration::from_secs(4));

        let entry = cache.get_entry(&"k").await.expect("live entry");
        assert_eq!(entry.value, 5);
        assert_eq!(entry.computed_at, SystemTime::UNIX_EPOCH + Duration::from_secs(1_000));
        assert_eq!(entry.age, Duration::from_secs(4));
    }

    /// Validates `AsyncCache::purge_expired` behavior.
    ///
    /// Assertions:
    /// - Confirms only expired entries are removed.
    #[tokio::test]
    async fn test_purge_expired() {
        let (cache, clock) = ttl_cache(60);
        cache.insert("old".to_string(), 1).await;
        clock.advance(Duration::from_secs(30));
        cache.insert("new".to_string(), 2).await;
        clock.advance(Duration::from_secs(31));

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(&"new".to_string()).await, Some(2));
    }

    /// Validates `AsyncCache::clear` behavior.
    ///
    /// Assertions:
    /// - Ensures `cache.is_empty().await` evaluates to true after clear.
    /// - Confirms clones observe the clear.
    #[tokio::test]
    async fn test_clear_is_shared_with_clones() {
        let (cache, _clock) = ttl_cache(60);
        let clone = cache.clone();
        cache.insert("a".to_string(), 1).await;
        cache.insert("b".to_string(), 2).await;

        clone.clear().await;

        assert!(cache.is_empty().await);
        assert_eq!(cache.remove(&"a".to_string()).await, None);
    }
}
