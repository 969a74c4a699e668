//! Cache statistics for diagnostics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Point-in-time counters for one cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently stored, expired ones included until purged
    pub size: usize,
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Inserts, overwrites included
    pub inserts: u64,
    /// Entries dropped because their TTL ran out
    pub expirations: u64,
}

impl CacheStats {
    /// Hits over lookups; 0.0 before the first lookup
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }

    pub const fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Counters shared by every clone of a cache
#[derive(Debug, Clone, Default)]
pub(crate) struct Counters(Arc<[AtomicU64; 4]>);

#[derive(Debug, Clone, Copy)]
pub(crate) enum Counter {
    Hit = 0,
    Miss = 1,
    Insert = 2,
    Expiration = 3,
}

impl Counters {
    pub(crate) fn bump(&self, counter: Counter) {
        self.add(counter, 1);
    }

    pub(crate) fn add(&self, counter: Counter, n: u64) {
        self.0[counter as usize].fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn read(&self, size: usize) -> CacheStats {
        let load = |counter: Counter| self.0[counter as usize].load(Ordering::Relaxed);
        CacheStats {
            size,
            hits: load(Counter::Hit),
            misses: load(Counter::Miss),
            inserts: load(Counter::Insert),
            expirations: load(Counter::Expiration),
        }
    }
}
