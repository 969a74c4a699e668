//! TTL cache with hit/miss statistics
//!
//! - **Async**: `tokio::sync::RwLock` storage shared by clones
//! - **TTL**: an entry is served only while younger than the configured TTL
//! - **Testable**: time comes from a [`Clock`](crate::resilience::Clock)
//!
//! ```
//! use std::time::Duration;
//!
//! use interconnect_common::cache::{AsyncCache, CacheConfig};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let cache: AsyncCache<String, u64> = AsyncCache::new(CacheConfig::ttl(Duration::from_secs(300)));
//! cache.insert("unread_messages:0".to_string(), 3).await;
//!
//! let stats = cache.stats();
//! assert_eq!(stats.inserts, 1);
//! # }
//! ```

mod async_core;
mod config;
mod stats;

pub use async_core::{AsyncCache, CachedValue};
pub use config::CacheConfig;
pub use stats::CacheStats;
