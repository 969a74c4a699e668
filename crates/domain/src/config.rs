//! Configuration structures
//!
//! Every field has a default so partial TOML/JSON files and partial
//! environments load cleanly.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_REFRESH_INTERVAL_SECS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SNAPSHOT_COLLECTION,
};
use crate::impl_keyword_conversions;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub stats: StatsConfig,
}

/// Which data gateway adapter to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    /// PostgREST-compatible HTTP endpoint
    #[default]
    Postgrest,
    /// In-process collections seeded from a JSON fixture
    Memory,
}

impl_keyword_conversions!(GatewayKind {
    Postgrest => "postgrest",
    Memory => "memory",
});

/// Remote data gateway settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub kind: GatewayKind,
    /// Project URL; the REST root is `{base_url}/rest/v1`
    pub base_url: String,
    pub api_key: Option<String>,
    /// Seed file for the in-memory gateway
    pub fixture_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub max_attempts: u32,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            kind: GatewayKind::Postgrest,
            base_url: String::new(),
            api_key: None,
            fixture_path: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl GatewayConfig {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Statistics aggregation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// How long a computed metric value is reused
    pub cache_ttl_secs: u64,
    /// Deadline for each individual gateway call
    pub call_timeout_secs: u64,
    /// Recipient used by the unread-messages metric
    pub current_user_id: Option<String>,
    pub snapshot_collection: String,
    /// Refresh period for the background refresher (0 = run once)
    pub refresh_interval_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            call_timeout_secs: DEFAULT_CALL_TIMEOUT_SECS,
            current_user_id: None,
            snapshot_collection: DEFAULT_SNAPSHOT_COLLECTION.to_string(),
            refresh_interval_secs: DEFAULT_REFRESH_INTERVAL_SECS,
        }
    }
}

impl StatsConfig {
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub const fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    /// `None` when the refresher should run a single cycle
    pub const fn refresh_interval(&self) -> Option<Duration> {
        if self.refresh_interval_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.refresh_interval_secs))
        }
    }
}
