//! Application context - dependency injection container

use std::sync::Arc;

use interconnect_core::{CalculatorContext, DataGateway, GatewaySnapshotStore, StatsAggregator};
use interconnect_domain::{AppConfig, Result, StatisticsSnapshot};
use interconnect_infra::scheduling::{StatsRefresher, StatsRefresherConfig};
use interconnect_infra::{build_gateway, config};
use tracing::info;

/// Application context - holds configuration and wired services
pub struct AppContext {
    pub config: AppConfig,
    pub gateway: Arc<dyn DataGateway>,
    pub aggregator: StatsAggregator,
}

impl AppContext {
    /// Create a context from the environment or the first config file found
    ///
    /// # Errors
    ///
    /// `Config` when no usable configuration is found or the gateway cannot
    /// be built from it.
    pub fn new() -> Result<Self> {
        Self::new_with_config(config::load()?)
    }

    /// Create a context from an explicit configuration
    ///
    /// # Errors
    ///
    /// `Config` when the gateway cannot be built from `config`.
    pub fn new_with_config(config: AppConfig) -> Result<Self> {
        let gateway = build_gateway(&config.gateway)?;

        let calculators = CalculatorContext::new(Arc::clone(&gateway), &config.stats);
        let store = Arc::new(
            GatewaySnapshotStore::new(Arc::clone(&gateway), config.stats.snapshot_collection.clone())
                .with_resolver(Arc::clone(&calculators.resolver)),
        );
        let aggregator = StatsAggregator::new(calculators, store);

        info!(
            gateway = %config.gateway.kind,
            snapshot_collection = %config.stats.snapshot_collection,
            cache_ttl_secs = config.stats.cache_ttl_secs,
            has_user = config.stats.current_user_id.is_some(),
            "application context ready"
        );

        Ok(Self { config, gateway, aggregator })
    }

    /// Run one aggregation cycle
    pub async fn snapshot_once(&self) -> StatisticsSnapshot {
        self.aggregator.aggregate().await
    }

    /// Refresher over this context's aggregator, or `None` when the
    /// configured interval is 0
    pub fn refresher(&self) -> Option<StatsRefresher> {
        self.config.stats.refresh_interval().map(|interval| {
            StatsRefresher::new(
                self.aggregator.clone(),
                StatsRefresherConfig { interval, ..StatsRefresherConfig::default() },
            )
        })
    }
}
