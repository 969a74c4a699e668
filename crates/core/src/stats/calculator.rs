//! Metric calculator: one metric, a TTL cache, and its fallback chain.
//!
//! A lookup returns a live cache entry when there is one. Otherwise the
//! metric's tiers run in order, each bounded by the call timeout, and the
//! first success is cached and returned. When every tier fails the reading
//! is the zero default with [`ReadingSource::Unavailable`]; defaults are
//! never cached, so the next lookup retries the chain.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use interconnect_common::cache::{AsyncCache, CacheConfig, CacheStats};
use interconnect_common::resilience::{first_success, with_timeout, SharedClock, SystemClock};
use interconnect_domain::{
    InterconnectError, MetricKind, MetricReading, ReadingSource, Result, StatsConfig,
};
use tracing::{debug, warn};

use super::metrics::MetricDefinition;
use super::period::MonthWindow;
use super::plan::{CountTier, TierContext};
use super::schema_resolver::SchemaResolver;
use crate::gateway_ports::DataGateway;

/// Parameters of one lookup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MetricParams {
    /// 0 = current month, -1 = previous month
    pub month_offset: i32,
}

impl MetricParams {
    pub const fn current() -> Self {
        Self { month_offset: 0 }
    }

    pub const fn month(offset: i32) -> Self {
        Self { month_offset: offset }
    }
}

/// Dependencies and settings shared by every calculator
#[derive(Clone)]
pub struct CalculatorContext {
    pub gateway: Arc<dyn DataGateway>,
    pub resolver: Arc<SchemaResolver>,
    pub clock: SharedClock,
    pub cache_ttl: Duration,
    pub call_timeout: Duration,
    pub current_user: Option<String>,
}

impl CalculatorContext {
    /// Context over `gateway` using the timing settings from `config`
    pub fn new(gateway: Arc<dyn DataGateway>, config: &StatsConfig) -> Self {
        let resolver = Arc::new(SchemaResolver::new(Arc::clone(&gateway), config.call_timeout()));
        Self {
            gateway,
            resolver,
            clock: Arc::new(SystemClock),
            cache_ttl: config.cache_ttl(),
            call_timeout: config.call_timeout(),
            current_user: config.current_user_id.clone(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }
}

/// Computes one metric
pub struct MetricCalculator {
    definition: MetricDefinition,
    context: CalculatorContext,
    cache: AsyncCache<String, u64, SharedClock>,
}

impl MetricCalculator {
    pub fn new(definition: MetricDefinition, context: CalculatorContext) -> Self {
        let cache =
            AsyncCache::with_clock(CacheConfig::ttl(context.cache_ttl), Arc::clone(&context.clock));
        Self { definition, context, cache }
    }

    pub const fn kind(&self) -> MetricKind {
        self.definition.kind
    }

    pub const fn definition(&self) -> &MetricDefinition {
        &self.definition
    }

    /// Metric value; the zero default when no tier answered.
    pub async fn get_value(&self, params: MetricParams) -> u64 {
        self.read(params).await.value
    }

    /// Metric value together with where it came from.
    pub async fn read(&self, params: MetricParams) -> MetricReading {
        let kind = self.definition.kind;
        let key = cache_key(kind, params);

        if let Some(value) = self.cache.get(&key).await {
            debug!(metric = %kind, value, "metric cache hit");
            return MetricReading { kind, value, source: ReadingSource::Cache };
        }

        let now: DateTime<Utc> = self.context.clock.system_time().into();
        let tier_ctx = TierContext {
            month: MonthWindow::around(now, params.month_offset),
            current_user: self.context.current_user.as_deref(),
        };
        let tier_ctx = &tier_ctx;

        let outcome = first_success(&self.definition.tiers, move |index, tier| {
            self.run_tier(index, tier, tier_ctx)
        })
        .await;

        match outcome {
            Ok(success) => {
                self.cache.insert(key, success.value).await;
                MetricReading { kind, value: success.value, source: ReadingSource::Tier(success.tier) }
            }
            Err(exhausted) => {
                warn!(
                    metric = %kind,
                    tiers = exhausted.failures.len(),
                    error = %exhausted,
                    "metric unavailable, reporting default"
                );
                MetricReading::unavailable(kind)
            }
        }
    }

    /// Drop every cached value.
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    async fn run_tier(&self, index: usize, tier: &CountTier, ctx: &TierContext<'_>) -> Result<u64> {
        let result = self.count_tier(tier, ctx).await;
        match &result {
            Ok(count) => {
                debug!(metric = %self.definition.kind, tier = tier.label, index, count, "metric tier answered");
            }
            Err(err) => match TierFailure::classify(err) {
                TierFailure::SchemaDifference => {
                    debug!(
                        metric = %self.definition.kind,
                        tier = tier.label,
                        index,
                        error = %err,
                        "metric tier does not fit this schema"
                    );
                }
                failure => {
                    warn!(
                        metric = %self.definition.kind,
                        tier = tier.label,
                        index,
                        error_kind = err.kind(),
                        transient = failure == TierFailure::Transient,
                        error = %err,
                        "metric tier failed"
                    );
                }
            },
        }
        result
    }

    async fn count_tier(&self, tier: &CountTier, ctx: &TierContext<'_>) -> Result<u64> {
        let query = tier.build_query(&self.context.resolver, ctx).await?;
        with_timeout(tier.label, self.context.call_timeout, self.context.gateway.fetch_count(&query))
            .await
            .map_err(|err| InterconnectError::Timeout(err.to_string()))?
    }
}

/// Reporting class of a failed tier
///
/// A missing table or column is an expected difference between deployments
/// and is logged at debug. Network failures and timeouts are transient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TierFailure {
    SchemaDifference,
    Transient,
    Other,
}

impl TierFailure {
    const fn classify(err: &InterconnectError) -> Self {
        if err.is_schema_mismatch() {
            Self::SchemaDifference
        } else if err.is_transient() {
            Self::Transient
        } else {
            Self::Other
        }
    }
}

fn cache_key(kind: MetricKind, params: MetricParams) -> String {
    format!("{kind}:{}", params.month_offset)
}
