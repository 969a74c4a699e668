//! Stats aggregator - combines every metric into one snapshot

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::future::{join_all, BoxFuture, FutureExt, Shared};
use interconnect_common::cache::CacheStats;
use interconnect_common::resilience::SharedClock;
use interconnect_domain::{MetricKind, MetricReading, SnapshotBaseline, StatisticsSnapshot};
use parking_lot::Mutex;
use tracing::{error, info, instrument, warn};

use super::calculator::{CalculatorContext, MetricCalculator, MetricParams};
use super::delta::change_percent;
use super::metrics::{standard_catalogue, MetricDefinition};
use super::schema_resolver::SchemaResolver;
use crate::snapshot_ports::SnapshotStore;

type CycleFuture = Shared<BoxFuture<'static, StatisticsSnapshot>>;

/// Aggregation service producing [`StatisticsSnapshot`]s
///
/// Clones share calculators, caches and the in-flight cycle.
#[derive(Clone)]
pub struct StatsAggregator {
    inner: Arc<AggregatorInner>,
}

struct AggregatorInner {
    calculators: Vec<MetricCalculator>,
    store: Arc<dyn SnapshotStore>,
    resolver: Arc<SchemaResolver>,
    clock: SharedClock,
    in_flight: Mutex<Option<CycleFuture>>,
}

impl StatsAggregator {
    /// Aggregator over the built-in metric catalogue
    pub fn new(context: CalculatorContext, store: Arc<dyn SnapshotStore>) -> Self {
        Self::with_definitions(standard_catalogue(), context, store)
    }

    /// Aggregator over custom metric definitions
    ///
    /// Metrics missing from `definitions` report 0 and are listed as
    /// unavailable.
    pub fn with_definitions(
        definitions: Vec<MetricDefinition>,
        context: CalculatorContext,
        store: Arc<dyn SnapshotStore>,
    ) -> Self {
        let resolver = Arc::clone(&context.resolver);
        let clock = Arc::clone(&context.clock);
        let calculators = definitions
            .into_iter()
            .map(|definition| MetricCalculator::new(definition, context.clone()))
            .collect();

        Self {
            inner: Arc::new(AggregatorInner {
                calculators,
                store,
                resolver,
                clock,
                in_flight: Mutex::new(None),
            }),
        }
    }

    /// Compute, persist and return a snapshot.
    ///
    /// Never fails. A call made while a cycle is running waits for that
    /// cycle and receives its snapshot instead of starting another.
    ///
    /// The cycle runs on its own task, so it finishes and frees the
    /// in-flight slot even when every caller stops waiting for it.
    pub async fn aggregate(&self) -> StatisticsSnapshot {
        let cycle = {
            let mut slot = self.inner.in_flight.lock();
            match slot.as_ref() {
                Some(running) => running.clone(),
                None => {
                    let cycle = self.spawn_cycle();
                    *slot = Some(cycle.clone());
                    cycle
                }
            }
        };

        cycle.await
    }

    fn spawn_cycle(&self) -> CycleFuture {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let _slot = InFlightSlot(Arc::clone(&inner));
            inner.run_cycle().await
        });

        let inner = Arc::clone(&self.inner);
        async move {
            match task.await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    error!(error = %err, "aggregation task failed");
                    inner.build_snapshot(&[], None, inner.clock.system_time().into())
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Whether a cycle is currently running
    pub fn is_aggregating(&self) -> bool {
        self.inner.in_flight.lock().is_some()
    }

    /// Read one metric through its calculator
    pub async fn read_metric(&self, kind: MetricKind, params: MetricParams) -> MetricReading {
        match self.inner.calculator(kind) {
            Some(calculator) => calculator.read(params).await,
            None => MetricReading::unavailable(kind),
        }
    }

    /// Drop cached metric values and schema samples.
    pub async fn clear_caches(&self) {
        for calculator in &self.inner.calculators {
            calculator.clear_cache().await;
        }
        self.inner.resolver.clear();
    }

    /// Cache statistics per metric
    pub fn cache_stats(&self) -> Vec<(MetricKind, CacheStats)> {
        self.inner.calculators.iter().map(|c| (c.kind(), c.cache_stats())).collect()
    }
}

impl AggregatorInner {
    fn calculator(&self, kind: MetricKind) -> Option<&MetricCalculator> {
        self.calculators.iter().find(|c| c.kind() == kind)
    }

    #[instrument(skip(self))]
    async fn run_cycle(&self) -> StatisticsSnapshot {
        let started = Instant::now();
        let params = MetricParams::current();

        let (baseline, readings) = tokio::join!(
            self.load_baseline(),
            join_all(self.calculators.iter().map(|calculator| calculator.read(params)))
        );

        let captured_at: DateTime<Utc> = self.clock.system_time().into();
        let snapshot = self.build_snapshot(&readings, baseline.as_ref(), captured_at);

        let persisted = snapshot.carried_forward(baseline.as_ref());
        if let Err(err) = self.store.save(&persisted).await {
            warn!(error_kind = err.kind(), error = %err, "failed to persist statistics snapshot");
        }

        info!(
            duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            unavailable = snapshot.unavailable_metrics.len(),
            has_baseline = baseline.is_some(),
            "statistics aggregated"
        );
        snapshot
    }

    async fn load_baseline(&self) -> Option<SnapshotBaseline> {
        match self.store.load_latest().await {
            Ok(baseline) => baseline,
            Err(err) => {
                warn!(error_kind = err.kind(), error = %err, "baseline read failed, deltas default to 0");
                None
            }
        }
    }

    fn build_snapshot(
        &self,
        readings: &[MetricReading],
        baseline: Option<&SnapshotBaseline>,
        captured_at: DateTime<Utc>,
    ) -> StatisticsSnapshot {
        let value = |kind: MetricKind| {
            readings.iter().find(|r| r.kind == kind).map_or(0, |r| r.value)
        };
        let unavailable_metrics: Vec<MetricKind> = MetricKind::ALL
            .into_iter()
            .filter(|kind| !readings.iter().any(|r| r.kind == *kind && r.is_available()))
            .collect();

        // an unavailable metric has no current value to compare
        let change = |kind: MetricKind| match baseline {
            Some(baseline) if !unavailable_metrics.contains(&kind) => {
                change_percent(baseline.count(kind), value(kind), self.inverts(kind))
            }
            _ => 0.0,
        };

        StatisticsSnapshot {
            total_members: value(MetricKind::TotalMembers),
            total_members_change_percent: change(MetricKind::TotalMembers),
            monthly_events: value(MetricKind::MonthlyEvents),
            monthly_events_change_percent: change(MetricKind::MonthlyEvents),
            matching_success_count: value(MetricKind::MatchingSuccess),
            matching_success_change_percent: change(MetricKind::MatchingSuccess),
            unread_messages: value(MetricKind::UnreadMessages),
            unread_messages_change_percent: change(MetricKind::UnreadMessages),
            new_members_this_month: value(MetricKind::NewMembers),
            unavailable_metrics,
            baseline_captured_at: baseline.and_then(|b| b.captured_at),
            captured_at,
        }
    }

    fn inverts(&self, kind: MetricKind) -> bool {
        self.calculator(kind).is_some_and(|c| c.definition().invert_delta_sign)
    }
}

/// Empties the in-flight slot when a cycle ends, including on panic
struct InFlightSlot(Arc<AggregatorInner>);

impl Drop for InFlightSlot {
    fn drop(&mut self) {
        let finished = self.0.in_flight.lock().take();
        drop(finished);
    }
}
