//! Snapshot persistence port.
//!
//! Each aggregation writes its snapshot, and the next one reads the most
//! recent row back as the baseline for change percentages.
//!
//! Older `dashboard_stats` tables only have `updated_at` and the basic
//! count columns. The store orders by whichever timestamp column exists and
//! falls back to the legacy column set when a write names unknown columns.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use interconnect_domain::constants::{
    DEFAULT_CALL_TIMEOUT_SECS, DEFAULT_SNAPSHOT_COLLECTION, LEGACY_SNAPSHOT_COLUMNS,
    SNAPSHOT_ORDER_CANDIDATES,
};
use interconnect_domain::{InterconnectError, Record, Result, SnapshotBaseline, StatisticsSnapshot};
use serde_json::Value;
use tracing::debug;

use crate::gateway_ports::{DataGateway, DataGatewayExt};
use crate::stats::schema_resolver::{FieldResolution, SchemaResolver};

/// Port for storing and reading back statistics snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Most recent snapshot, or `None` when nothing was stored yet.
    async fn load_latest(&self) -> Result<Option<SnapshotBaseline>>;

    /// Store `snapshot` as the newest one.
    async fn save(&self, snapshot: &StatisticsSnapshot) -> Result<()>;
}

/// [`SnapshotStore`] over a collection of the data gateway
pub struct GatewaySnapshotStore {
    gateway: Arc<dyn DataGateway>,
    resolver: Arc<SchemaResolver>,
    collection: String,
}

impl GatewaySnapshotStore {
    pub fn new(gateway: Arc<dyn DataGateway>, collection: impl Into<String>) -> Self {
        let resolver = Arc::new(SchemaResolver::new(
            Arc::clone(&gateway),
            Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        ));
        Self { gateway, resolver, collection: collection.into() }
    }

    /// Store over the default `dashboard_stats` collection
    pub fn with_default_collection(gateway: Arc<dyn DataGateway>) -> Self {
        Self::new(gateway, DEFAULT_SNAPSHOT_COLLECTION)
    }

    /// Share the calculators' resolver so one sample serves both
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<SchemaResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    async fn write(&self, record: Record) -> Result<()> {
        self.gateway
            .insert_or_update(&self.collection, record)
            .await
            .map_err(|err| InterconnectError::Persistence(err.to_string()))
    }
}

#[async_trait]
impl SnapshotStore for GatewaySnapshotStore {
    async fn load_latest(&self) -> Result<Option<SnapshotBaseline>> {
        let mut query = self.gateway.query(&self.collection).limit(1);
        match self.resolver.resolve_field(&self.collection, SNAPSHOT_ORDER_CANDIDATES).await {
            FieldResolution::Resolved(field) => query = query.order_by(&field, false),
            FieldResolution::Unresolved => {
                debug!(collection = %self.collection, "no snapshot timestamp column, reading any row");
            }
        }

        let Some(row) = query.fetch_rows().await?.into_iter().next() else {
            return Ok(None);
        };

        serde_json::from_value(Value::Object(row)).map(Some).map_err(|err| {
            InterconnectError::Persistence(format!("undecodable {} row: {err}", self.collection))
        })
    }

    async fn save(&self, snapshot: &StatisticsSnapshot) -> Result<()> {
        let record = snapshot_record(snapshot).ok_or_else(|| {
            InterconnectError::Internal("snapshot row did not serialize to an object".into())
        })?;

        match self.gateway.insert_or_update(&self.collection, record.clone()).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_schema_mismatch() => {
                debug!(
                    collection = %self.collection,
                    error = %err,
                    "snapshot columns missing, writing the legacy column set"
                );
                self.write(legacy_record(record)).await
            }
            Err(err) => Err(InterconnectError::Persistence(err.to_string())),
        }
    }
}

/// Convert a snapshot into the record written by [`GatewaySnapshotStore`]
pub fn snapshot_record(snapshot: &StatisticsSnapshot) -> Option<Record> {
    match serde_json::to_value(snapshot.to_row()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn legacy_record(record: Record) -> Record {
    record.into_iter().filter(|(column, _)| LEGACY_SNAPSHOT_COLUMNS.contains(&column.as_str())).collect()
}
