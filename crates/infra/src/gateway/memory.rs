//! In-memory [`DataGateway`].
//!
//! Collections of JSON records evaluated in process. Used by the binary in
//! `memory` mode (seeded from a fixture file) and by tests.
//!
//! Value comparison: numbers numerically, strings lexicographically (which
//! orders ISO-8601 timestamps correctly), booleans `false < true`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use async_trait::async_trait;
use interconnect_core::{DataGateway, Filter, Query};
use interconnect_domain::{InterconnectError, Record, Result};
use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, info};

use crate::errors::InfraError;

/// Gateway operation, for call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOp {
    FetchRows,
    FetchCount,
    InsertOrUpdate,
}

#[derive(Default)]
struct CallCounters {
    fetch_rows: AtomicUsize,
    fetch_count: AtomicUsize,
    insert_or_update: AtomicUsize,
}

impl CallCounters {
    fn counter(&self, op: GatewayOp) -> &AtomicUsize {
        match op {
            GatewayOp::FetchRows => &self.fetch_rows,
            GatewayOp::FetchCount => &self.fetch_count,
            GatewayOp::InsertOrUpdate => &self.insert_or_update,
        }
    }
}

/// In-process collections implementing [`DataGateway`]
#[derive(Default)]
pub struct MemoryGateway {
    collections: RwLock<HashMap<String, Vec<Record>>>,
    failures: RwLock<HashMap<String, InterconnectError>>,
    calls: CallCounters,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `collection` with `rows`
    #[must_use]
    pub fn with_collection(self, collection: &str, rows: Vec<Record>) -> Self {
        self.collections.write().insert(collection.to_string(), rows);
        self
    }

    /// Gateway seeded from `{"collection": [rows...]}`.
    ///
    /// # Errors
    ///
    /// `Config` when the value is not an object of arrays of objects.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(collections) = value else {
            return Err(InterconnectError::Config("fixture must be a JSON object".into()));
        };

        let gateway = Self::new();
        for (name, rows) in collections {
            let Value::Array(rows) = rows else {
                return Err(InterconnectError::Config(format!("fixture collection {name} is not an array")));
            };
            let records = rows
                .into_iter()
                .map(|row| match row {
                    Value::Object(record) => Ok(record),
                    _ => Err(InterconnectError::Config(format!("fixture row in {name} is not an object"))),
                })
                .collect::<Result<Vec<_>>>()?;
            gateway.collections.write().insert(name, records);
        }
        Ok(gateway)
    }

    /// Gateway seeded from a JSON fixture file.
    ///
    /// # Errors
    ///
    /// `Config` when the file cannot be read or has the wrong shape.
    pub fn from_fixture_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|err| {
            InterconnectError::Config(format!("cannot read fixture {}: {err}", path.display()))
        })?;
        let value: Value =
            serde_json::from_str(&contents).map_err(|err| InterconnectError::from(InfraError::from(err)))?;
        let gateway = Self::from_value(value)?;
        info!(path = %path.display(), collections = gateway.collection_names().len(), "loaded gateway fixture");
        Ok(gateway)
    }

    /// Make every operation on `collection` fail with `error`
    pub fn inject_failure(&self, collection: &str, error: InterconnectError) {
        self.failures.write().insert(collection.to_string(), error);
    }

    pub fn clear_failures(&self) {
        self.failures.write().clear();
    }

    /// Number of calls made for `op`
    pub fn calls(&self, op: GatewayOp) -> usize {
        self.calls.counter(op).load(AtomicOrdering::SeqCst)
    }

    /// Current rows of `collection`
    pub fn rows(&self, collection: &str) -> Vec<Record> {
        self.collections.read().get(collection).cloned().unwrap_or_default()
    }

    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn begin(&self, op: GatewayOp, collection: &str) -> Result<()> {
        self.calls.counter(op).fetch_add(1, AtomicOrdering::SeqCst);
        match self.failures.read().get(collection) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn select(&self, query: &Query) -> Result<Vec<Record>> {
        let collections = self.collections.read();
        let rows = collections
            .get(&query.collection)
            .ok_or_else(|| InterconnectError::schema_mismatch(query.collection.clone(), "*"))?;

        if !rows.is_empty() {
            let fields = query
                .filters
                .iter()
                .map(Filter::field)
                .chain(query.order.as_ref().map(|order| order.field.as_str()));
            for field in fields {
                if !rows.iter().any(|row| row.contains_key(field)) {
                    return Err(InterconnectError::schema_mismatch(query.collection.clone(), field));
                }
            }
        }

        let mut matched: Vec<Record> =
            rows.iter().filter(|row| query.filters.iter().all(|f| matches(row, f))).cloned().collect();

        if let Some(order) = &query.order {
            matched.sort_by(|a, b| {
                let ordering = compare_optional(a.get(&order.field), b.get(&order.field));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }
        if let Some(limit) = query.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }
}

#[async_trait]
impl DataGateway for MemoryGateway {
    async fn fetch_rows(&self, query: &Query) -> Result<Vec<Record>> {
        self.begin(GatewayOp::FetchRows, &query.collection)?;
        self.select(query)
    }

    async fn fetch_count(&self, query: &Query) -> Result<u64> {
        self.begin(GatewayOp::FetchCount, &query.collection)?;
        let count = self.select(&Query { order: None, limit: None, ..query.clone() })?.len();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    async fn insert_or_update(&self, collection: &str, record: Record) -> Result<()> {
        self.begin(GatewayOp::InsertOrUpdate, collection)?;
        let mut collections = self.collections.write();
        let rows = collections.entry(collection.to_string()).or_default();

        let existing = record
            .get("id")
            .and_then(|id| rows.iter_mut().find(|row| row.get("id") == Some(id)));
        match existing {
            Some(row) => {
                for (key, value) in record {
                    row.insert(key, value);
                }
                debug!(collection, "updated row");
            }
            None => {
                rows.push(record);
                debug!(collection, "inserted row");
            }
        }
        Ok(())
    }
}

fn matches(row: &Record, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(field, expected) => {
            row.get(field).is_some_and(|value| compare(value, expected) == Some(Ordering::Equal))
        }
        Filter::Gte(field, bound) => row
            .get(field)
            .and_then(|value| compare(value, bound))
            .is_some_and(|ordering| ordering != Ordering::Less),
        Filter::Lte(field, bound) => row
            .get(field)
            .and_then(|value| compare(value, bound))
            .is_some_and(|ordering| ordering != Ordering::Greater),
        Filter::In(field, options) => row.get(field).is_some_and(|value| {
            options.iter().any(|option| compare(value, option) == Some(Ordering::Equal))
        }),
        Filter::IsNull(field) => row.get(field).map_or(true, Value::is_null),
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Total order for sorting; missing and incomparable values sort first
fn compare_optional(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use interconnect_core::DataGatewayExt;
    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    fn rows(value: Value) -> Vec<Record> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row.as_object().cloned().unwrap())
            .collect()
    }

    fn events() -> MemoryGateway {
        MemoryGateway::new().with_collection(
            "events",
            rows(json!([
                {"id": 1, "event_date": "2025-02-27", "status": "done", "seats": 10},
                {"id": 2, "event_date": "2025-03-01", "status": "open", "seats": 4},
                {"id": 3, "event_date": "2025-03-31T18:00:00Z", "status": "open", "seats": null},
                {"id": 4, "event_date": "2025-04-01", "status": "draft"}
            ])),
        )
    }

    #[tokio::test]
    async fn counts_with_date_range() {
        let gateway = events();

        let count = gateway
            .query("events")
            .filter_greater_or_equal("event_date", "2025-03-01")
            .filter_less_or_equal("event_date", "2025-03-31T23:59:59.999Z")
            .fetch_count()
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(gateway.calls(GatewayOp::FetchCount), 1);
    }

    #[tokio::test]
    async fn in_eq_and_null_filters() {
        let gateway = events();

        assert_eq!(gateway.query("events").filter_in("status", ["open", "done"]).fetch_count().await.unwrap(), 3);
        assert_eq!(gateway.query("events").filter_equals("seats", 4.0).fetch_count().await.unwrap(), 1);
        assert_eq!(gateway.query("events").filter_is_null("seats").fetch_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn order_and_limit() {
        let gateway = events();

        let latest = gateway.query("events").order_by("event_date", false).limit(1).fetch_rows().await.unwrap();

        assert_eq!(latest[0]["id"], json!(4));
    }

    #[tokio::test]
    async fn unknown_collection_and_field_are_schema_mismatches() {
        let gateway = events();

        let err = gateway.query("matchings").fetch_count().await.unwrap_err();
        assert_eq!(err, InterconnectError::schema_mismatch("matchings", "*"));

        let err = gateway.query("events").filter_equals("start_date", "x").fetch_count().await.unwrap_err();
        assert_eq!(err, InterconnectError::schema_mismatch("events", "start_date"));
    }

    #[tokio::test]
    async fn empty_collection_accepts_any_field() {
        let gateway = MemoryGateway::new().with_collection("messages", vec![]);
        assert_eq!(gateway.query("messages").filter_equals("to_user_id", "u").fetch_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn upsert_merges_by_id() {
        let gateway = events();
        let patch = json!({"id": 2, "status": "closed"}).as_object().cloned().unwrap();
        let fresh = json!({"total_members": 3}).as_object().cloned().unwrap();

        gateway.insert_or_update("events", patch).await.unwrap();
        gateway.insert_or_update("dashboard_stats", fresh).await.unwrap();

        let updated = gateway.query("events").filter_equals("id", 2).fetch_rows().await.unwrap();
        assert_eq!(updated[0]["status"], json!("closed"));
        assert_eq!(updated[0]["seats"], json!(4));
        assert_eq!(gateway.rows("dashboard_stats").len(), 1);
        assert_eq!(gateway.calls(GatewayOp::InsertOrUpdate), 2);
    }

    #[tokio::test]
    async fn injected_failures() {
        let gateway = events();
        gateway.inject_failure("events", InterconnectError::Network("reset".into()));

        assert!(gateway.query("events").fetch_rows().await.unwrap_err().is_transient());

        gateway.clear_failures();
        assert_eq!(gateway.query("events").fetch_rows().await.unwrap().len(), 4);
        assert_eq!(gateway.calls(GatewayOp::FetchRows), 2);
    }

    #[test]
    fn loads_fixture_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"profiles": [{"id": "a"}, {"id": "b"}], "events": []}"#).unwrap();

        let gateway = MemoryGateway::from_fixture_file(file.path()).unwrap();

        assert_eq!(gateway.collection_names(), vec!["events".to_string(), "profiles".to_string()]);
        assert_eq!(gateway.rows("profiles").len(), 2);
    }

    #[test]
    fn rejects_malformed_fixture() {
        let err = MemoryGateway::from_value(json!({"profiles": {"id": 1}})).err().unwrap();
        assert!(matches!(err, InterconnectError::Config(_)));
    }
}
