//! Schema resolver.
//!
//! Deployments name the same column differently (`event_date` vs
//! `start_date` vs `date`). The resolver samples one row of a collection and
//! picks the first candidate that is present as a key.
//!
//! Sampled key sets are kept for the resolver's lifetime so a collection is
//! sampled at most once per process. Failed or empty samples are not kept;
//! the next call samples again.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use interconnect_common::resilience::with_timeout;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::gateway_ports::{DataGateway, Query};

/// Outcome of resolving a field name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResolution {
    /// The named candidate is present in the collection
    Resolved(String),
    /// No sample was available, or no candidate was present
    Unresolved,
}

impl FieldResolution {
    /// Resolved field name, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Resolved(field) => Some(field),
            Self::Unresolved => None,
        }
    }
}

/// Detects which candidate field names exist in a collection
pub struct SchemaResolver {
    gateway: Arc<dyn DataGateway>,
    call_timeout: Duration,
    sampled: RwLock<HashMap<String, BTreeSet<String>>>,
}

impl SchemaResolver {
    pub fn new(gateway: Arc<dyn DataGateway>, call_timeout: Duration) -> Self {
        Self { gateway, call_timeout, sampled: RwLock::new(HashMap::new()) }
    }

    /// First candidate, in the given order, present in `collection`.
    ///
    /// Never fails: read errors, timeouts and empty collections all yield
    /// [`FieldResolution::Unresolved`].
    pub async fn resolve_field(&self, collection: &str, candidates: &[&str]) -> FieldResolution {
        let Some(keys) = self.sample_keys(collection).await else {
            return FieldResolution::Unresolved;
        };

        let resolution = candidates
            .iter()
            .find(|candidate| keys.contains(**candidate))
            .map_or(FieldResolution::Unresolved, |field| {
                FieldResolution::Resolved((*field).to_string())
            });

        debug!(collection, ?candidates, ?resolution, "schema field resolved");
        resolution
    }

    /// Drop the cached sample for one collection.
    pub fn forget(&self, collection: &str) {
        self.sampled.write().remove(collection);
    }

    /// Drop every cached sample.
    pub fn clear(&self) {
        self.sampled.write().clear();
    }

    /// Collections with a cached sample
    pub fn sampled_collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sampled.read().keys().cloned().collect();
        names.sort();
        names
    }

    async fn sample_keys(&self, collection: &str) -> Option<BTreeSet<String>> {
        if let Some(keys) = self.sampled.read().get(collection) {
            return Some(keys.clone());
        }

        let query = Query::new(collection).limit(1);
        let rows = match with_timeout("schema_sample", self.call_timeout, self.gateway.fetch_rows(&query))
            .await
        {
            Ok(Ok(rows)) => rows,
            Ok(Err(err)) => {
                warn!(collection, error = %err, "schema sample failed");
                return None;
            }
            Err(err) => {
                warn!(collection, error = %err, "schema sample timed out");
                return None;
            }
        };

        let keys: BTreeSet<String> = rows.into_iter().next()?.into_iter().map(|(k, _)| k).collect();
        self.sampled.write().insert(collection.to_string(), keys.clone());
        Some(keys)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use interconnect_domain::{InterconnectError, Record, Result};
    use serde_json::json;

    use super::*;

    struct SampleGateway {
        sample: Result<Vec<Record>>,
        calls: AtomicUsize,
    }

    impl SampleGateway {
        fn new(sample: Result<Vec<Record>>) -> Arc<Self> {
            Arc::new(Self { sample, calls: AtomicUsize::new(0) })
        }
    }

    #[async_trait]
    impl DataGateway for SampleGateway {
        async fn fetch_rows(&self, query: &Query) -> Result<Vec<Record>> {
            assert_eq!(query.limit, Some(1));
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.sample.clone()
        }

        async fn fetch_count(&self, _query: &Query) -> Result<u64> {
            Ok(0)
        }

        async fn insert_or_update(&self, _collection: &str, _record: Record) -> Result<()> {
            Ok(())
        }
    }

    fn row(value: serde_json::Value) -> Record {
        value.as_object().cloned().unwrap_or_default()
    }

    const EVENT_CANDIDATES: &[&str] = &["event_date", "start_date", "date"];

    #[tokio::test]
    async fn test_resolves_first_present_candidate() {
        let gateway = SampleGateway::new(Ok(vec![row(json!({"id": 1, "start_date": "2025-01-01"}))]));
        let resolver = SchemaResolver::new(gateway, Duration::from_secs(5));

        let resolution = resolver.resolve_field("events", EVENT_CANDIDATES).await;

        assert_eq!(resolution, FieldResolution::Resolved("start_date".to_string()));
        assert_eq!(resolution.field(), Some("start_date"));
    }

    #[tokio::test]
    async fn test_candidate_priority_wins_over_key_order() {
        let gateway = SampleGateway::new(Ok(vec![row(json!({"date": "x", "event_date": "y"}))]));
        let resolver = SchemaResolver::new(gateway, Duration::from_secs(5));

        assert_eq!(
            resolver.resolve_field("events", EVENT_CANDIDATES).await,
            FieldResolution::Resolved("event_date".to_string())
        );
    }

    #[tokio::test]
    async fn test_no_candidate_present() {
        let gateway = SampleGateway::new(Ok(vec![row(json!({"id": 1, "created_at": "x"}))]));
        let resolver = SchemaResolver::new(gateway, Duration::from_secs(5));

        assert_eq!(resolver.resolve_field("events", EVENT_CANDIDATES).await, FieldResolution::Unresolved);
    }

    #[tokio::test]
    async fn test_read_error_is_unresolved_and_not_cached() {
        let gateway = SampleGateway::new(Err(InterconnectError::Network("reset".into())));
        let resolver = SchemaResolver::new(gateway.clone(), Duration::from_secs(5));

        assert_eq!(resolver.resolve_field("events", EVENT_CANDIDATES).await, FieldResolution::Unresolved);
        assert_eq!(resolver.resolve_field("events", EVENT_CANDIDATES).await, FieldResolution::Unresolved);

        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);
        assert!(resolver.sampled_collections().is_empty());
    }

    #[tokio::test]
    async fn test_empty_collection_is_unresolved() {
        let gateway = SampleGateway::new(Ok(vec![]));
        let resolver = SchemaResolver::new(gateway, Duration::from_secs(5));

        assert_eq!(resolver.resolve_field("events", EVENT_CANDIDATES).await, FieldResolution::Unresolved);
    }

    #[tokio::test]
    async fn test_sample_reused_until_forgotten() {
        let gateway = SampleGateway::new(Ok(vec![row(json!({"recipient_id": "u1", "is_read": false}))]));
        let resolver = SchemaResolver::new(gateway.clone(), Duration::from_secs(5));

        resolver.resolve_field("messages", &["recipient_id", "to_user_id"]).await;
        resolver.resolve_field("messages", &["is_read", "read_at"]).await;
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.sampled_collections(), vec!["messages".to_string()]);

        resolver.forget("messages");
        resolver.resolve_field("messages", &["recipient_id"]).await;
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 2);

        resolver.clear();
        assert!(resolver.sampled_collections().is_empty());
    }
}
