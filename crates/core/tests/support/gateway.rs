//! Scripted `DataGateway` mock.
//!
//! Count answers are scripted per collection, optionally narrowed to queries
//! that filter on a given field. Sample rows feed the schema resolver. Every
//! call is recorded for assertions.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use interconnect_core::{DataGateway, Query};
use interconnect_domain::{InterconnectError, Record, Result};
use parking_lot::Mutex;
use serde_json::Value;

/// Scripted answer to a count query
#[derive(Debug, Clone)]
pub enum Scripted {
    Count(u64),
    Fail(InterconnectError),
    /// Sleeps before answering; pair with paused tokio time
    Slow(Duration, u64),
}

#[derive(Debug, Clone)]
struct CountRule {
    collection: String,
    field: Option<String>,
    answer: Scripted,
}

#[derive(Default)]
pub struct ScriptedGateway {
    samples: Mutex<HashMap<String, Vec<Record>>>,
    rules: Mutex<Vec<CountRule>>,
    count_queries: Mutex<Vec<Query>>,
    row_queries: Mutex<Vec<Query>>,
    writes: Mutex<Vec<(String, Record)>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample row returned for `collection` row fetches
    #[must_use]
    pub fn with_sample(self, collection: &str, row: Value) -> Self {
        let row = row.as_object().cloned().unwrap_or_default();
        self.samples.lock().entry(collection.to_string()).or_default().push(row);
        self
    }

    /// Answer every count on `collection`
    #[must_use]
    pub fn on_count(self, collection: &str, answer: Scripted) -> Self {
        self.rules.lock().push(CountRule { collection: collection.to_string(), field: None, answer });
        self
    }

    /// Answer counts on `collection` that filter on `field`
    #[must_use]
    pub fn on_count_with(self, collection: &str, field: &str, answer: Scripted) -> Self {
        self.rules.lock().push(CountRule {
            collection: collection.to_string(),
            field: Some(field.to_string()),
            answer,
        });
        self
    }

    /// Replace every rule for `collection` with a single answer
    pub fn set_count(&self, collection: &str, answer: Scripted) {
        let mut rules = self.rules.lock();
        rules.retain(|rule| rule.collection != collection);
        rules.push(CountRule { collection: collection.to_string(), field: None, answer });
    }

    pub fn count_queries(&self) -> Vec<Query> {
        self.count_queries.lock().clone()
    }

    pub fn count_calls(&self, collection: &str) -> usize {
        self.count_queries.lock().iter().filter(|q| q.collection == collection).count()
    }

    pub fn row_calls(&self, collection: &str) -> usize {
        self.row_queries.lock().iter().filter(|q| q.collection == collection).count()
    }

    pub fn writes(&self) -> Vec<(String, Record)> {
        self.writes.lock().clone()
    }

    fn answer_for(&self, query: &Query) -> Option<Scripted> {
        self.rules
            .lock()
            .iter()
            .find(|rule| {
                rule.collection == query.collection
                    && rule
                        .field
                        .as_ref()
                        .map_or(true, |field| query.filters.iter().any(|f| f.field() == field))
            })
            .map(|rule| rule.answer.clone())
    }
}

#[async_trait]
impl DataGateway for ScriptedGateway {
    async fn fetch_rows(&self, query: &Query) -> Result<Vec<Record>> {
        self.row_queries.lock().push(query.clone());
        let rows = self.samples.lock().get(&query.collection).cloned();
        rows.ok_or_else(|| InterconnectError::schema_mismatch(query.collection.clone(), "*"))
    }

    async fn fetch_count(&self, query: &Query) -> Result<u64> {
        self.count_queries.lock().push(query.clone());
        match self.answer_for(query) {
            Some(Scripted::Count(n)) => Ok(n),
            Some(Scripted::Fail(err)) => Err(err),
            Some(Scripted::Slow(delay, n)) => {
                tokio::time::sleep(delay).await;
                Ok(n)
            }
            None => Err(InterconnectError::schema_mismatch(query.collection.clone(), "*")),
        }
    }

    async fn insert_or_update(&self, collection: &str, record: Record) -> Result<()> {
        self.writes.lock().push((collection.to_string(), record));
        Ok(())
    }
}
