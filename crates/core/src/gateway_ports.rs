//! Remote data gateway port.
//!
//! The statistics services only need filtered selects, counts and upserts
//! against named collections. Adapters (PostgREST over HTTP, in-memory
//! fixtures) live in `interconnect-infra`.
//!
//! # Example
//!
//! ```no_run
//! use interconnect_core::{DataGateway, DataGatewayExt};
//!
//! async fn unread(gateway: &dyn DataGateway, user: &str) -> interconnect_domain::Result<u64> {
//!     gateway
//!         .query("messages")
//!         .filter_equals("recipient_id", user)
//!         .filter_equals("is_read", false)
//!         .fetch_count()
//!         .await
//! }
//! ```

use async_trait::async_trait;
use interconnect_domain::{Record, Result};
use serde_json::Value;

/// One narrowing condition on a field
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Gte(String, Value),
    Lte(String, Value),
    In(String, Vec<Value>),
    IsNull(String),
}

impl Filter {
    /// Field the filter applies to
    pub fn field(&self) -> &str {
        match self {
            Self::Eq(field, _)
            | Self::Gte(field, _)
            | Self::Lte(field, _)
            | Self::In(field, _)
            | Self::IsNull(field) => field,
        }
    }
}

/// Sort order for row fetches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub ascending: bool,
}

/// A select or count against one collection
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self { collection: collection.into(), filters: Vec::new(), order: None, limit: None }
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order { field: field.into(), ascending });
        self
    }

    #[must_use]
    pub const fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// Port for the remote row store.
///
/// Every failure, whether the backend raised or answered with an error
/// payload, comes back as `Err`. Callers treat all errors alike.
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Rows matching `query`, honoring its order and limit.
    async fn fetch_rows(&self, query: &Query) -> Result<Vec<Record>>;

    /// Number of rows matching `query`'s filters.
    async fn fetch_count(&self, query: &Query) -> Result<u64>;

    /// Insert `record`, or update the existing row it collides with.
    async fn insert_or_update(&self, collection: &str, record: Record) -> Result<()>;
}

/// Chainable query construction bound to a gateway
pub struct QueryBuilder<'a, G: ?Sized> {
    gateway: &'a G,
    query: Query,
}

impl<'a, G: DataGateway + ?Sized> QueryBuilder<'a, G> {
    #[must_use]
    pub fn filter_equals(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter::Eq(field.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn filter_greater_or_equal(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter::Gte(field.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn filter_less_or_equal(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.query.filters.push(Filter::Lte(field.to_string(), value.into()));
        self
    }

    #[must_use]
    pub fn filter_in<V: Into<Value>>(
        mut self,
        field: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.query.filters.push(Filter::In(field.to_string(), values));
        self
    }

    #[must_use]
    pub fn filter_is_null(mut self, field: &str) -> Self {
        self.query.filters.push(Filter::IsNull(field.to_string()));
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.query.filters.push(filter);
        self
    }

    #[must_use]
    pub fn order_by(mut self, field: &str, ascending: bool) -> Self {
        self.query = self.query.order_by(field, ascending);
        self
    }

    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.query = self.query.limit(n);
        self
    }

    /// The query built so far
    pub const fn as_query(&self) -> &Query {
        &self.query
    }

    pub async fn fetch_rows(self) -> Result<Vec<Record>> {
        self.gateway.fetch_rows(&self.query).await
    }

    pub async fn fetch_count(self) -> Result<u64> {
        self.gateway.fetch_count(&self.query).await
    }
}

/// Entry point for [`QueryBuilder`] on any gateway
pub trait DataGatewayExt: DataGateway {
    fn query(&self, collection: &str) -> QueryBuilder<'_, Self> {
        QueryBuilder { gateway: self, query: Query::new(collection) }
    }
}

impl<G: DataGateway + ?Sized> DataGatewayExt for G {}
