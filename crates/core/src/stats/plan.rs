//! Fallback tiers as data.
//!
//! A metric is an ordered list of [`CountTier`]s. Each tier counts rows of
//! one collection under a set of [`Clause`]s. A clause lists one or more
//! field options; with several options the schema resolver picks the first
//! one present in the collection, and the tier fails with a schema mismatch
//! when none is.

use interconnect_domain::{InterconnectError, Result};
use serde_json::Value;

use super::period::MonthWindow;
use super::schema_resolver::{FieldResolution, SchemaResolver};
use crate::gateway_ports::{Filter, Query};

/// Right-hand side of an equality
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSpec {
    Literal(Value),
    /// The configured current user id
    CurrentUser,
}

/// What a clause requires of its field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Equals(ValueSpec),
    In(Vec<Value>),
    IsNull,
    /// Inside the requested calendar month (inclusive)
    WithinMonth,
}

impl Condition {
    pub fn equals(value: impl Into<Value>) -> Self {
        Self::Equals(ValueSpec::Literal(value.into()))
    }

    pub fn one_of<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::In(values.into_iter().map(Into::into).collect())
    }
}

/// One way of expressing a clause: a field and the condition on it
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOption {
    pub field: String,
    pub condition: Condition,
}

/// A filter whose field may need to be discovered
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    options: Vec<FieldOption>,
}

impl Clause {
    /// Fixed field, used as-is without probing
    pub fn on(field: &str, condition: Condition) -> Self {
        Self { options: vec![FieldOption { field: field.to_string(), condition }] }
    }

    /// Same condition on the first of `fields` present in the collection
    pub fn first_present(fields: &[&str], condition: &Condition) -> Self {
        Self {
            options: fields
                .iter()
                .map(|field| FieldOption { field: (*field).to_string(), condition: condition.clone() })
                .collect(),
        }
    }

    /// Per-field conditions; the first option whose field is present wins
    pub fn first_of(options: Vec<FieldOption>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &[FieldOption] {
        &self.options
    }
}

/// Inputs that vary per calculation
#[derive(Debug, Clone)]
pub struct TierContext<'a> {
    pub month: MonthWindow,
    pub current_user: Option<&'a str>,
}

/// One count query in a metric's fallback chain
#[derive(Debug, Clone, PartialEq)]
pub struct CountTier {
    /// Short name for logs
    pub label: &'static str,
    pub collection: &'static str,
    pub clauses: Vec<Clause>,
}

impl CountTier {
    pub const fn new(label: &'static str, collection: &'static str) -> Self {
        Self { label, collection, clauses: Vec::new() }
    }

    #[must_use]
    pub fn with(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Concrete count query for this tier.
    ///
    /// # Errors
    ///
    /// - `SchemaMismatch` when a multi-option clause has no field present
    /// - `InvalidInput` when a clause needs the current user and none is set
    pub async fn build_query(&self, resolver: &SchemaResolver, ctx: &TierContext<'_>) -> Result<Query> {
        let mut query = Query::new(self.collection);

        for clause in &self.clauses {
            let option = self.pick_option(resolver, clause).await?;
            for filter in to_filters(option, ctx)? {
                query = query.filter(filter);
            }
        }

        Ok(query)
    }

    async fn pick_option<'c>(
        &self,
        resolver: &SchemaResolver,
        clause: &'c Clause,
    ) -> Result<&'c FieldOption> {
        match clause.options.as_slice() {
            [] => Err(InterconnectError::Internal(format!("empty clause in tier {}", self.label))),
            [only] => Ok(only),
            options => {
                let candidates: Vec<&str> = options.iter().map(|o| o.field.as_str()).collect();
                match resolver.resolve_field(self.collection, &candidates).await {
                    FieldResolution::Resolved(field) => options
                        .iter()
                        .find(|o| o.field == field)
                        .ok_or_else(|| InterconnectError::schema_mismatch(self.collection, field)),
                    FieldResolution::Unresolved => Err(InterconnectError::schema_mismatch(
                        self.collection,
                        candidates.join("|"),
                    )),
                }
            }
        }
    }
}

fn to_filters(option: &FieldOption, ctx: &TierContext<'_>) -> Result<Vec<Filter>> {
    let field = option.field.clone();
    let filters = match &option.condition {
        Condition::Equals(ValueSpec::Literal(value)) => vec![Filter::Eq(field, value.clone())],
        Condition::Equals(ValueSpec::CurrentUser) => {
            let user = ctx.current_user.ok_or_else(|| {
                InterconnectError::InvalidInput(format!("{field} requires a current user"))
            })?;
            vec![Filter::Eq(field, Value::from(user))]
        }
        Condition::In(values) => vec![Filter::In(field, values.clone())],
        Condition::IsNull => vec![Filter::IsNull(field)],
        Condition::WithinMonth => vec![
            Filter::Gte(field.clone(), Value::from(ctx.month.start_bound())),
            Filter::Lte(field, Value::from(ctx.month.end_bound())),
        ],
    };
    Ok(filters)
}
