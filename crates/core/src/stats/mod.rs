//! Dashboard statistics services
//!
//! - [`SchemaResolver`]: discovers which candidate column a collection uses
//! - [`MetricCalculator`]: one metric behind a TTL cache and a fallback chain
//! - [`StatsAggregator`]: all metrics, deltas against the last snapshot,
//!   persistence

pub mod aggregator;
pub mod calculator;
pub mod delta;
pub mod metrics;
pub mod period;
pub mod plan;
pub mod schema_resolver;

pub use aggregator::StatsAggregator;
pub use calculator::{CalculatorContext, MetricCalculator, MetricParams};
pub use delta::change_percent;
pub use metrics::{standard_catalogue, MetricDefinition};
pub use period::MonthWindow;
pub use plan::{Clause, Condition, CountTier, FieldOption, TierContext, ValueSpec};
pub use schema_resolver::{FieldResolution, SchemaResolver};
