//! # Interconnect Core
//!
//! Dashboard statistics logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces for the remote data gateway and snapshot storage
//! - Schema probing, metric calculation and aggregation services
//!
//! ## Architecture Principles
//! - Only depends on `interconnect-common` and `interconnect-domain`
//! - No HTTP or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod stats;

// Infrastructure ports
pub mod gateway_ports;
pub mod snapshot_ports;

pub use gateway_ports::{DataGateway, DataGatewayExt, Filter, Order, Query, QueryBuilder};
pub use snapshot_ports::{GatewaySnapshotStore, SnapshotStore};
pub use stats::{
    CalculatorContext, FieldResolution, MetricCalculator, MetricDefinition, MetricParams,
    SchemaResolver, StatsAggregator,
};
