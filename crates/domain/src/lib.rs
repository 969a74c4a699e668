//! # Interconnect Domain
//!
//! Business domain types for the dashboard statistics layer.
//!
//! This crate contains:
//! - Statistics types (`StatisticsSnapshot`, `MetricKind`, `MetricReading`)
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Collection names and candidate field lists
//!
//! ## Architecture
//! - No dependencies on other Interconnect crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
