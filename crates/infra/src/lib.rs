//! # Interconnect Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Data gateway adapters (PostgREST over HTTP, in-memory fixtures)
//! - HTTP client with retry and backoff
//! - Configuration loading (environment, TOML, JSON)
//! - Background statistics refresh
//!
//! ## Architecture
//! - Implements traits defined in `interconnect-core`
//! - Contains all "impure" code (network, filesystem, spawned tasks)

pub mod config;
pub mod errors;
pub mod gateway;
pub mod http;
pub mod scheduling;

// Re-export commonly used items
pub use errors::InfraError;
pub use gateway::{build_gateway, MemoryGateway, PostgrestGateway};
pub use http::{HttpClient, HttpClientBuilder};
pub use scheduling::{SchedulerError, StatsRefresher, StatsRefresherConfig};
