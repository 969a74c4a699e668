//! # Interconnect App
//!
//! Wiring layer and entry point for the `interconnect-stats` binary.
//!
//! This crate contains:
//! - Application context (configuration, gateway, aggregator)
//! - Logging setup
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Builds the adapter selected by configuration and hands it to the core
//!   services

pub mod context;
pub mod utils;

// Re-export for convenience
pub use context::*;
