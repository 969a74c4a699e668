//! Error types used throughout the statistics layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Interconnect
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum InterconnectError {
    /// The remote data gateway rejected or failed a request
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// A queried collection or field does not exist
    #[error("Schema mismatch: {collection}.{field} not found")]
    SchemaMismatch { collection: String, field: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// Writing a snapshot failed
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl InterconnectError {
    /// Build a schema mismatch for `collection.field`
    pub fn schema_mismatch(collection: impl Into<String>, field: impl Into<String>) -> Self {
        Self::SchemaMismatch { collection: collection.into(), field: field.into() }
    }

    /// The collection or field shape differs from what the query assumed
    pub const fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::SchemaMismatch { .. })
    }

    /// Connectivity problems that may clear up on a later attempt
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// Short variant name, used as a structured logging field
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Gateway(_) => "gateway",
            Self::SchemaMismatch { .. } => "schema_mismatch",
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Persistence(_) => "persistence",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for Interconnect operations
pub type Result<T> = std::result::Result<T, InterconnectError>;
