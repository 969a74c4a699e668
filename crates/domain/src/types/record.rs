//! Gateway row representation

/// One row of a remote collection: a string-keyed map of JSON values
pub type Record = serde_json::Map<String, serde_json::Value>;
