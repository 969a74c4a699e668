//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use interconnect_domain::{GatewayKind, InterconnectError};
use interconnect_infra::{build_gateway, config};
use tempfile::{NamedTempFile, TempDir};

fn write_config(contents: &str, extension: &str) -> PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[test]
fn test_load_full_toml_config() {
    let path = write_config(
        r#"
[gateway]
kind = "postgrest"
base_url = "https://project.example.co"
api_key = "anon-key"
request_timeout_secs = 20
max_attempts = 5

[stats]
cache_ttl_secs = 600
call_timeout_secs = 2
current_user_id = "user-42"
snapshot_collection = "stats_history"
refresh_interval_secs = 0
"#,
        "toml",
    );

    let config = config::load_from_file(Some(path.clone())).expect("config loads");
    std::fs::remove_file(path).ok();

    assert_eq!(config.gateway.kind, GatewayKind::Postgrest);
    assert_eq!(config.gateway.request_timeout(), Duration::from_secs(20));
    assert_eq!(config.gateway.max_attempts, 5);
    assert_eq!(config.stats.cache_ttl(), Duration::from_secs(600));
    assert_eq!(config.stats.call_timeout(), Duration::from_secs(2));
    assert_eq!(config.stats.current_user_id.as_deref(), Some("user-42"));
    assert_eq!(config.stats.snapshot_collection, "stats_history");
    assert_eq!(config.stats.refresh_interval(), None);

    assert!(build_gateway(&config.gateway).is_ok());
}

#[test]
fn test_memory_config_builds_gateway_from_fixture() {
    let dir = TempDir::new().expect("temp dir");
    let fixture = dir.path().join("seed.json");
    std::fs::write(&fixture, r#"{"profiles": []}"#).expect("write fixture");

    let path = write_config(
        &format!(
            r#"{{"gateway": {{"kind": "memory", "fixture_path": {}}}}}"#,
            serde_json::to_string(&fixture).expect("path serializes")
        ),
        "json",
    );

    let config = config::load_from_file(Some(path.clone())).expect("config loads");
    std::fs::remove_file(path).ok();

    assert_eq!(config.gateway.kind, GatewayKind::Memory);
    assert!(build_gateway(&config.gateway).is_ok());
}

#[test]
fn test_unknown_gateway_kind_is_config_error() {
    let path = write_config(r#"{"gateway": {"kind": "sqlite"}}"#, "json");

    let result = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    assert!(matches!(result, Err(InterconnectError::Config(_))));
}

#[test]
fn test_missing_fixture_is_config_error() {
    let path = write_config(
        r#"{"gateway": {"kind": "memory", "fixture_path": "/nonexistent/seed.json"}}"#,
        "json",
    );

    let config = config::load_from_file(Some(path.clone())).expect("config loads");
    std::fs::remove_file(path).ok();

    assert!(matches!(build_gateway(&config.gateway), Err(InterconnectError::Config(_))));
}
