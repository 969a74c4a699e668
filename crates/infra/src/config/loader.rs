//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If the gateway is not configured there, falls back to a file
//! 3. Searches multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `INTERCONNECT_GATEWAY_KIND`: `postgrest` (default) or `memory`
//! - `INTERCONNECT_GATEWAY_URL`: Project URL (required for `postgrest`)
//! - `INTERCONNECT_GATEWAY_KEY`: API key sent as `apikey` and bearer token
//! - `INTERCONNECT_FIXTURE_PATH`: Seed file (required for `memory`)
//! - `INTERCONNECT_CACHE_TTL`: Metric cache TTL in seconds
//! - `INTERCONNECT_CALL_TIMEOUT`: Per-call deadline in seconds
//! - `INTERCONNECT_USER_ID`: Recipient for the unread-messages metric
//! - `INTERCONNECT_REFRESH_INTERVAL`: Refresh period in seconds (0 = once)
//! - `INTERCONNECT_SNAPSHOT_COLLECTION`: Collection storing snapshots
//!
//! ## File Locations
//! The loader searches the following paths (in order):
//! 1. `./interconnect.{toml,json}` then `./config.{toml,json}`
//! 2. The same names in the parent and grandparent directories
//! 3. The same names next to the executable

use std::path::{Path, PathBuf};
use std::str::FromStr;

use interconnect_domain::{AppConfig, GatewayKind, InterconnectError, Result};

const CONFIG_FILE_NAMES: &[&str] =
    &["interconnect.toml", "interconnect.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `InterconnectError::Config` if configuration cannot be loaded
/// from either source or a value is invalid.
pub fn load() -> Result<AppConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!(kind = %config.gateway.kind, "configuration loaded from environment");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The gateway must be fully described (URL for `postgrest`, fixture path
/// for `memory`); every other setting falls back to its default.
///
/// # Errors
/// Returns `InterconnectError::Config` when the gateway variables are
/// missing or a value does not parse.
pub fn load_from_env() -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(kind) = env_opt("INTERCONNECT_GATEWAY_KIND") {
        config.gateway.kind = parse_value("INTERCONNECT_GATEWAY_KIND", &kind)?;
    }
    match config.gateway.kind {
        GatewayKind::Postgrest => {
            config.gateway.base_url = env_var("INTERCONNECT_GATEWAY_URL")?;
            config.gateway.api_key = env_opt("INTERCONNECT_GATEWAY_KEY");
        }
        GatewayKind::Memory => {
            config.gateway.fixture_path = Some(PathBuf::from(env_var("INTERCONNECT_FIXTURE_PATH")?));
        }
    }

    if let Some(ttl) = env_opt("INTERCONNECT_CACHE_TTL") {
        config.stats.cache_ttl_secs = parse_value("INTERCONNECT_CACHE_TTL", &ttl)?;
    }
    if let Some(timeout) = env_opt("INTERCONNECT_CALL_TIMEOUT") {
        config.stats.call_timeout_secs = parse_value("INTERCONNECT_CALL_TIMEOUT", &timeout)?;
    }
    if let Some(interval) = env_opt("INTERCONNECT_REFRESH_INTERVAL") {
        config.stats.refresh_interval_secs = parse_value("INTERCONNECT_REFRESH_INTERVAL", &interval)?;
    }
    if let Some(collection) = env_opt("INTERCONNECT_SNAPSHOT_COLLECTION") {
        config.stats.snapshot_collection = collection;
    }
    config.stats.current_user_id = env_opt("INTERCONNECT_USER_ID");

    validate(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, searches the standard locations (see
/// [`find_config_path`]). Format is detected by file extension.
///
/// # Errors
/// Returns `InterconnectError::Config` if the file is missing, unreadable
/// or malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(InterconnectError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => find_config_path().ok_or_else(|| {
            InterconnectError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| InterconnectError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration by extension (`.toml` or `.json`)
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    let config = match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| InterconnectError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| InterconnectError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(InterconnectError::Config(format!("Unsupported config format: {extension}"))),
    }?;

    validate(config)
}

/// Reject settings that would make every call fail
fn validate(config: AppConfig) -> Result<AppConfig> {
    if config.stats.call_timeout_secs == 0 {
        return Err(InterconnectError::Config("call_timeout_secs must be at least 1".into()));
    }
    if config.gateway.request_timeout_secs == 0 {
        return Err(InterconnectError::Config("request_timeout_secs must be at least 1".into()));
    }
    Ok(config)
}

/// First existing config file among the standard locations
pub fn find_config_path() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| CONFIG_FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        InterconnectError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Set and non-blank variable
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| InterconnectError::Config(format!("Invalid {key}: {e}")))
}
