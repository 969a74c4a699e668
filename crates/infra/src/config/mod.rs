//! Configuration loading
//!
//! Loads [`AppConfig`](interconnect_domain::AppConfig) from environment
//! variables or TOML/JSON files.

pub mod loader;

pub use loader::{load, load_from_env, load_from_file, find_config_path};
