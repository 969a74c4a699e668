//! Integration tests for AppContext lifecycle
//!
//! Builds the context from a memory-gateway configuration, runs a cycle
//! directly and through the refresher.

use std::path::Path;

use interconnect_app::AppContext;
use interconnect_domain::{AppConfig, GatewayConfig, GatewayKind, InterconnectError, StatsConfig};
use tempfile::TempDir;

const SEED: &str = r#"{
    "profiles": [
        {"id": "p1", "created_at": "2020-01-01T00:00:00Z"},
        {"id": "p2", "created_at": "2020-02-01T00:00:00Z"}
    ],
    "messages": [
        {"id": 1, "to_user_id": "user-1", "is_read": false},
        {"id": 2, "to_user_id": "user-1", "is_read": true}
    ]
}"#;

fn memory_config(fixture: &Path, refresh_interval_secs: u64) -> AppConfig {
    AppConfig {
        gateway: GatewayConfig {
            kind: GatewayKind::Memory,
            fixture_path: Some(fixture.to_path_buf()),
            ..GatewayConfig::default()
        },
        stats: StatsConfig {
            current_user_id: Some("user-1".into()),
            refresh_interval_secs,
            ..StatsConfig::default()
        },
    }
}

fn seeded_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("seed.json"), SEED).expect("write fixture");
    dir
}

#[tokio::test]
async fn test_snapshot_once() {
    let dir = seeded_dir();
    let ctx = AppContext::new_with_config(memory_config(&dir.path().join("seed.json"), 0))
        .expect("context builds");

    let snapshot = ctx.snapshot_once().await;

    assert_eq!(snapshot.total_members, 2);
    assert_eq!(snapshot.unread_messages, 1);
    assert!(ctx.refresher().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_refresher_publishes_snapshots() {
    let dir = seeded_dir();
    let ctx = AppContext::new_with_config(memory_config(&dir.path().join("seed.json"), 30))
        .expect("context builds");

    let mut refresher = ctx.refresher().expect("interval configured");
    let mut updates = refresher.subscribe();
    refresher.start().await.expect("refresher starts");

    updates.changed().await.expect("first snapshot");
    let snapshot = refresher.latest().expect("snapshot published");
    assert_eq!(snapshot.total_members, 2);

    refresher.stop().await.expect("refresher stops");
    assert!(!refresher.is_running());
}

#[test]
fn test_missing_fixture_fails_to_build() {
    let dir = TempDir::new().expect("temp dir");
    let result = AppContext::new_with_config(memory_config(&dir.path().join("absent.json"), 0));

    assert!(matches!(result, Err(InterconnectError::Config(_))));
}
