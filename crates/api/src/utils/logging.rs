//! Logging setup and snapshot log helpers

use interconnect_domain::StatisticsSnapshot;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Environment switch for JSON log lines
pub const LOG_JSON_ENV: &str = "INTERCONNECT_LOG_JSON";

/// Install the global tracing subscriber.
///
/// Level comes from `RUST_LOG` (default `info`). Output goes to stderr so
/// stdout only carries snapshots. Load `.env` first or `RUST_LOG` from it is
/// ignored.
///
/// # Errors
///
/// Fails when a global subscriber is already installed.
pub fn init_tracing(json: bool) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true);

    let registry = Registry::default().with(env_filter);
    let result = if json {
        registry.with(fmt_layer.json().flatten_event(true)).try_init()
    } else {
        registry.with(fmt_layer).try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {e}"))
}

/// Whether `INTERCONNECT_LOG_JSON` asks for JSON output
pub fn json_requested() -> bool {
    std::env::var(LOG_JSON_ENV)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// Log the headline numbers of a snapshot.
#[inline]
pub fn log_snapshot(snapshot: &StatisticsSnapshot) {
    info!(
        total_members = snapshot.total_members,
        new_members = snapshot.new_members_this_month,
        monthly_events = snapshot.monthly_events,
        matching_success = snapshot.matching_success_count,
        unread_messages = snapshot.unread_messages,
        "snapshot_ready"
    );
    if !snapshot.unavailable_metrics.is_empty() {
        let unavailable: Vec<&str> = snapshot.unavailable_metrics.iter().map(|kind| kind.as_str()).collect();
        warn!(?unavailable, "snapshot_has_unavailable_metrics");
    }
}
