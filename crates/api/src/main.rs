//! Interconnect dashboard statistics - command line entry point
//!
//! `interconnect-stats [--once]`
//!
//! Prints one snapshot as pretty JSON with `--once` (or when the refresh
//! interval is 0), otherwise prints a snapshot per refresh until Ctrl-C.

use anyhow::Context as _;
use interconnect_app::utils::logging::{init_tracing, json_requested, log_snapshot};
use interconnect_app::AppContext;
use interconnect_domain::StatisticsSnapshot;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env before logging so RUST_LOG from it applies
    let dotenv = dotenvy::dotenv();
    init_tracing(json_requested())?;
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "no .env loaded"),
    }

    let once = std::env::args().skip(1).any(|arg| arg == "--once");

    let ctx = AppContext::new().context("failed to initialise application context")?;

    let Some(mut refresher) = ctx.refresher().filter(|_| !once) else {
        let snapshot = ctx.snapshot_once().await;
        log_snapshot(&snapshot);
        print_snapshot(&snapshot)?;
        return Ok(());
    };

    let mut updates = refresher.subscribe();
    refresher.start().await?;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let latest = updates.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    log_snapshot(&snapshot);
                    print_snapshot(&snapshot)?;
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                info!("interrupt received, stopping");
                break;
            }
        }
    }

    refresher.stop().await?;
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_snapshot(snapshot: &StatisticsSnapshot) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(snapshot)?);
    Ok(())
}
