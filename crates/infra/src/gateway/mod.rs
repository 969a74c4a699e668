//! [`DataGateway`] adapters
//!
//! - [`PostgrestGateway`]: PostgREST-compatible HTTP endpoint
//! - [`MemoryGateway`]: in-process collections seeded from a fixture

pub mod memory;
pub mod postgrest;

use std::sync::Arc;

use interconnect_core::DataGateway;
use interconnect_domain::{GatewayConfig, GatewayKind, InterconnectError, Result};
use tracing::info;

pub use memory::{GatewayOp, MemoryGateway};
pub use postgrest::PostgrestGateway;

/// Build the adapter selected by `config.kind`
///
/// # Errors
///
/// `Config` when the selected adapter is missing its settings (base URL or
/// fixture path) or they are invalid.
pub fn build_gateway(config: &GatewayConfig) -> Result<Arc<dyn DataGateway>> {
    let gateway: Arc<dyn DataGateway> = match config.kind {
        GatewayKind::Postgrest => Arc::new(PostgrestGateway::new(config)?),
        GatewayKind::Memory => {
            let path = config.fixture_path.as_deref().ok_or_else(|| {
                InterconnectError::Config("memory gateway requires fixture_path".into())
            })?;
            Arc::new(MemoryGateway::from_fixture_file(path)?)
        }
    };
    info!(kind = %config.kind, "data gateway ready");
    Ok(gateway)
}
