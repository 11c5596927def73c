pub mod config;
pub mod error;
pub mod op_state;

pub use config::{BackendConfig, CalendarConfig, Config, ValidationResult};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt, ValidationError};
pub use op_state::{OpGuard, OpState, OpTracker, Operation, StaleGuard, Ticket};

use anyhow::Result;

/// Initialize logging for the application
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::info!("Workdesk core initialized");
    Ok(())
}
