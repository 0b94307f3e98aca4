//! Standalone player
//!
//! Entry point shared by the `raytrace` binary: sets up logging and runs the
//! [`TracerApp`] on the host event loop.

use anyhow::Result;
use raytrace_core::app::{Config, event_loop};

use crate::app::TracerApp;

/// Player configuration passed from CLI
pub type PlayerConfig = Config;

/// Run the standalone player
pub fn run(config: PlayerConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Raytrace player");
    match &config.kernel.path {
        Some(path) => tracing::info!("Kernel file: {}", path.display()),
        None => tracing::info!("Kernel file: bundled"),
    }

    event_loop::run(TracerApp::new(config))
}
