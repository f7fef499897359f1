use anyhow::{Context, Result};
use std::sync::Arc;

use cadence::config::Config;
use cadence::scheduler::CascadeEngine;
use cadence::server::InspectionServer;

/// Run the inspection HTTP API until Ctrl+C
pub async fn serve(config: &Config, engine: CascadeEngine, bind: Option<String>) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(bind) = bind {
        server_config.bind_address = bind;
    }

    let server = InspectionServer::new(server_config, Arc::new(engine));
    let bind_address = server.bind_address().context("Invalid bind address")?;

    println!("API Endpoints:");
    println!("  GET  /api/health           - Health check");
    println!("  GET  /api/cascade/next     - Next cascade action");
    println!("  GET  /api/cascade/pattern  - Day-by-day cascade pattern");
    println!("  POST /api/cascade/plan     - Next action with platform stagger");
    println!();
    println!("Inspection server listening on http://{bind_address}");
    println!("Press Ctrl+C to stop.\n");

    server
        .start_with_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Shutdown signal received");
                }
                Err(e) => {
                    tracing::error!("Failed to wait for Ctrl+C: {}", e);
                }
            }
        })
        .await?;

    println!("Inspection server stopped.");
    Ok(())
}
