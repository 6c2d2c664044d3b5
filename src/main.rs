//! snsmock - local SNS publish mock
//!
//! An HTTP mock of the SNS publish API with an in-memory capture store and
//! a JSON verification API for test assertions.

use snsmock_server::{Config, Server, ServerConfig};
use snsmock_store::CaptureStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration (from file if SNSMOCK_CONFIG is set, then env overrides)
    let config = match Config::load() {
        Ok(c) => {
            if let Ok(path) = std::env::var("SNSMOCK_CONFIG") {
                tracing::info!("Loaded config from {}", path);
            }
            c
        }
        Err(e) => {
            // If a config file was explicitly specified, fail on error
            if std::env::var("SNSMOCK_CONFIG").is_ok() {
                tracing::error!("Failed to load config: {}", e);
                return Err(e.into());
            }
            // Otherwise fall back to defaults
            tracing::info!("Using default configuration");
            Config::default()
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    tracing::info!("Starting snsmock");
    tracing::info!("  Listen address: {}", config.network.listen_addr);
    tracing::info!("  Capture capacity: {}", config.capture.capacity);
    tracing::info!(
        "  Verification API: {}",
        config.capture.verification_prefix
    );

    // Create the capture store
    let store = Arc::new(CaptureStore::with_capacity(config.capture.capacity)?);

    // Configure and run the server
    let server_config = ServerConfig {
        listen_addr: config.network.listen_addr,
        verification_prefix: config.capture.verification_prefix.clone(),
    };
    let server = Arc::new(Server::new(server_config, store));

    // Spawn shutdown signal handler
    let shutdown_server = server.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        tracing::info!("Received shutdown signal, stopping server...");
        shutdown_server.shutdown();
    });

    // Run server (blocks until shutdown)
    server.run().await?;

    tracing::info!("Server stopped");
    Ok(())
}
