//! # airmond: air-quality monitor daemon
//!
//! Composition root that wires the monitor integration, the entity registry
//! and the HTTP adapter together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Initialise `tracing` from the configured filter
//! - Build the event bus, the registry and the monitor integration
//! - Run `setup`, start the poll loops, serve HTTP
//! - Handle graceful shutdown (SIGTERM/SIGINT) and tear the integration down
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use airmon_adapter_http_axum::router;
use airmon_adapter_http_axum::state::AppState;
use airmon_adapter_miio::MonitorIntegration;
use airmon_adapter_virtual::SimulatedMonitor;
use airmon_app::event_bus::InProcessEventBus;
use airmon_app::ports::Integration;
use airmon_app::services::registry::EntityRegistry;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, TransportKind};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Transport
    let monitor = match config.device.transport {
        TransportKind::Simulated => {
            let model = config.simulated_model()?;
            tracing::info!(%model, host = %config.device.host, "using simulated monitor");
            SimulatedMonitor::new(model)
        }
    };

    // Registry and event bus
    let event_bus = InProcessEventBus::default();
    let registry = EntityRegistry::new(event_bus.clone());

    // Integration
    let integration = Arc::new(
        MonitorIntegration::new(config.device.miio_config(), monitor)
            .with_intervals(config.poll_intervals()),
    );
    integration.setup(&registry).await?;
    integration.start_background(registry.clone()).await?;

    // HTTP
    let state = AppState::new(registry, Arc::clone(&integration), event_bus);
    let app = router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "airmond listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    integration.teardown().await?;
    tracing::info!("airmond stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
