// Main entry point for API server

use anyhow::{Context, Result};
use match_core::domains::lifecycle::{CoordinatorSettings, LifecycleCoordinator};
use match_core::kernel::ServerDeps;
use match_core::{server::build_app, Config};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,match_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Founder Match API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        match_limit = config.match_limit,
        top_matches = config.top_matches,
        request_timeout_secs = config.request_timeout.as_secs(),
        "Configuration loaded"
    );

    // Wire dependencies (store, embedder, notifier)
    let deps = ServerDeps::from_config(&config)
        .await
        .context("Failed to initialize dependencies")?;
    let coordinator = Arc::new(LifecycleCoordinator::new(
        deps,
        CoordinatorSettings::from(&config),
    ));

    // Build application
    let app = build_app(coordinator, &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(%addr, "Listening");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C so in-flight requests can finish
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
