mod api;
mod bootstrap;
mod rule_client;
mod shutdown;

use std::time::Duration;

use anyhow::Result;
use shipquote_core::config::{AppConfig, LoadOptions};
use tracing::{error, info, warn};

fn init_logging(config: &AppConfig) {
    use shipquote_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Config comes first so logging honours its level and format.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;
    let shutdown = shutdown::install_shutdown_handler()?;
    let worker = app.worker.spawn(app.receiver, shutdown.clone());

    let address = app.config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "shipquote-server listening"
    );

    let server_shutdown = shutdown.clone();
    let served = axum::serve(listener, api::router(app.api))
        .with_graceful_shutdown(async move { server_shutdown.cancelled().await })
        .await;
    shutdown.cancel();
    info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "shipquote-server stopping"
    );

    let grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    match tokio::time::timeout(grace, worker).await {
        Ok(Ok(())) => {}
        Ok(Err(join_error)) => {
            error!(
                event_name = "system.worker.join_failed",
                correlation_id = "shutdown",
                error = %join_error,
                "bulk worker task ended abnormally"
            );
        }
        Err(_) => {
            warn!(
                event_name = "system.worker.drain_timeout",
                correlation_id = "shutdown",
                grace_secs = app.config.server.graceful_shutdown_secs,
                "bulk worker did not stop within the shutdown window"
            );
        }
    }

    served?;
    Ok(())
}
