//! # tryshare-api: Binary Entry Point
//!
//! Reads configuration from the environment, installs tracing and the
//! Prometheus recorder, then serves until Ctrl-C.

use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::EnvFilter;
use tryshare_api::state::{AppConfig, AppState, LogFormat};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    let metrics = PrometheusBuilder::new().install_recorder().map_err(|e| {
        tracing::error!("Prometheus recorder installation failed: {e}");
        e
    })?;

    let port = config.port;
    let state = AppState::from_config(config)
        .map_err(|e| {
            tracing::error!("Start-up failed: {e}");
            e
        })?
        .with_metrics(metrics);
    tracing::info!(
        lock_timeout = ?state.config.lock_timeout,
        rating_weight = state.config.rating_weight,
        "registry configured"
    );

    let app = tryshare_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("TryShare API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
