//! Edge Service entry point.

use edge_service::config::EdgeConfig;
use edge_service::services::init_metrics;
use edge_service::startup::Application;
use service_core::error::AppError;
use service_core::observability::init_tracing;
use std::process::ExitCode;
use tokio::signal;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match EdgeConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );
    init_metrics();

    match serve(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "edge-service stopped with an error");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: EdgeConfig) -> Result<(), AppError> {
    tracing::info!(
        version = %config.service_version,
        listen_addr = %config.common.listen_addr(),
        otlp_enabled = config.otlp_endpoint.is_some(),
        db_max_connections = config.database.max_connections,
        db_min_connections = config.database.min_connections,
        "Starting edge-service"
    );

    let app = Application::build(config).await?;
    app.run_until(shutdown_signal()).await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM. A handler that fails to install is logged
/// and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl-C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
