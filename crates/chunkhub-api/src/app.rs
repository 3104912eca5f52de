//! Application builder — wires store + state + router and runs the server.

use axum::Router;

use chunkhub_core::config::AppConfig;
use chunkhub_core::error::AppError;
use chunkhub_core::result::AppResult;
use chunkhub_storage::ChunkStore;

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application for the given configuration.
///
/// Creates the storage roots if absent.
pub async fn build_app(config: AppConfig) -> AppResult<Router> {
    let store = ChunkStore::new(&config.storage).await?;
    let state = AppState::new(config, store);
    Ok(build_router(state))
}

/// Runs the ChunkHub server with the given configuration.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("ChunkHub server listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("ChunkHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
