use std::net::SocketAddr;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::broadcast;

use comms_preview_service::config::Settings;
use comms_preview_service::content::{create_document_backend, SeedData};
use comms_preview_service::postgres::PostgresPool;
use comms_preview_service::server::{create_app, AppState};
use comms_preview_service::tasks::RateLimitSweepTask;
use comms_preview_service::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing; keep the guard alive until exit
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!("Configuration loaded");

    // Connect to PostgreSQL only when it backs the content store
    let postgres_pool = if settings.content.backend == "postgres" {
        let pool = PostgresPool::connect(&settings.database)
            .await
            .context("Failed to connect to PostgreSQL")?;
        pool.ensure_schema()
            .await
            .context("Failed to apply content schema")?;
        Some(pool)
    } else {
        None
    };

    let backend = create_document_backend(&settings.content, postgres_pool.clone());
    let state = AppState::new(settings.clone(), backend).with_postgres(postgres_pool.clone());
    tracing::info!(
        content_backend = state.repository.backend_name(),
        "Application state initialized"
    );

    if let Some(path) = &settings.content.seed_path {
        tracing::info!(path = %path, "Loading content seed");
        SeedData::from_file(path)?.apply(&state.repository).await?;
    }

    // Start background tasks
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let sweep_task = RateLimitSweepTask::new(state.rate_limiter.clone(), shutdown_tx.subscribe());
    let sweep_handle = tokio::spawn(sweep_task.run());

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Client IPs are needed by the preview rate limiter
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal_handler(shutdown_tx))
    .await?;

    tracing::info!("Waiting for background tasks to finish...");
    let _ = sweep_handle.await;

    if let Some(pool) = postgres_pool {
        pool.close().await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal_handler(shutdown_tx: broadcast::Sender<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }

    // Stop background tasks
    let _ = shutdown_tx.send(());
}
