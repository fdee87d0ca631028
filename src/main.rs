use dashboard_service::api::{self, AppState, ColumnSettings};
use dashboard_service::config::AppConfig;
use dashboard_service::storage::{DatasetHandle, StorageError, TableSource};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("🚀 Starting Dashboard Data Service");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Data file: {}", config.storage.data_path.display());
    info!("   - Delimiter: '{}'", config.storage.delimiter);
    info!(
        "   - Grouping: {} by {}",
        config.storage.value_column, config.storage.category_column
    );
    info!("   - Server: {}:{}", config.server.host, config.server.port);

    // Initialize dataset handle
    let source = TableSource::new(
        config.storage.data_path.clone(),
        config.storage.delimiter_byte()?,
    );
    let dataset = Arc::new(DatasetHandle::new(source));

    // Try to load the table up front; handlers retry lazily otherwise
    match dataset.get().await {
        Ok(table) => info!("✅ Dataset ready ({} rows)", table.len()),
        Err(StorageError::NotFound { path }) => {
            warn!("⚠️  Data file {} not found, dashboard endpoints will return 404 until it exists", path.display())
        }
        Err(e) => warn!("⚠️  Failed to load dataset: {}", e),
    }

    // Create application state
    let state = AppState {
        dataset,
        columns: Arc::new(ColumnSettings::from(&config.storage)),
    };

    let app = api::router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("📡 Available endpoints:");
    info!("   GET  /                          - Health check");
    info!("   GET  /api/v1/item/{{id}}          - Item lookup");
    info!("   GET  /api/v1/dashboard/data     - Grouped counts");
    info!("   GET  /api/v1/dashboard/rows     - Row preview");
    info!("   POST /api/v1/dashboard/reload   - Reload data file");
    info!("");
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("🛑 Shutdown signal received");
}
