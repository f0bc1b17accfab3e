use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use common::storage::filesystem::FilesystemAttachmentStore;
use sthala_server::config::AppConfig;
use sthala_server::database::init_db;
use sthala_server::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database.url, config.database.max_connections)
        .await
        .context("Failed to initialize database")?;
    info!("Database ready");

    let store = FilesystemAttachmentStore::new(
        config.storage.root.clone(),
        Duration::from_secs(config.storage.write_timeout_secs),
    )
    .await
    .context("Failed to initialize attachment store")?;
    info!(root = %config.storage.root.display(), "Attachment store ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        attachments: Arc::new(store),
    };
    let app = sthala_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    info!("API docs at http://{}/scalar", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
