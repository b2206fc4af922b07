// ABOUTME: Process wiring for the sprint bulletin server and maintenance commands
// ABOUTME: Tracing setup, state construction, and the serve/reseed/import entry points

use std::path::Path;

use anyhow::{bail, Context};
use bulletin_ai::ChatAssistant;
use bulletin_api::{create_router, ApiSettings, AppState};
use bulletin_backlog::BacklogStore;
use bulletin_content::SprintSource;
use tracing::info;

pub mod config;

#[cfg(test)]
mod tests;

use config::Config;

/// Install the global tracing subscriber (`RUST_LOG`, default `info`)
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();
}

/// Open the backlog store described by the configuration
pub async fn open_store(config: &Config) -> anyhow::Result<BacklogStore> {
    let store = BacklogStore::open(&config.content_dir, config.database_url.as_deref())
        .await
        .context("Failed to open backlog storage")?;
    info!("Backlog storage: {}", store.backend_name());
    Ok(store)
}

/// Build the shared handler state
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let store = open_store(config).await?;
    let settings = ApiSettings {
        admin_key: config.admin_key.clone(),
        cookie_secure: config.cookie_secure,
        upload_dir: config.upload_dir.clone(),
    };

    Ok(AppState::new(
        store,
        SprintSource::from_content_dir(&config.content_dir),
        ChatAssistant::from_env(),
        settings,
    ))
}

/// Serve the HTTP API until the process is stopped
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let state = build_state(&config).await?;
    let app = create_router(state);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

/// Rebuild initiatives from the roadmap workbook
pub async fn reseed(config: &Config) -> anyhow::Result<usize> {
    let store = open_store(config).await?;
    let db = store.reseed().await?;
    info!("Reseeded {} initiatives", db.initiatives.len());
    Ok(db.initiatives.len())
}

/// Replace the roadmap workbook with `file` and reseed
pub async fn import(config: &Config, file: &Path) -> anyhow::Result<usize> {
    let is_xlsx = file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    if !is_xlsx {
        bail!("Only .xlsx files are supported: {}", file.display());
    }

    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let store = open_store(config).await?;
    let db = store.replace_source(bytes).await?;
    info!("Imported {} initiatives from {}", db.initiatives.len(), file.display());
    Ok(db.initiatives.len())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
