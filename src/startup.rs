use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::database;
use crate::routes::build_router;
use crate::state::AppState;

/// Installs the fmt subscriber; `RUST_LOG` overrides the default filter
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Connects the store, prepares collections and the upload root
pub async fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let store = database::connect(&config.database)
        .await
        .context("failed to connect to the document store")?;
    let state = AppState::new(config, store).context("invalid password hashing parameters")?;

    state
        .ensure_collections()
        .await
        .context("failed to prepare collections")?;
    state
        .media
        .ensure_root()
        .await
        .context("failed to create upload directory")?;

    Ok(state)
}

pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = build_state(config).await?;

    let bind_addr = state.config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("Petora API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; run until killed
        std::future::pending::<()>().await;
    }
}
