//! Media Download Server binary

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use media_download_server::{
    app,
    config::Config,
    hooks::HookRegistry,
    media::{self, AttachmentStore, MediaScanner},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_download_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config from env: {}, using defaults", e);
        Config::default()
    });

    tracing::info!("Starting Media Download Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Media root: {}", config.media.root.display());

    // Initialize the attachment index
    let db_pool = media::create_pool(&config.database.url)
        .await
        .context("failed to initialize attachment database")?;
    tracing::info!("Attachment database initialized at {}", config.database.url);

    // Index the media root
    let scanner = MediaScanner::new(config.media.root.clone());
    let indexed = scanner
        .scan(&AttachmentStore::new(&db_pool))
        .await
        .context("initial media scan failed")?;
    tracing::info!("Attachment index ready with {} files", indexed);

    // Deployments register permission/header hooks here before the
    // state is constructed.
    let hooks = HookRegistry::new();

    let host = config.server.host.clone();
    let port = config.server.port;
    let state = AppState::new(config, db_pool, hooks);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("invalid server address")?;
    tracing::info!("Media Download Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listen address")?;

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
