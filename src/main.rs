//! Image Cache - resolver service
//!
//! Serves the image cache over HTTP and runs its maintenance schedule.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_cache::api::create_router;
use image_cache::storage::{FileStore, KeyValueStore, MemoryStore};
use image_cache::{spawn_sweep_task, AppState, Config, ImageCache};

/// Main entry point for the image resolver service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Open the durable store and build the cache
/// 4. Optionally sweep expired records and start the background sweep
/// 5. Serve the HTTP API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "image_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting image cache service");

    let config = Config::from_env();
    info!(
        "Configuration loaded: ttl_ms={}, storage={:?}, port={}, sweep_interval={}s",
        config.ttl_ms, config.storage_path, config.server_port, config.sweep_interval
    );

    let storage: Arc<dyn KeyValueStore> = match &config.storage_path {
        Some(path) => Arc::new(
            FileStore::open(path)
                .await
                .with_context(|| format!("Failed to open store at {}", path.display()))?,
        ),
        None => {
            warn!("CACHE_STORAGE_PATH not set, records will not survive restarts");
            Arc::new(MemoryStore::new())
        }
    };

    let cache = Arc::new(ImageCache::new(storage).with_ttl(config.ttl_ms));

    if config.sweep_on_startup {
        let report = cache.sweep_expired().await;
        info!(
            "Startup sweep: {} expired, {} malformed removed",
            report.removed, report.malformed
        );
    }

    let sweep_handle =
        (config.sweep_interval > 0).then(|| spawn_sweep_task(cache.clone(), config.sweep_interval));

    let app = create_router(AppState::from_shared(cache));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the sweep task.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("Sweep task aborted");
    }
}
