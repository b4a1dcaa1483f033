//! SeatPool Server: concurrent license seat pool
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use seatpool_api::{AppState, build_router};
use seatpool_core::config::{AppConfig, StoreBackend};
use seatpool_core::error::{AppError, ErrorKind};
use seatpool_core::traits::SystemClock;
use seatpool_database::DatabasePool;
use seatpool_license::store::PgSessionStore;
use seatpool_license::{LicensePool, MemorySessionStore, SessionStore};
use seatpool_worker::{ExpirySweeper, SweepRunner};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("SEATPOOL_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting SeatPool v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;
    let config = Arc::new(config);

    // ── Step 1: Session store ────────────────────────────────────
    tracing::info!("Initializing session store (backend: {})...", config.store.backend);
    let (store, db) = match config.store.backend {
        StoreBackend::Memory => {
            let store: Arc<dyn SessionStore> = Arc::new(MemorySessionStore::new());
            (store, None)
        }
        StoreBackend::Postgres => {
            let db = DatabasePool::open(&config.database).await?;
            let store: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(db.clone()));
            (store, Some(db))
        }
    };

    // ── Step 2: License pool ─────────────────────────────────────
    let pool = LicensePool::new(store, Arc::new(SystemClock), &config.license)?;
    tracing::info!(
        "License pool ready: capacity={}, timeout={}s",
        config.license.capacity,
        config.license.timeout_seconds
    );

    // ── Step 3: Expiry sweeper ───────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = Arc::new(ExpirySweeper::new(pool.clone()));
    let runner = SweepRunner::new(Arc::clone(&sweeper), config.license.sweep_interval());
    let sweeper_handle = tokio::spawn(async move {
        runner.run(shutdown_rx).await;
    });

    // ── Step 4: HTTP server ──────────────────────────────────────
    let app = build_router(AppState::new(Arc::clone(&config), pool, sweeper));

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e)
        })?;

    tracing::info!("SeatPool server listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    // ── Step 6: Wait for background tasks ────────────────────────
    tracing::info!("Waiting for expiry sweeper to stop...");
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, sweeper_handle).await.is_err() {
        tracing::warn!(
            "Expiry sweeper did not stop within {}s",
            config.server.shutdown_grace_seconds
        );
    }

    if let Some(db) = db {
        db.close().await;
    }

    tracing::info!("SeatPool server shut down gracefully");
    Ok(())
}

/// Resolve when the process receives Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
}
