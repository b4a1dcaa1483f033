//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use seatpool_core::config::AppConfig;
use seatpool_license::LicensePool;
use seatpool_worker::ExpirySweeper;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// License session pool
    pub pool: LicensePool,
    /// Expiry sweeper, shared with the background runner
    pub sweeper: Arc<ExpirySweeper>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Creates the state from the pool and its sweeper.
    pub fn new(config: Arc<AppConfig>, pool: LicensePool, sweeper: Arc<ExpirySweeper>) -> Self {
        Self {
            config,
            pool,
            sweeper,
            started_at: Instant::now(),
        }
    }
}
