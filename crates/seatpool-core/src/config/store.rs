//! Session store backend selection.

use serde::{Deserialize, Serialize};

/// Session store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Which backend persists session records.
    #[serde(default)]
    pub backend: StoreBackend,
}

/// Available session store backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process-local map; sessions are lost on restart.
    #[default]
    Memory,
    /// PostgreSQL table `active_sessions`.
    Postgres,
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Postgres => write!(f, "postgres"),
        }
    }
}
