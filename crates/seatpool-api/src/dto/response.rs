//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use seatpool_core::types::SessionId;
use seatpool_entity::session::Session;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// A license session as seen by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    /// Session ID.
    pub session_id: SessionId,
    /// Owner identity.
    pub owner_id: String,
    /// Admission time.
    pub created_at: DateTime<Utc>,
    /// Last heartbeat time.
    pub last_heartbeat_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            session_id: session.session_id,
            owner_id: session.owner_id.to_string(),
            created_at: session.created_at,
            last_heartbeat_at: session.last_heartbeat_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when the store is reachable, `degraded` otherwise.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the process started.
    pub uptime_seconds: u64,
    /// Configured storage backend.
    pub store_backend: String,
    /// Whether the storage backend answered its health check.
    pub store_healthy: bool,
}
