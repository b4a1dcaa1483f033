//! Results of pool operations.
//!
//! Rejection and absence are ordinary outcomes here, not errors; only
//! invalid input and storage failures travel through `AppError`.

use serde::{Deserialize, Serialize};

use seatpool_entity::session::Session;

/// Result of [`LicensePool::acquire`](super::LicensePool::acquire).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// A seat was taken and a new session admitted.
    Granted(Session),
    /// The pool was full.
    Rejected {
        /// Configured capacity.
        capacity: u32,
        /// Live sessions observed right after the refusal.
        active: u64,
    },
}

impl AcquireOutcome {
    /// Whether a session was admitted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// The admitted session, if any.
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Granted(session) => Some(session),
            Self::Rejected { .. } => None,
        }
    }
}

/// Result of [`LicensePool::heartbeat`](super::LicensePool::heartbeat).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatOutcome {
    /// The session exists and its heartbeat was bumped.
    Refreshed(Session),
    /// No such session; it was released, expired, or never existed.
    NotFound,
}

/// Result of [`LicensePool::release`](super::LicensePool::release).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// The session was removed and its seat freed.
    Released(Session),
    /// No such session.
    NotFound,
}

/// Snapshot of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Configured capacity.
    pub capacity: u32,
    /// Currently live sessions.
    pub active: u64,
    /// Free seats (`capacity - active`, floored at zero).
    pub available: u64,
}

impl PoolStatus {
    /// Build a snapshot from a capacity and an observed count.
    pub fn new(capacity: u32, active: u64) -> Self {
        Self {
            capacity,
            active,
            available: u64::from(capacity).saturating_sub(active),
        }
    }
}
