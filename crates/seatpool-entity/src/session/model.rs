//! Session entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use seatpool_core::types::{OwnerId, SessionId};

/// One admitted license holder.
///
/// Sessions are created on acquire, refreshed by heartbeats, and destroyed
/// on release or by the expiry sweep. Each session holds exactly one unit
/// of pool capacity while it exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier and storage key.
    pub session_id: SessionId,
    /// The identity that acquired this session.
    pub owner_id: OwnerId,
    /// When the session was admitted.
    pub created_at: DateTime<Utc>,
    /// Most recent liveness signal. Never earlier than `created_at`.
    pub last_heartbeat_at: DateTime<Utc>,
}

impl Session {
    /// Build a freshly admitted session with a new random id.
    pub fn new(owner_id: OwnerId, now: DateTime<Utc>) -> Self {
        Self {
            session_id: SessionId::new(),
            owner_id,
            created_at: now,
            last_heartbeat_at: now,
        }
    }

    /// Record a heartbeat at `at`, clamped so it never precedes `created_at`.
    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.last_heartbeat_at = at.max(self.created_at);
    }

    /// Whether the last heartbeat is strictly older than `threshold`.
    pub fn is_stale(&self, threshold: DateTime<Utc>) -> bool {
        self.last_heartbeat_at < threshold
    }

    /// Time since the last heartbeat, measured at `now`.
    pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        now - self.last_heartbeat_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> OwnerId {
        OwnerId::parse("alice").expect("valid owner")
    }

    #[test]
    fn test_new_session_heartbeat_equals_creation() {
        let now = Utc::now();
        let session = Session::new(owner(), now);
        assert_eq!(session.created_at, now);
        assert_eq!(session.last_heartbeat_at, now);
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let now = Utc::now();
        let mut session = Session::new(owner(), now);

        session.touch(now - Duration::seconds(30));
        assert_eq!(session.last_heartbeat_at, session.created_at);

        session.touch(now + Duration::seconds(10));
        assert_eq!(session.last_heartbeat_at, now + Duration::seconds(10));
    }

    #[test]
    fn test_staleness_is_strict() {
        let now = Utc::now();
        let session = Session::new(owner(), now);
        assert!(!session.is_stale(now));
        assert!(session.is_stale(now + Duration::milliseconds(1)));
        assert_eq!(session.idle_for(now + Duration::seconds(3)), Duration::seconds(3));
    }

    #[test]
    fn test_serializes_snake_case_fields() {
        let session = Session::new(owner(), Utc::now());
        let json = serde_json::to_value(&session).expect("serialize");
        assert_eq!(json["owner_id"], "alice");
        assert!(json.get("last_heartbeat_at").is_some());
    }
}
