//! In-memory session store using a Tokio `RwLock` for single-process deployments.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use seatpool_core::result::AppResult;
use seatpool_core::types::SessionId;
use seatpool_entity::session::Session;

use super::SessionStore;

/// In-memory session store.
///
/// Every mutation takes the write guard, which makes the count-then-insert
/// in [`insert_within_capacity`](SessionStore::insert_within_capacity) a
/// single critical section. Sessions do not survive a restart.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    /// Live sessions keyed by id.
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn count(&self) -> AppResult<u64> {
        Ok(self.sessions.read().await.len() as u64)
    }

    async fn get(&self, id: &SessionId) -> AppResult<Option<Session>> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn put(&self, session: &Session) -> AppResult<()> {
        self.sessions
            .write()
            .await
            .entry(session.session_id)
            .and_modify(|existing| existing.touch(session.last_heartbeat_at))
            .or_insert_with(|| session.clone());
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> AppResult<Option<Session>> {
        Ok(self.sessions.write().await.remove(id))
    }

    async fn find_expired(&self, threshold: DateTime<Utc>) -> AppResult<Vec<Session>> {
        let sessions = self.sessions.read().await;
        let mut expired: Vec<Session> = sessions
            .values()
            .filter(|s| s.is_stale(threshold))
            .cloned()
            .collect();
        expired.sort_by_key(|s| s.last_heartbeat_at);
        Ok(expired)
    }

    async fn insert_within_capacity(&self, session: &Session, capacity: u32) -> AppResult<bool> {
        let mut sessions = self.sessions.write().await;

        if sessions.len() >= capacity as usize {
            return Ok(false);
        }

        sessions.insert(session.session_id, session.clone());
        Ok(true)
    }

    async fn touch(&self, id: &SessionId, at: DateTime<Utc>) -> AppResult<Option<Session>> {
        let mut sessions = self.sessions.write().await;
        Ok(sessions.get_mut(id).map(|session| {
            session.touch(at);
            session.clone()
        }))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
