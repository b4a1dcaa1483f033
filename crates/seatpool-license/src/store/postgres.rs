//! PostgreSQL-backed session store wrapping the database repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use seatpool_core::result::AppResult;
use seatpool_core::types::SessionId;
use seatpool_database::{DatabasePool, SessionRepository};
use seatpool_entity::session::Session;

use super::SessionStore;

/// Session store persisting to the `active_sessions` table.
#[derive(Debug, Clone)]
pub struct PgSessionStore {
    /// Session database repository.
    repo: Arc<SessionRepository>,
    /// Pool handle used for health checks.
    db: DatabasePool,
}

impl PgSessionStore {
    /// Creates a new PostgreSQL session store.
    pub fn new(db: DatabasePool) -> Self {
        Self {
            repo: Arc::new(SessionRepository::new(db.pool().clone())),
            db,
        }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn count(&self) -> AppResult<u64> {
        Ok(self.repo.count().await?.max(0) as u64)
    }

    async fn get(&self, id: &SessionId) -> AppResult<Option<Session>> {
        self.repo.find_by_id(*id).await
    }

    async fn put(&self, session: &Session) -> AppResult<()> {
        self.repo.upsert(session).await
    }

    async fn delete(&self, id: &SessionId) -> AppResult<Option<Session>> {
        self.repo.delete(*id).await
    }

    async fn find_expired(&self, threshold: DateTime<Utc>) -> AppResult<Vec<Session>> {
        self.repo.find_stale(threshold).await
    }

    async fn insert_within_capacity(&self, session: &Session, capacity: u32) -> AppResult<bool> {
        self.repo.insert_within_capacity(session, capacity).await
    }

    async fn touch(&self, id: &SessionId, at: DateTime<Utc>) -> AppResult<Option<Session>> {
        self.repo.touch(*id, at).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.db.health_check().await
    }
}
