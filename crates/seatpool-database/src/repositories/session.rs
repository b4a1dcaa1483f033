//! Session repository implementation.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use seatpool_core::error::{AppError, ErrorKind};
use seatpool_core::result::AppResult;
use seatpool_core::types::{OwnerId, SessionId};
use seatpool_entity::session::Session;

/// Advisory lock key serializing admission across connections.
const ADMISSION_LOCK_KEY: i64 = 0x5EA7_9001;

/// Raw row shape of `active_sessions`.
#[derive(Debug, FromRow)]
struct SessionRow {
    session_id: SessionId,
    owner_id: String,
    created_at: DateTime<Utc>,
    last_heartbeat_at: DateTime<Utc>,
}

impl TryFrom<SessionRow> for Session {
    type Error = AppError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let owner_id = OwnerId::parse(&row.owner_id).map_err(|e| {
            AppError::internal(format!(
                "Corrupt owner_id for session {}: {}",
                row.session_id, e.message
            ))
        })?;

        Ok(Session {
            session_id: row.session_id,
            owner_id,
            created_at: row.created_at,
            last_heartbeat_at: row.last_heartbeat_at,
        })
    }
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::StorageUnavailable, context, e)
}

/// Repository for `active_sessions` CRUD and query operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count all live sessions.
    pub async fn count(&self) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM active_sessions")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count sessions"))
    }

    /// Find a session by ID.
    pub async fn find_by_id(&self, id: SessionId) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, SessionRow>(
            "SELECT session_id, owner_id, created_at, last_heartbeat_at \
             FROM active_sessions WHERE session_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find session"))?
        .map(Session::try_from)
        .transpose()
    }

    /// Insert a session record, or refresh the heartbeat of an existing one.
    ///
    /// An existing row keeps its `owner_id` and `created_at`; only
    /// `last_heartbeat_at` moves, clamped to `created_at`.
    pub async fn upsert(&self, session: &Session) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO active_sessions (session_id, owner_id, created_at, last_heartbeat_at) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (session_id) DO UPDATE SET \
                 last_heartbeat_at = GREATEST(EXCLUDED.last_heartbeat_at, active_sessions.created_at)",
        )
        .bind(session.session_id)
        .bind(session.owner_id.as_str())
        .bind(session.created_at)
        .bind(session.last_heartbeat_at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to save session"))?;

        Ok(())
    }

    /// Insert `session` only if fewer than `capacity` sessions exist.
    ///
    /// The count and the insert run in one transaction holding a
    /// transaction-scoped advisory lock, so concurrent admissions are
    /// serialized even across connections.
    pub async fn insert_within_capacity(
        &self,
        session: &Session,
        capacity: u32,
    ) -> AppResult<bool> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin admission transaction"))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMISSION_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to take admission lock"))?;

        let active: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM active_sessions")
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to count sessions"))?;

        if active >= i64::from(capacity) {
            tx.rollback()
                .await
                .map_err(db_error("Failed to roll back admission transaction"))?;
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO active_sessions (session_id, owner_id, created_at, last_heartbeat_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(session.session_id)
        .bind(session.owner_id.as_str())
        .bind(session.created_at)
        .bind(session.last_heartbeat_at)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to insert session"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit admission transaction"))?;

        Ok(true)
    }

    /// Bump `last_heartbeat_at` on an existing row only.
    ///
    /// Returns `None` when the row does not exist; a missing row is never
    /// recreated.
    pub async fn touch(&self, id: SessionId, at: DateTime<Utc>) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, SessionRow>(
            "UPDATE active_sessions \
             SET last_heartbeat_at = GREATEST($2, created_at) \
             WHERE session_id = $1 \
             RETURNING session_id, owner_id, created_at, last_heartbeat_at",
        )
        .bind(id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to update heartbeat"))?
        .map(Session::try_from)
        .transpose()
    }

    /// Delete a session, returning the removed row if it existed.
    pub async fn delete(&self, id: SessionId) -> AppResult<Option<Session>> {
        sqlx::query_as::<_, SessionRow>(
            "DELETE FROM active_sessions WHERE session_id = $1 \
             RETURNING session_id, owner_id, created_at, last_heartbeat_at",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to delete session"))?
        .map(Session::try_from)
        .transpose()
    }

    /// Find sessions whose last heartbeat is strictly older than `threshold`.
    pub async fn find_stale(&self, threshold: DateTime<Utc>) -> AppResult<Vec<Session>> {
        sqlx::query_as::<_, SessionRow>(
            "SELECT session_id, owner_id, created_at, last_heartbeat_at \
             FROM active_sessions WHERE last_heartbeat_at < $1 \
             ORDER BY last_heartbeat_at ASC",
        )
        .bind(threshold)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to find expired sessions"))?
        .into_iter()
        .map(Session::try_from)
        .collect()
    }
}
