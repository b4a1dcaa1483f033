//! Session storage contract and backends.
//!
//! Provides atomic admission using either:
//! - an in-memory map guarded by a Tokio `RwLock` (single process)
//! - a PostgreSQL table guarded by a transaction-scoped advisory lock

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use seatpool_core::result::AppResult;
use seatpool_core::types::SessionId;
use seatpool_entity::session::Session;

pub use memory::MemorySessionStore;
#[cfg(feature = "postgres")]
pub use postgres::PgSessionStore;

/// Durable keyed storage for session records.
///
/// Implementations must be thread-safe. Two operations carry an atomicity
/// contract that the pool depends on:
///
/// - [`insert_within_capacity`](SessionStore::insert_within_capacity) must
///   observe the count and insert under one critical section, so that two
///   concurrent callers can never both take the last slot.
/// - [`touch`](SessionStore::touch) must update an existing record in place
///   and never recreate a record that has been deleted.
///
/// Backend failures are reported as `ErrorKind::StorageUnavailable`.
#[async_trait]
pub trait SessionStore: Send + Sync + std::fmt::Debug {
    /// Number of sessions currently stored.
    async fn count(&self) -> AppResult<u64>;

    /// Look up a session by id.
    async fn get(&self, id: &SessionId) -> AppResult<Option<Session>>;

    /// Insert a session record, or refresh the heartbeat of an existing one.
    ///
    /// An existing record keeps its `owner_id` and `created_at`; only
    /// `last_heartbeat_at` is taken from `session`, clamped to `created_at`.
    async fn put(&self, session: &Session) -> AppResult<()>;

    /// Remove a session, returning the removed record if it existed.
    async fn delete(&self, id: &SessionId) -> AppResult<Option<Session>>;

    /// All sessions whose last heartbeat is strictly older than `threshold`,
    /// oldest first.
    async fn find_expired(&self, threshold: DateTime<Utc>) -> AppResult<Vec<Session>>;

    /// Atomically insert `session` if fewer than `capacity` sessions exist.
    ///
    /// Returns `false`, leaving storage untouched, when the pool is full.
    async fn insert_within_capacity(&self, session: &Session, capacity: u32) -> AppResult<bool>;

    /// Set `last_heartbeat_at` on an existing session, clamped to its
    /// `created_at`. Returns `None` if the session does not exist.
    async fn touch(&self, id: &SessionId, at: DateTime<Utc>) -> AppResult<Option<Session>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
