//! License pool: admission, heartbeat refresh, and release.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use seatpool_core::config::LicenseConfig;
use seatpool_core::error::AppError;
use seatpool_core::result::AppResult;
use seatpool_core::traits::Clock;
use seatpool_core::types::{OwnerId, SessionId};
use seatpool_entity::session::Session;

use crate::store::SessionStore;

use super::outcome::{AcquireOutcome, HeartbeatOutcome, PoolStatus, ReleaseOutcome};

/// Gates admission so the number of live sessions never exceeds the
/// configured capacity.
///
/// All session mutations go through this type. The expiry sweeper evicts
/// by calling [`release`](Self::release) like any other client.
#[derive(Clone)]
pub struct LicensePool {
    /// Backing session storage.
    store: Arc<dyn SessionStore>,
    /// Time source for timestamps and expiry thresholds.
    clock: Arc<dyn Clock>,
    /// Maximum concurrent sessions.
    capacity: u32,
    /// Heartbeat staleness threshold.
    timeout: Duration,
    /// `timeout` as a chrono delta for timestamp arithmetic.
    timeout_delta: chrono::Duration,
}

impl std::fmt::Debug for LicensePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LicensePool")
            .field("store", &self.store)
            .field("capacity", &self.capacity)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LicensePool {
    /// Creates a pool over `store`, validating `config` first.
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        config: &LicenseConfig,
    ) -> AppResult<Self> {
        config.validate()?;

        let timeout = config.timeout();
        let timeout_delta = chrono::Duration::from_std(timeout).map_err(|_| {
            AppError::configuration(format!(
                "license.timeout_seconds ({}) is out of range",
                config.timeout_seconds
            ))
        })?;

        Ok(Self {
            store,
            clock,
            capacity: config.capacity,
            timeout,
            timeout_delta,
        })
    }

    /// Admit a new session for `owner_id` if a seat is free.
    ///
    /// The capacity check and insert are one atomic store operation, so two
    /// callers racing for the last seat cannot both be granted.
    pub async fn acquire(&self, owner_id: &str) -> AppResult<AcquireOutcome> {
        let owner_id = OwnerId::parse(owner_id)?;
        let session = Session::new(owner_id, self.clock.now());

        let admitted = self
            .store
            .insert_within_capacity(&session, self.capacity)
            .await
            .inspect_err(|e| {
                error!(owner_id = %session.owner_id, error = %e, "Failed to admit session");
            })?;

        if !admitted {
            // Diagnostic only; the rejection stands even if counting fails.
            let active = match self.store.count().await {
                Ok(active) => active,
                Err(e) => {
                    warn!(error = %e, "Failed to count sessions after rejection");
                    u64::from(self.capacity)
                }
            };
            warn!(
                owner_id = %session.owner_id,
                active = active,
                capacity = self.capacity,
                "License limit reached, session rejected"
            );
            return Ok(AcquireOutcome::Rejected {
                capacity: self.capacity,
                active,
            });
        }

        info!(
            session_id = %session.session_id,
            owner_id = %session.owner_id,
            "License session granted"
        );

        Ok(AcquireOutcome::Granted(session))
    }

    /// Record a liveness signal for an existing session.
    ///
    /// A missing session is reported as [`HeartbeatOutcome::NotFound`] and
    /// is never recreated.
    pub async fn heartbeat(&self, session_id: &SessionId) -> AppResult<HeartbeatOutcome> {
        let touched = self
            .store
            .touch(session_id, self.clock.now())
            .await
            .inspect_err(|e| {
                error!(session_id = %session_id, error = %e, "Failed to record heartbeat");
            })?;

        match touched {
            Some(session) => {
                debug!(session_id = %session_id, "Heartbeat received");
                Ok(HeartbeatOutcome::Refreshed(session))
            }
            None => {
                debug!(session_id = %session_id, "Heartbeat for unknown session");
                Ok(HeartbeatOutcome::NotFound)
            }
        }
    }

    /// Remove a session and free its seat. Releasing twice is harmless.
    pub async fn release(&self, session_id: &SessionId) -> AppResult<ReleaseOutcome> {
        let removed = self.store.delete(session_id).await.inspect_err(|e| {
            error!(session_id = %session_id, error = %e, "Failed to release session");
        })?;

        match removed {
            Some(session) => {
                info!(
                    session_id = %session_id,
                    owner_id = %session.owner_id,
                    "License session released"
                );
                Ok(ReleaseOutcome::Released(session))
            }
            None => {
                debug!(session_id = %session_id, "Release for unknown session");
                Ok(ReleaseOutcome::NotFound)
            }
        }
    }

    /// Current occupancy.
    pub async fn status(&self) -> AppResult<PoolStatus> {
        let active = self.store.count().await?;
        Ok(PoolStatus::new(self.capacity, active))
    }

    /// Sessions whose last heartbeat is older than `now - timeout`.
    pub async fn expired_sessions(&self) -> AppResult<Vec<Session>> {
        self.store.find_expired(self.expiry_threshold()).await
    }

    /// The instant before which a heartbeat counts as stale.
    pub fn expiry_threshold(&self) -> DateTime<Utc> {
        self.clock.now() - self.timeout_delta
    }

    /// Configured capacity.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Heartbeat staleness threshold.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The pool's time source.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySessionStore;
    use seatpool_core::error::ErrorKind;
    use seatpool_core::traits::ManualClock;

    fn pool(capacity: u32) -> (LicensePool, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let config = LicenseConfig {
            capacity,
            timeout_seconds: 5,
            sweep_interval_seconds: 1,
        };
        let pool = LicensePool::new(Arc::new(MemorySessionStore::new()), clock.clone(), &config)
            .expect("valid config");
        (pool, clock)
    }

    #[tokio::test]
    async fn test_acquire_rejects_blank_owner() {
        let (pool, _) = pool(2);
        let err = pool.acquire("   ").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(pool.status().await.unwrap().active, 0);
    }

    #[tokio::test]
    async fn test_rejection_reports_occupancy() {
        let (pool, _) = pool(1);
        assert!(pool.acquire("a").await.unwrap().is_granted());

        let outcome = pool.acquire("b").await.unwrap();
        assert_eq!(
            outcome,
            AcquireOutcome::Rejected {
                capacity: 1,
                active: 1
            }
        );
    }

    #[tokio::test]
    async fn test_heartbeat_uses_clock() {
        let (pool, clock) = pool(1);
        let session = pool.acquire("a").await.unwrap().session().cloned().unwrap();

        clock.advance(chrono::Duration::seconds(3));
        let HeartbeatOutcome::Refreshed(refreshed) = pool.heartbeat(&session.session_id).await.unwrap()
        else {
            panic!("session should exist");
        };
        assert_eq!(refreshed.last_heartbeat_at, clock.now());
        assert_eq!(refreshed.created_at, session.created_at);
    }

    #[tokio::test]
    async fn test_expiry_threshold_follows_clock() {
        let (pool, clock) = pool(1);
        assert_eq!(pool.expiry_threshold(), clock.now() - chrono::Duration::seconds(5));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = LicenseConfig {
            capacity: 0,
            ..LicenseConfig::default()
        };
        let err = LicensePool::new(
            Arc::new(MemorySessionStore::new()),
            Arc::new(ManualClock::default()),
            &config,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
