//! Expiry sweeper: reclaims seats from sessions that stopped heartbeating.

use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, info, warn};

use seatpool_core::result::AppResult;
use seatpool_license::{LicensePool, ReleaseOutcome};

/// Lifecycle of a single sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepState {
    /// No sweep in progress.
    Idle,
    /// Querying the store for expired sessions.
    Scanning,
    /// Releasing the sessions found by the scan.
    Evicting,
}

/// Result of [`ExpirySweeper::sweep_once`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// The sweep ran to completion.
    Completed {
        /// Expired sessions returned by the scan.
        scanned: usize,
        /// Sessions released by this sweep.
        evicted: usize,
        /// Sessions already gone by the time they were released.
        missing: usize,
        /// Sessions whose release failed; retried on the next sweep.
        failed: usize,
    },
    /// Another sweep was already running.
    Skipped,
}

impl SweepOutcome {
    fn empty() -> Self {
        Self::Completed {
            scanned: 0,
            evicted: 0,
            missing: 0,
            failed: 0,
        }
    }
}

/// Resets the published state to `Idle` when a sweep ends, including when
/// its future is dropped mid-flight.
struct IdleOnDrop<'a>(&'a watch::Sender<SweepState>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_replace(SweepState::Idle);
    }
}

/// Finds sessions whose last heartbeat is older than the pool timeout and
/// evicts them through [`LicensePool::release`].
///
/// At most one sweep runs at a time. A sweep requested while another is in
/// progress returns [`SweepOutcome::Skipped`] immediately.
#[derive(Debug)]
pub struct ExpirySweeper {
    /// Pool whose sessions are swept.
    pool: LicensePool,
    /// Held for the duration of a sweep.
    running: Mutex<()>,
    /// Published sweep state.
    state: watch::Sender<SweepState>,
}

impl ExpirySweeper {
    /// Creates a new sweeper over `pool`.
    pub fn new(pool: LicensePool) -> Self {
        let (state, _) = watch::channel(SweepState::Idle);
        Self {
            pool,
            running: Mutex::new(()),
            state,
        }
    }

    /// Current sweep state.
    pub fn state(&self) -> SweepState {
        *self.state.borrow()
    }

    /// Runs one sweep.
    ///
    /// A scan failure is returned to the caller with nothing evicted. A
    /// failure to release an individual session is logged and counted, and
    /// the remaining sessions are still processed.
    pub async fn sweep_once(&self) -> AppResult<SweepOutcome> {
        let Ok(_running) = self.running.try_lock() else {
            debug!("Expiry sweep already in progress, skipping");
            return Ok(SweepOutcome::Skipped);
        };
        let _idle = IdleOnDrop(&self.state);

        self.state.send_replace(SweepState::Scanning);
        let expired = self.pool.expired_sessions().await.inspect_err(|e| {
            error!(error = %e, "Failed to scan for expired sessions");
        })?;

        if expired.is_empty() {
            debug!("Expiry sweep found no expired sessions");
            return Ok(SweepOutcome::empty());
        }

        info!(count = expired.len(), "Found expired sessions to evict");
        self.state.send_replace(SweepState::Evicting);

        let now = self.pool.clock().now();
        let mut evicted = 0;
        let mut missing = 0;
        let mut failed = 0;

        for session in &expired {
            match self.pool.release(&session.session_id).await {
                Ok(ReleaseOutcome::Released(_)) => {
                    warn!(
                        session_id = %session.session_id,
                        owner_id = %session.owner_id,
                        idle_seconds = session.idle_for(now).num_seconds(),
                        "Evicted expired license session"
                    );
                    evicted += 1;
                }
                Ok(ReleaseOutcome::NotFound) => {
                    debug!(
                        session_id = %session.session_id,
                        "Expired session already released"
                    );
                    missing += 1;
                }
                Err(e) => {
                    error!(
                        session_id = %session.session_id,
                        error = %e,
                        "Failed to evict expired session"
                    );
                    failed += 1;
                }
            }
        }

        info!(
            scanned = expired.len(),
            evicted = evicted,
            missing = missing,
            failed = failed,
            "Expiry sweep completed"
        );

        Ok(SweepOutcome::Completed {
            scanned: expired.len(),
            evicted,
            missing,
            failed,
        })
    }

    /// The pool this sweeper evicts from.
    pub fn pool(&self) -> &LicensePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let skipped = serde_json::to_value(SweepOutcome::Skipped).unwrap();
        assert_eq!(skipped, serde_json::json!({ "status": "skipped" }));

        let completed = serde_json::to_value(SweepOutcome::Completed {
            scanned: 2,
            evicted: 1,
            missing: 1,
            failed: 0,
        })
        .unwrap();
        assert_eq!(completed["status"], "completed");
        assert_eq!(completed["evicted"], 1);
    }

    #[test]
    fn test_state_serializes_snake_case() {
        let state = serde_json::to_value(SweepState::Evicting).unwrap();
        assert_eq!(state, "evicting");
    }
}
