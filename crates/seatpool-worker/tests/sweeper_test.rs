//! Expiry sweeper behaviour: timing, liveness, overlap, and failure handling.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Notify;

use seatpool_core::config::LicenseConfig;
use seatpool_core::error::AppError;
use seatpool_core::result::AppResult;
use seatpool_core::traits::ManualClock;
use seatpool_core::types::SessionId;
use seatpool_entity::session::Session;
use seatpool_license::{
    AcquireOutcome, HeartbeatOutcome, LicensePool, MemorySessionStore, SessionStore,
};
use seatpool_worker::{ExpirySweeper, SweepOutcome, SweepState};

const TIMEOUT_SECS: u64 = 5;

fn config(capacity: u32) -> LicenseConfig {
    LicenseConfig {
        capacity,
        timeout_seconds: TIMEOUT_SECS,
        sweep_interval_seconds: 1,
    }
}

fn sweeper_over(
    store: Arc<dyn SessionStore>,
    capacity: u32,
) -> (Arc<ExpirySweeper>, LicensePool, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let pool = LicensePool::new(store, clock.clone(), &config(capacity)).unwrap();
    (Arc::new(ExpirySweeper::new(pool.clone())), pool, clock)
}

async fn acquire(pool: &LicensePool, owner: &str) -> Session {
    match pool.acquire(owner).await.unwrap() {
        AcquireOutcome::Granted(session) => session,
        other => panic!("expected a grant, got {other:?}"),
    }
}

fn completed(scanned: usize, evicted: usize, missing: usize, failed: usize) -> SweepOutcome {
    SweepOutcome::Completed {
        scanned,
        evicted,
        missing,
        failed,
    }
}

#[tokio::test]
async fn test_empty_sweep_is_noop() {
    let (sweeper, _, _) = sweeper_over(Arc::new(MemorySessionStore::new()), 2);

    assert_eq!(sweeper.sweep_once().await.unwrap(), completed(0, 0, 0, 0));
    assert_eq!(sweeper.state(), SweepState::Idle);
}

#[tokio::test]
async fn test_not_evicted_at_exactly_timeout() {
    let (sweeper, pool, clock) = sweeper_over(Arc::new(MemorySessionStore::new()), 2);
    let session = acquire(&pool, "a").await;

    clock.advance(Duration::seconds(TIMEOUT_SECS as i64));
    assert_eq!(sweeper.sweep_once().await.unwrap(), completed(0, 0, 0, 0));

    clock.advance(Duration::seconds(1));
    assert_eq!(sweeper.sweep_once().await.unwrap(), completed(1, 1, 0, 0));
    assert_eq!(
        pool.heartbeat(&session.session_id).await.unwrap(),
        HeartbeatOutcome::NotFound
    );
    assert_eq!(pool.status().await.unwrap().active, 0);
}

#[tokio::test]
async fn test_heartbeating_session_survives_many_rounds() {
    let (sweeper, pool, clock) = sweeper_over(Arc::new(MemorySessionStore::new()), 2);
    let live = acquire(&pool, "live").await;
    let silent = acquire(&pool, "silent").await;

    let mut evicted_total = 0;
    for _ in 0..50 {
        clock.advance(Duration::seconds(2));
        assert!(matches!(
            pool.heartbeat(&live.session_id).await.unwrap(),
            HeartbeatOutcome::Refreshed(_)
        ));
        if let SweepOutcome::Completed { evicted, .. } = sweeper.sweep_once().await.unwrap() {
            evicted_total += evicted;
        }
    }

    assert_eq!(evicted_total, 1);
    assert!(pool.store().get(&live.session_id).await.unwrap().is_some());
    assert!(pool.store().get(&silent.session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_freed_seat_is_reusable_after_eviction() {
    let (sweeper, pool, clock) = sweeper_over(Arc::new(MemorySessionStore::new()), 1);
    acquire(&pool, "a").await;
    assert!(!pool.acquire("b").await.unwrap().is_granted());

    clock.advance(Duration::seconds(6));
    sweeper.sweep_once().await.unwrap();

    assert!(pool.acquire("b").await.unwrap().is_granted());
}

/// Memory store whose scan blocks until released by the test.
#[derive(Debug, Default)]
struct GatedStore {
    inner: MemorySessionStore,
    entered: Notify,
    proceed: Notify,
}

#[async_trait]
impl SessionStore for GatedStore {
    async fn count(&self) -> AppResult<u64> {
        self.inner.count().await
    }

    async fn get(&self, id: &SessionId) -> AppResult<Option<Session>> {
        self.inner.get(id).await
    }

    async fn put(&self, session: &Session) -> AppResult<()> {
        self.inner.put(session).await
    }

    async fn delete(&self, id: &SessionId) -> AppResult<Option<Session>> {
        self.inner.delete(id).await
    }

    async fn find_expired(&self, threshold: DateTime<Utc>) -> AppResult<Vec<Session>> {
        self.entered.notify_one();
        self.proceed.notified().await;
        self.inner.find_expired(threshold).await
    }

    async fn insert_within_capacity(&self, session: &Session, capacity: u32) -> AppResult<bool> {
        self.inner.insert_within_capacity(session, capacity).await
    }

    async fn touch(&self, id: &SessionId, at: DateTime<Utc>) -> AppResult<Option<Session>> {
        self.inner.touch(id, at).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[tokio::test]
async fn test_overlapping_sweep_is_skipped() {
    let store = Arc::new(GatedStore::default());
    let (sweeper, _, _) = sweeper_over(store.clone(), 2);

    let first = tokio::spawn({
        let sweeper = sweeper.clone();
        async move { sweeper.sweep_once().await }
    });

    store.entered.notified().await;
    assert_eq!(sweeper.state(), SweepState::Scanning);
    assert_eq!(sweeper.sweep_once().await.unwrap(), SweepOutcome::Skipped);

    store.proceed.notify_one();
    assert_eq!(first.await.unwrap().unwrap(), completed(0, 0, 0, 0));
    assert_eq!(sweeper.state(), SweepState::Idle);
}

/// Memory store that fails a set number of scans and every delete of one
/// chosen session.
#[derive(Debug, Default)]
struct FaultyStore {
    inner: MemorySessionStore,
    scan_failures: AtomicU32,
    poisoned: Mutex<Option<SessionId>>,
}

impl FaultyStore {
    fn is_poisoned(&self, id: &SessionId) -> bool {
        self.poisoned.lock().unwrap().as_ref() == Some(id)
    }
}

#[async_trait]
impl SessionStore for FaultyStore {
    async fn count(&self) -> AppResult<u64> {
        self.inner.count().await
    }

    async fn get(&self, id: &SessionId) -> AppResult<Option<Session>> {
        self.inner.get(id).await
    }

    async fn put(&self, session: &Session) -> AppResult<()> {
        self.inner.put(session).await
    }

    async fn delete(&self, id: &SessionId) -> AppResult<Option<Session>> {
        if self.is_poisoned(id) {
            return Err(AppError::storage_unavailable("delete refused"));
        }
        self.inner.delete(id).await
    }

    async fn find_expired(&self, threshold: DateTime<Utc>) -> AppResult<Vec<Session>> {
        let failing = self
            .scan_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(AppError::storage_unavailable("scan refused"));
        }
        self.inner.find_expired(threshold).await
    }

    async fn insert_within_capacity(&self, session: &Session, capacity: u32) -> AppResult<bool> {
        self.inner.insert_within_capacity(session, capacity).await
    }

    async fn touch(&self, id: &SessionId, at: DateTime<Utc>) -> AppResult<Option<Session>> {
        self.inner.touch(id, at).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

#[tokio::test]
async fn test_scan_failure_is_returned_and_next_sweep_retries() {
    let store = Arc::new(FaultyStore::default());
    store.scan_failures.store(1, Ordering::SeqCst);
    let (sweeper, pool, clock) = sweeper_over(store.clone(), 2);
    acquire(&pool, "a").await;
    clock.advance(Duration::seconds(6));

    let err = sweeper.sweep_once().await.unwrap_err();
    assert!(err.is_storage_unavailable());
    assert_eq!(sweeper.state(), SweepState::Idle);
    assert_eq!(pool.status().await.unwrap().active, 1);

    assert_eq!(sweeper.sweep_once().await.unwrap(), completed(1, 1, 0, 0));
    assert_eq!(pool.status().await.unwrap().active, 0);
}

#[tokio::test]
async fn test_eviction_failure_does_not_stop_the_sweep() {
    let store = Arc::new(FaultyStore::default());
    let (sweeper, pool, clock) = sweeper_over(store.clone(), 3);
    let stuck = acquire(&pool, "stuck").await;
    acquire(&pool, "b").await;
    acquire(&pool, "c").await;
    *store.poisoned.lock().unwrap() = Some(stuck.session_id);
    clock.advance(Duration::seconds(6));

    assert_eq!(sweeper.sweep_once().await.unwrap(), completed(3, 2, 0, 1));
    assert_eq!(pool.status().await.unwrap().active, 1);

    *store.poisoned.lock().unwrap() = None;
    assert_eq!(sweeper.sweep_once().await.unwrap(), completed(1, 1, 0, 0));
    assert_eq!(pool.status().await.unwrap().active, 0);
}
