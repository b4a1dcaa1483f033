//! Sweep runner: drives the expiry sweeper on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::sweeper::{ExpirySweeper, SweepOutcome};

/// Periodically runs [`ExpirySweeper::sweep_once`] until cancelled.
///
/// The first tick fires immediately, so sessions left in a durable store
/// by a previous process are reclaimed at startup. Each sweep is awaited
/// before the next tick is polled; ticks missed while a sweep runs are
/// skipped rather than burst.
#[derive(Debug)]
pub struct SweepRunner {
    /// Sweeper to drive.
    sweeper: Arc<ExpirySweeper>,
    /// Period between sweeps.
    interval: Duration,
}

impl SweepRunner {
    /// Create a new sweep runner
    pub fn new(sweeper: Arc<ExpirySweeper>, interval: Duration) -> Self {
        Self { sweeper, interval }
    }

    /// Run until the cancel signal is set to `true` or its sender is dropped
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        tracing::info!(
            "Expiry sweeper started with interval={}s, timeout={}s",
            self.interval.as_secs(),
            self.sweeper.pool().timeout().as_secs()
        );

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            if *cancel.borrow() {
                break;
            }

            tokio::select! {
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        tracing::info!("Expiry sweeper received shutdown signal");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    self.tick().await;
                }
            }
        }

        tracing::info!("Expiry sweeper shut down complete");
    }

    async fn tick(&self) {
        match self.sweeper.sweep_once().await {
            Ok(SweepOutcome::Completed { .. }) => {}
            Ok(SweepOutcome::Skipped) => {
                tracing::debug!("Scheduled sweep skipped; a manual sweep is running");
            }
            Err(e) => {
                tracing::error!(error = %e, "Expiry sweep failed; retrying next tick");
            }
        }
    }
}
