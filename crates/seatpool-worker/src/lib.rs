//! # seatpool-worker
//!
//! Background maintenance for the license pool: the [`ExpirySweeper`]
//! that evicts sessions whose heartbeat has lapsed, and the
//! [`SweepRunner`] that drives it on a fixed interval until shutdown.

pub mod runner;
pub mod sweeper;

pub use runner::SweepRunner;
pub use sweeper::{ExpirySweeper, SweepOutcome, SweepState};
