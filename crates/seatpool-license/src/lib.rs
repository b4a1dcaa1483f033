//! # seatpool-license
//!
//! Admission control for SeatPool: a capacity-bounded pool of license
//! sessions with heartbeat refresh, plus the storage abstraction it
//! persists through.
//!
//! ## Modules
//!
//! - `pool`: [`LicensePool`] with acquire, heartbeat, release, and status
//! - `store`: the [`SessionStore`] contract and its memory/PostgreSQL backends

pub mod pool;
pub mod store;

pub use pool::{AcquireOutcome, HeartbeatOutcome, LicensePool, PoolStatus, ReleaseOutcome};
pub use store::{MemorySessionStore, SessionStore};
