//! Capacity-bounded license pool.

pub mod license;
pub mod outcome;

pub use license::LicensePool;
pub use outcome::{AcquireOutcome, HeartbeatOutcome, PoolStatus, ReleaseOutcome};
