//! License pool configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Admission and expiry settings for the license pool.
///
/// Defaults: 20 seats, a 40 second heartbeat timeout, a sweep every 20 seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseConfig {
    /// Maximum number of concurrently live sessions.
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    /// Seconds without a heartbeat after which a session is stale.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Seconds between expiry sweeps. Must be shorter than the timeout.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
}

impl LicenseConfig {
    /// Heartbeat staleness threshold.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Period of the expiry sweep.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }

    /// Check the invariants the pool and sweeper rely on.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.capacity == 0 {
            return Err(AppError::configuration(
                "license.capacity must be a positive integer",
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(AppError::configuration(
                "license.timeout_seconds must be greater than zero",
            ));
        }
        if self.sweep_interval_seconds == 0 {
            return Err(AppError::configuration(
                "license.sweep_interval_seconds must be greater than zero",
            ));
        }
        if self.sweep_interval_seconds >= self.timeout_seconds {
            return Err(AppError::configuration(format!(
                "license.sweep_interval_seconds ({}) must be shorter than license.timeout_seconds ({})",
                self.sweep_interval_seconds, self.timeout_seconds
            )));
        }
        Ok(())
    }
}

impl Default for LicenseConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            timeout_seconds: default_timeout(),
            sweep_interval_seconds: default_sweep_interval(),
        }
    }
}

fn default_capacity() -> u32 {
    20
}

fn default_timeout() -> u64 {
    40
}

fn default_sweep_interval() -> u64 {
    20
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LicenseConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout(), Duration::from_secs(40));
        assert_eq!(config.sweep_interval(), Duration::from_secs(20));
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let config = LicenseConfig {
            capacity: 0,
            ..LicenseConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_interval_not_shorter_than_timeout() {
        let config = LicenseConfig {
            capacity: 2,
            timeout_seconds: 5,
            sweep_interval_seconds: 5,
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Configuration);
    }
}
