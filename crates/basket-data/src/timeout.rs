//! Timeout configuration for backend calls.

use std::time::Duration;

/// Total budget for one backend call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Timeout configuration for the HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Connection timeout.
    pub connect: Duration,
    /// Total operation timeout.
    pub total: Duration,
}

impl TimeoutConfig {
    pub fn new(connect: Duration, total: Duration) -> Self {
        Self { connect, total }
    }

    /// Create from a single total timeout.
    pub fn from_total(total: Duration) -> Self {
        Self {
            connect: (total / 4).max(Duration::from_millis(100)),
            total,
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::from_total(Duration::from_secs(secs))
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self::from_total(DEFAULT_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_total() {
        let config = TimeoutConfig::from_secs(20);
        assert_eq!(config.total, Duration::from_secs(20));
        assert_eq!(config.connect, Duration::from_secs(5));
    }

    #[test]
    fn test_connect_floor() {
        let config = TimeoutConfig::from_total(Duration::from_millis(100));
        assert_eq!(config.connect, Duration::from_millis(100));
    }
}
