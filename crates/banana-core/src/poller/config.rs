use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 60;
pub const DEFAULT_TIMEOUT_MS: u64 = 120_000;

/// Smallest interval and timeout a session runs with.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Timing budget of a poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    /// Delay between the starts of consecutive status checks.
    pub interval: Duration,
    /// Number of status checks before giving up.
    pub max_attempts: u32,
    /// Wall-clock budget, enforced independently of the attempt count.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }
}

impl PollConfig {
    pub fn from_millis(interval_ms: u64, max_attempts: u32, timeout_ms: u64) -> Result<Self, ConfigError> {
        let cfg = Self {
            interval: Duration::from_millis(interval_ms),
            max_attempts,
            timeout: Duration::from_millis(timeout_ms),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Copy with zero values raised to the smallest usable ones: one attempt, 1 ms periods.
    pub fn normalized(self) -> Self {
        Self {
            interval: self.interval.max(MIN_PERIOD),
            max_attempts: self.max_attempts.max(1),
            timeout: self.timeout.max(MIN_PERIOD),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_two_minutes() {
        let cfg = PollConfig::default();
        assert_eq!(cfg.interval, Duration::from_secs(2));
        assert_eq!(cfg.max_attempts, 60);
        assert_eq!(cfg.timeout, Duration::from_secs(120));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_values_are_rejected() {
        assert_eq!(PollConfig::from_millis(0, 3, 1000), Err(ConfigError::ZeroInterval));
        assert_eq!(PollConfig::from_millis(10, 0, 1000), Err(ConfigError::ZeroAttempts));
        assert_eq!(PollConfig::from_millis(10, 3, 0), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn normalized_raises_zero_values() {
        let cfg = PollConfig::default()
            .with_interval(Duration::ZERO)
            .with_max_attempts(0)
            .with_timeout(Duration::ZERO)
            .normalized();
        assert_eq!(cfg.interval, Duration::from_millis(1));
        assert_eq!(cfg.max_attempts, 1);
        assert_eq!(cfg.timeout, Duration::from_millis(1));
        assert!(cfg.validate().is_ok());
        assert_eq!(PollConfig::default().normalized(), PollConfig::default());
    }
}
