//! Termination timing.
//!
//! Nothing is persisted; callers build a `TerminateConfig` from their own
//! flags and hand it to the terminator.

use std::time::Duration;

/// How long a process gets to exit after SIGTERM before SIGKILL.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(2);

/// How often liveness is probed while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Timing used by graceful termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminateConfig {
    /// Escalation window.
    pub wait: Duration,
    /// Liveness probe interval.
    pub poll_interval: Duration,
}

impl Default for TerminateConfig {
    fn default() -> Self {
        Self {
            wait: DEFAULT_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl TerminateConfig {
    /// Default timing with a different escalation window.
    pub fn with_wait(wait: Duration) -> Self {
        Self {
            wait,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TerminateConfig::default();
        assert_eq!(config.wait, Duration::from_secs(2));
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_with_wait_keeps_poll_interval() {
        let config = TerminateConfig::with_wait(Duration::from_millis(500));
        assert_eq!(config.wait, Duration::from_millis(500));
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
    }
}
