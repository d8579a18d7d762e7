//! Monitor configuration

use std::time::Duration;

/// Default pause between the end of one poll and the start of the next
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Polling behaviour of a [`TaskMonitor`](super::TaskMonitor)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Pause between two polls, measured from the end of one to the start of the next
    pub poll_interval: Duration,

    /// Deadline applied to every session, `None` to wait until cancelled
    ///
    /// A bound too large to add to the current instant also means no deadline.
    pub max_wait: Option<Duration>,
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_wait: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = Some(max_wait);
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}
