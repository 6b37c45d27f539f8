use std::time::Duration;

/// Controls how the write end of a FIFO is acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoConfig {
    /// How long to wait for a reader to attach before giving up.
    pub open_timeout: Duration,
    /// Delay between open attempts while no reader is attached.
    pub poll_interval: Duration,
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self {
            open_timeout: Duration::from_secs(2),
            poll_interval: Duration::from_millis(10),
        }
    }
}

impl FifoConfig {
    /// Same settings with a different open timeout.
    pub fn with_open_timeout(self, open_timeout: Duration) -> Self {
        Self {
            open_timeout,
            ..self
        }
    }
}
