use std::path::PathBuf;
use std::time::Duration;

use graphpipe_command::{LineConfig, DEFAULT_MAX_LINE};
use graphpipe_transport::FifoConfig;

use crate::error::ConfigError;

/// Channel path used when none is configured, relative to the working directory.
pub const DEFAULT_CHANNEL_PATH: &str = "graph_pipe";

/// How long a delivery waits for the engine to attach by default.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

/// Environment variable overriding the channel path.
pub const PATH_ENV: &str = "GRAPHPIPE_PATH";

/// Environment variable overriding the open timeout (e.g. `2s`, `500ms`).
pub const TIMEOUT_ENV: &str = "GRAPHPIPE_TIMEOUT";

/// Settings for a [`CommandBridge`](crate::CommandBridge).
///
/// Built once at startup and handed to the bridge; nothing is read from the
/// environment after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// FIFO shared with the graph engine.
    pub path: PathBuf,
    /// Upper bound on waiting for the engine to attach, per submission.
    pub timeout: Duration,
    /// Delay between open attempts while waiting for the engine.
    pub poll_interval: Duration,
    /// Longest accepted command line, terminator included.
    pub max_line_len: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CHANNEL_PATH),
            timeout: DEFAULT_TIMEOUT,
            poll_interval: FifoConfig::default().poll_interval,
            max_line_len: DEFAULT_MAX_LINE,
        }
    }
}

impl BridgeConfig {
    /// Default settings on an explicit channel path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Override the open timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the open poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Override the maximum line length.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len;
        self
    }

    /// Defaults overridden by `GRAPHPIPE_PATH` and `GRAPHPIPE_TIMEOUT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`, keyed like the environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(path) = lookup(PATH_ENV) {
            if path.trim().is_empty() {
                return Err(ConfigError::EmptyPath);
            }
            config.path = PathBuf::from(path);
        }
        if let Some(timeout) = lookup(TIMEOUT_ENV) {
            config.timeout = parse_duration(&timeout)?;
        }
        Ok(config)
    }

    /// Transport settings for opening the channel.
    pub fn fifo_config(&self) -> FifoConfig {
        FifoConfig {
            open_timeout: self.timeout,
            poll_interval: self.poll_interval,
        }
    }

    /// Encoder settings for validating commands.
    pub fn line_config(&self) -> LineConfig {
        LineConfig {
            max_line_len: self.max_line_len,
            ..LineConfig::default()
        }
    }
}

/// Longest duration `parse_duration` accepts.
const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// Parse a duration like `2s`, `500ms`, or bare seconds (`3`), at most 24h.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    let trimmed = input.trim();
    let invalid = |reason| ConfigError::InvalidDuration {
        value: input.to_string(),
        reason,
    };
    if trimmed.is_empty() {
        return Err(invalid("duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = trimmed.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = trimmed.strip_suffix('s') {
        (num, false)
    } else {
        (trimmed, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| invalid("expected a whole number with optional ms/s unit"))?;

    if value == 0 {
        return Err(invalid("duration must be greater than zero"));
    }

    let duration = if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    };
    if duration > MAX_DURATION {
        return Err(invalid("duration must be at most 24h"));
    }
    Ok(duration)
}
