use std::fmt;

use graphpipe_command::{LineError, ValidationError};
use graphpipe_transport::TransportError;
use serde::Serialize;

/// Coarse classification of a delivery failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelErrorKind {
    /// No reader attached in time, or the FIFO does not exist.
    EngineUnavailable,
    /// The reader closed its end before the line was written.
    ConnectionLost,
    /// Any other transport failure.
    #[serde(rename = "io-error")]
    Io,
}

impl ChannelErrorKind {
    /// Stable machine-readable name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EngineUnavailable => "engine-unavailable",
            Self::ConnectionLost => "connection-lost",
            Self::Io => "io-error",
        }
    }
}

impl fmt::Display for ChannelErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while delivering a line to the engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// No reader attached within the timeout, or the channel path is missing.
    #[error("graph engine unavailable: {detail}")]
    EngineUnavailable { detail: String },

    /// The reader closed its end before the write completed.
    #[error("connection to graph engine lost: {detail}")]
    ConnectionLost { detail: String },

    /// Unexpected transport failure (permissions, wrong file type, ...).
    #[error("channel I/O error: {detail}")]
    Io { detail: String },
}

impl ChannelError {
    /// The failure classification.
    pub fn kind(&self) -> ChannelErrorKind {
        match self {
            Self::EngineUnavailable { .. } => ChannelErrorKind::EngineUnavailable,
            Self::ConnectionLost { .. } => ChannelErrorKind::ConnectionLost,
            Self::Io { .. } => ChannelErrorKind::Io,
        }
    }

    /// Human-readable detail, surfaced verbatim.
    pub fn detail(&self) -> &str {
        match self {
            Self::EngineUnavailable { detail }
            | Self::ConnectionLost { detail }
            | Self::Io { detail } => detail,
        }
    }

    /// Whether retrying the same submission later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::EngineUnavailable { .. } | Self::ConnectionLost { .. }
        )
    }

    pub(crate) fn from_io(err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::BrokenPipe => Self::ConnectionLost {
                detail: err.to_string(),
            },
            std::io::ErrorKind::NotFound => Self::EngineUnavailable {
                detail: err.to_string(),
            },
            _ => Self::Io {
                detail: err.to_string(),
            },
        }
    }
}

impl From<TransportError> for ChannelError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NotFound { .. } | TransportError::NoReader { .. } => {
                Self::EngineUnavailable {
                    detail: err.to_string(),
                }
            }
            TransportError::Io(ref source) => Self::from_io(source),
            other => Self::Io {
                detail: other.to_string(),
            },
        }
    }
}

impl From<LineError> for ChannelError {
    fn from(err: LineError) -> Self {
        match err {
            LineError::ConnectionClosed => Self::ConnectionLost {
                detail: "reader closed the channel (zero-byte write)".to_string(),
            },
            LineError::Io(ref source) => Self::from_io(source),
            other => Self::Io {
                detail: other.to_string(),
            },
        }
    }
}

/// Errors returned by [`CommandBridge::submit`](crate::CommandBridge::submit).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The command was rejected; the channel was not touched.
    #[error("invalid command: {0}")]
    Validation(#[from] ValidationError),

    /// The command was valid but could not be delivered.
    #[error(transparent)]
    Channel(#[from] ChannelError),
}

impl BridgeError {
    /// Whether retrying the same submission later may succeed.
    ///
    /// Validation failures never are; they need different input.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::Channel(err) => err.is_retryable(),
        }
    }
}

/// Errors in bridge configuration values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A duration string could not be parsed.
    #[error("invalid duration {value:?}: {reason}")]
    InvalidDuration { value: String, reason: &'static str },

    /// The channel path is empty.
    #[error("channel path must not be empty")]
    EmptyPath,
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use std::io::{Error, ErrorKind};
    use std::path::PathBuf;
    use std::time::Duration;

    use super::*;

    #[test]
    fn transport_errors_classify_by_recovery_action() {
        let missing = ChannelError::from(TransportError::NotFound {
            path: PathBuf::from("graph_pipe"),
        });
        assert_eq!(missing.kind(), ChannelErrorKind::EngineUnavailable);

        let no_reader = ChannelError::from(TransportError::NoReader {
            path: PathBuf::from("graph_pipe"),
            waited: Duration::from_secs(2),
        });
        assert_eq!(no_reader.kind(), ChannelErrorKind::EngineUnavailable);

        let not_fifo = ChannelError::from(TransportError::NotFifo {
            path: PathBuf::from("graph_pipe"),
        });
        assert_eq!(not_fifo.kind(), ChannelErrorKind::Io);
        assert!(not_fifo.detail().contains("not a fifo"));

        let denied = ChannelError::from(TransportError::Open {
            path: PathBuf::from("graph_pipe"),
            source: Error::from(ErrorKind::PermissionDenied),
        });
        assert_eq!(denied.kind(), ChannelErrorKind::Io);
        assert!(!denied.is_retryable());
    }

    #[test]
    fn line_errors_classify_broken_pipe_as_lost() {
        let lost = ChannelError::from(LineError::Io(Error::from(ErrorKind::BrokenPipe)));
        assert_eq!(lost.kind(), ChannelErrorKind::ConnectionLost);
        assert!(lost.is_retryable());

        let closed = ChannelError::from(LineError::ConnectionClosed);
        assert_eq!(closed.kind(), ChannelErrorKind::ConnectionLost);

        let other = ChannelError::from(LineError::Io(Error::other("disk on fire")));
        assert_eq!(other.kind(), ChannelErrorKind::Io);
        assert_eq!(other.detail(), "disk on fire");
    }

    #[test]
    fn bridge_error_retryability() {
        assert!(!BridgeError::from(ValidationError::EmptyLabel).is_retryable());
        assert!(BridgeError::from(ChannelError::EngineUnavailable {
            detail: "x".to_string()
        })
        .is_retryable());
    }

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(
            ChannelErrorKind::EngineUnavailable.as_str(),
            "engine-unavailable"
        );
        assert_eq!(ChannelErrorKind::ConnectionLost.as_str(), "connection-lost");
        assert_eq!(ChannelErrorKind::Io.as_str(), "io-error");
    }
}
