use std::fmt;
use std::io;

use graphpipe_bridge::{BridgeError, ChannelError, ConfigError};
use graphpipe_command::LineError;
use graphpipe_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const ENGINE_UNAVAILABLE: i32 = 3;
pub const HEALTH_CHECK_FAILED: i32 = 30;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound => ENGINE_UNAVAILABLE,
        io::ErrorKind::BrokenPipe => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Create { source, .. }
        | TransportError::Open { source, .. }
        | TransportError::Io(source) => io_error(context, source),
        TransportError::NotFound { .. } | TransportError::NoReader { .. } => {
            CliError::new(ENGINE_UNAVAILABLE, format!("{context}: {err}"))
        }
        TransportError::InvalidPath { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        TransportError::NotFifo { .. } => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn line_error(context: &str, err: LineError) -> CliError {
    match err {
        LineError::Io(source) => io_error(context, source),
        LineError::Invalid(_) | LineError::LineTooLong { .. } | LineError::InvalidUtf8 => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        LineError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn bridge_error(context: &str, err: &BridgeError) -> CliError {
    let code = match err {
        BridgeError::Validation(_) => DATA_INVALID,
        BridgeError::Channel(ChannelError::EngineUnavailable { .. }) => ENGINE_UNAVAILABLE,
        BridgeError::Channel(ChannelError::ConnectionLost { .. }) => FAILURE,
        BridgeError::Channel(ChannelError::Io { .. }) => FAILURE,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn config_error(context: &str, err: ConfigError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}
