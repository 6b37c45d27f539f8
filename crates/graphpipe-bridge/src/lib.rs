//! Serialized command delivery to the graph engine.
//!
//! This is the layer the presentation side talks to. Hand a
//! [`CommandBridge`] a verb and a label; it validates them, waits its turn,
//! opens the engine's FIFO with a bounded wait, writes one line, closes the
//! FIFO, and reports a typed outcome.

pub mod bridge;
pub mod channel;
pub mod config;
pub mod error;
pub mod gate;
pub mod outcome;

#[cfg(feature = "async")]
pub mod async_bridge;

pub use bridge::CommandBridge;
pub use channel::{write_line, Ack, ChannelWriter};
pub use config::{
    parse_duration, BridgeConfig, DEFAULT_CHANNEL_PATH, DEFAULT_TIMEOUT, PATH_ENV, TIMEOUT_ENV,
};
pub use error::{BridgeError, ChannelError, ChannelErrorKind, ConfigError, Result};
pub use gate::{GateGuard, SubmissionGate};
pub use outcome::SubmitOutcome;

#[cfg(feature = "async")]
pub use async_bridge::AsyncCommandBridge;

pub use graphpipe_command::{Command, EncodedLine, ValidationError, Verb};
