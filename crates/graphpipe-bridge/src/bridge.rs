use graphpipe_command::{encode_with_config, LineConfig, Verb};
use tracing::debug;

use crate::channel::{Ack, ChannelWriter};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::gate::SubmissionGate;

/// Validates graph commands and delivers them to the engine one at a time.
///
/// A bridge is built once from a [`BridgeConfig`] and shared (typically in an
/// `Arc`) by every request handler. Each submission is independent: a failure
/// leaves no state behind and nothing is retried internally.
#[derive(Debug)]
pub struct CommandBridge {
    config: BridgeConfig,
    line_config: LineConfig,
    writer: ChannelWriter,
    gate: SubmissionGate,
}

impl CommandBridge {
    /// Create a bridge for the channel described by `config`.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            line_config: config.line_config(),
            writer: ChannelWriter::new(config.fifo_config()),
            gate: SubmissionGate::new(),
            config,
        }
    }

    /// The configuration this bridge was built with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Submit one command.
    ///
    /// Invalid input is rejected with `BridgeError::Validation` before the
    /// channel is touched. Valid commands wait for their turn, in arrival
    /// order, and are then delivered with the configured timeout.
    pub fn submit(&self, verb: Verb, label: &str) -> Result<Ack> {
        let line = encode_with_config(verb, label, &self.line_config)?;

        let turn = self.gate.enter();
        debug!(ticket = turn.ticket(), line = %line.display_text(), "submitting command");
        let ack = self
            .writer
            .deliver(&self.config.path, &line, self.config.timeout)?;
        drop(turn);

        Ok(ack)
    }

    /// Submit one command given its verb as raw text.
    pub fn submit_str(&self, verb: &str, label: &str) -> Result<Ack> {
        self.submit(verb.parse()?, label)
    }

    /// Submissions currently delivering or waiting for their turn.
    pub fn in_flight(&self) -> u64 {
        self.gate.occupancy()
    }
}
