use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use graphpipe_command::{EncodedLine, LineWriter};
use graphpipe_transport::FifoConfig;
#[cfg(unix)]
use graphpipe_transport::FifoWriter;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ChannelError;

/// Transport-level acknowledgement of a delivered line.
///
/// The line was accepted by the pipe; nothing is known about whether the
/// engine has processed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ack {
    /// Bytes written to the channel, terminator included.
    pub bytes_written: usize,
    /// Time from the first open attempt to the release of the handle.
    #[serde(serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

/// Opens the engine's FIFO, writes one line, and closes it again.
///
/// Each delivery acquires its own handle and releases it before returning,
/// whatever the outcome. A `ChannelWriter` does not serialize callers; that is
/// the job of [`CommandBridge`](crate::CommandBridge).
#[derive(Debug, Clone)]
pub struct ChannelWriter {
    #[cfg_attr(not(unix), allow(dead_code))]
    config: FifoConfig,
}

impl ChannelWriter {
    /// Create a writer that acquires the FIFO with `config`.
    ///
    /// The open timeout is supplied per delivery; only the remaining settings
    /// (such as the poll interval) are taken from `config`.
    pub fn new(config: FifoConfig) -> Self {
        Self { config }
    }

    /// Deliver `line` to the FIFO at `path`, waiting at most `timeout` for a
    /// reader to attach.
    pub fn deliver(
        &self,
        path: &Path,
        line: &EncodedLine,
        timeout: Duration,
    ) -> Result<Ack, ChannelError> {
        let started = Instant::now();
        let result = self
            .open_channel(path, timeout)
            .and_then(|mut handle| write_line(&mut handle, line));

        match result {
            Ok(bytes_written) => {
                let ack = Ack {
                    bytes_written,
                    elapsed: started.elapsed(),
                };
                debug!(
                    path = %path.display(),
                    line = %line.display_text(),
                    bytes = ack.bytes_written,
                    elapsed = ?ack.elapsed,
                    "delivered command"
                );
                Ok(ack)
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    kind = err.kind().as_str(),
                    error = %err,
                    "command delivery failed"
                );
                Err(err)
            }
        }
    }

    /// Acquire the write end of the FIFO at `path`.
    ///
    /// The handle closes the descriptor when dropped.
    #[cfg(unix)]
    pub fn open_channel(&self, path: &Path, timeout: Duration) -> Result<FifoWriter, ChannelError> {
        let config = self.config.with_open_timeout(timeout);
        FifoWriter::open(path, &config).map_err(ChannelError::from)
    }

    #[cfg(not(unix))]
    pub fn open_channel(
        &self,
        path: &Path,
        _timeout: Duration,
    ) -> Result<std::fs::File, ChannelError> {
        Err(ChannelError::Io {
            detail: format!(
                "cannot open {}: named pipes require a Unix platform",
                path.display()
            ),
        })
    }
}

/// Write one complete line to an open channel handle.
///
/// A broken pipe or a zero-byte write means the reader went away and is
/// reported as [`ChannelError::ConnectionLost`].
pub fn write_line<W: Write>(handle: &mut W, line: &EncodedLine) -> Result<usize, ChannelError> {
    LineWriter::new(handle)
        .write_line(line)
        .map_err(ChannelError::from)
}

fn serialize_millis<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
}
