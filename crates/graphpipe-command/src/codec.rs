use std::fmt;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{LineError, ValidationError};
use crate::verb::Verb;

/// Default maximum encoded line length: one atomic pipe write.
pub const DEFAULT_MAX_LINE: usize = graphpipe_transport::PIPE_BUF;

const LINE_TERMINATOR: u8 = b'\n';

/// A validated graph command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: Verb,
    label: String,
}

impl Command {
    /// Validate `label` and build a command.
    ///
    /// A label containing `\n` or `\r` anywhere, including at either end, is
    /// rejected rather than repaired. Other surrounding whitespace is trimmed,
    /// and a label that is empty after trimming is rejected.
    pub fn new(verb: Verb, label: &str) -> Result<Self, ValidationError> {
        if label.contains(|c: char| c == '\n' || c == '\r') {
            return Err(ValidationError::EmbeddedNewline);
        }
        let label = label.trim();
        if label.is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        Ok(Self {
            verb,
            label: label.to_string(),
        })
    }

    /// The command verb.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The trimmed label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Serialize into the wire line.
    pub fn encode(&self) -> EncodedLine {
        let verb = self.verb.as_str();
        let mut buf = BytesMut::with_capacity(verb.len() + 1 + self.label.len() + 1);
        buf.put_slice(verb.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(self.label.as_bytes());
        buf.put_u8(LINE_TERMINATOR);
        EncodedLine(buf.freeze())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.label)
    }
}

/// One command line ready for the wire, terminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedLine(Bytes);

impl EncodedLine {
    /// The raw line bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Line length in bytes, terminator included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; an encoded line carries at least a verb and a terminator.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether a single pipe write delivers this line indivisibly.
    pub fn fits_atomic_write(&self) -> bool {
        self.0.len() <= graphpipe_transport::PIPE_BUF
    }

    /// The line without its terminator, for logging.
    pub fn display_text(&self) -> std::borrow::Cow<'_, str> {
        let body = self.0.strip_suffix(&[LINE_TERMINATOR]).unwrap_or(self.0.as_ref());
        String::from_utf8_lossy(body)
    }

}

impl AsRef<[u8]> for EncodedLine {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Configuration for line encoding and reading.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Maximum line length in bytes, terminator included. Default: `PIPE_BUF`.
    pub max_line_len: usize,
    /// Read timeout for blocking reads on a FIFO.
    pub read_timeout: Option<Duration>,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_len: DEFAULT_MAX_LINE,
            read_timeout: None,
        }
    }
}

/// Validate and encode a command with the default configuration.
pub fn encode(verb: Verb, label: &str) -> Result<EncodedLine, ValidationError> {
    encode_with_config(verb, label, &LineConfig::default())
}

/// Validate and encode a command, enforcing `config.max_line_len`.
pub fn encode_with_config(
    verb: Verb,
    label: &str,
    config: &LineConfig,
) -> Result<EncodedLine, ValidationError> {
    let line = Command::new(verb, label)?.encode();
    if line.len() > config.max_line_len {
        return Err(ValidationError::LabelTooLong {
            len: line.len(),
            max: config.max_line_len,
        });
    }
    Ok(line)
}

/// Parse the text of one line (without terminator) into a command.
pub fn parse_command(text: &str) -> Result<Command, ValidationError> {
    let (verb, label) = text.split_once(' ').unwrap_or((text, ""));
    Command::new(verb.parse()?, label)
}

/// Decode one command line from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete line yet.
/// A complete line is always consumed, even when it fails to parse, so the
/// next call starts at the following line. A `\r` before the terminator is
/// dropped.
///
/// When the buffer holds no terminator but already exceeds `max_line_len`,
/// `LineTooLong` is returned and the buffer is left as it is; the caller must
/// discard input up to the next terminator (as [`LineReader`] does) before
/// decoding again.
///
/// [`LineReader`]: crate::LineReader
pub fn decode_line(src: &mut BytesMut, max_line_len: usize) -> Result<Option<Command>, LineError> {
    let Some(pos) = src.iter().position(|b| *b == LINE_TERMINATOR) else {
        if src.len() >= max_line_len {
            return Err(LineError::LineTooLong {
                size: src.len(),
                max: max_line_len,
            });
        }
        return Ok(None);
    };

    let line = src.split_to(pos + 1);
    if line.len() > max_line_len {
        return Err(LineError::LineTooLong {
            size: line.len(),
            max: max_line_len,
        });
    }

    let body = &line[..pos];
    let body = body.strip_suffix(&b"\r"[..]).unwrap_or(body);
    let text = std::str::from_utf8(body).map_err(|_| LineError::InvalidUtf8)?;
    Ok(Some(parse_command(text)?))
}
