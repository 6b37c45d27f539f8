/// Reasons a command is rejected before it reaches the channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The label is empty after trimming surrounding whitespace.
    #[error("label is empty")]
    EmptyLabel,

    /// The label contains a newline or carriage return.
    #[error("label contains a line terminator")]
    EmbeddedNewline,

    /// The verb is not part of the supported command set.
    #[error("unknown verb: {0:?}")]
    UnknownVerb(String),

    /// The encoded line would not fit in a single atomic pipe write.
    #[error("encoded line too long ({len} bytes, max {max})")]
    LabelTooLong { len: usize, max: usize },
}

impl ValidationError {
    /// Stable machine-readable reason string.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::EmptyLabel => "empty-label",
            Self::EmbeddedNewline => "embedded-newline",
            Self::UnknownVerb(_) => "unknown-verb",
            Self::LabelTooLong { .. } => "label-too-long",
        }
    }
}

/// Errors that can occur while reading or writing command lines.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    /// A complete line was read but does not hold a valid command.
    #[error("invalid command line: {0}")]
    Invalid(#[from] ValidationError),

    /// A line exceeds the configured maximum length.
    #[error("line too long ({size} bytes, max {max})")]
    LineTooLong { size: usize, max: usize },

    /// A line is not valid UTF-8.
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    /// An I/O error occurred while reading or writing lines.
    #[error("line I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The other end closed the channel.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, LineError>;
