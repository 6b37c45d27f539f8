use serde::Serialize;

use crate::channel::Ack;
use crate::error::{BridgeError, ChannelErrorKind};

/// What a caller reports back after a submission, in serializable form.
///
/// This is the collaborator-facing view of `Result<Ack, BridgeError>`:
/// a web handler can return it as JSON, the CLI prints it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SubmitOutcome {
    /// The line was written to the channel.
    Acked {
        bytes_written: usize,
        elapsed_ms: u64,
    },
    /// The command failed validation and never reached the channel.
    Rejected { reason: &'static str, detail: String },
    /// The command was valid but delivery failed.
    Failed {
        kind: ChannelErrorKind,
        detail: String,
        retryable: bool,
    },
}

impl SubmitOutcome {
    pub fn from_result(result: &Result<Ack, BridgeError>) -> Self {
        match result {
            Ok(ack) => Self::Acked {
                bytes_written: ack.bytes_written,
                elapsed_ms: u64::try_from(ack.elapsed.as_millis()).unwrap_or(u64::MAX),
            },
            Err(BridgeError::Validation(err)) => Self::Rejected {
                reason: err.reason(),
                detail: err.to_string(),
            },
            Err(BridgeError::Channel(err)) => Self::Failed {
                kind: err.kind(),
                detail: err.detail().to_string(),
                retryable: err.is_retryable(),
            },
        }
    }

    pub fn is_acked(&self) -> bool {
        matches!(self, Self::Acked { .. })
    }

    /// One-line summary for humans.
    pub fn message(&self) -> String {
        match self {
            Self::Acked {
                bytes_written,
                elapsed_ms,
            } => format!("acked: {bytes_written} bytes in {elapsed_ms}ms"),
            Self::Rejected { reason, detail } => format!("rejected ({reason}): {detail}"),
            Self::Failed {
                kind,
                detail,
                retryable,
            } => {
                let hint = if *retryable { ", retryable" } else { "" };
                format!("failed ({kind}{hint}): {detail}")
            }
        }
    }
}

impl From<&Result<Ack, BridgeError>> for SubmitOutcome {
    fn from(result: &Result<Ack, BridgeError>) -> Self {
        Self::from_result(result)
    }
}
