use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur in FIFO transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to create the FIFO at the specified path.
    #[error("failed to create fifo {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to open the FIFO at the specified path.
    #[error("failed to open fifo {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Nothing exists at the specified path.
    #[error("fifo {path} does not exist")]
    NotFound { path: PathBuf },

    /// The path exists but is not a FIFO.
    #[error("{path} is not a fifo")]
    NotFifo { path: PathBuf },

    /// No reader attached to the FIFO within the open timeout.
    #[error("no reader attached to {path} within {waited:?}")]
    NoReader { path: PathBuf, waited: Duration },

    /// The path cannot be passed to the OS (interior NUL byte).
    #[error("invalid fifo path: {path}")]
    InvalidPath { path: PathBuf },

    /// An I/O error occurred on an open FIFO.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
