//! Named pipe (FIFO) primitives.
//!
//! This is the lowest layer of graphpipe. It knows nothing about commands;
//! it creates FIFOs, opens their write end without hanging when no reader is
//! attached, and opens their read end for consumers.
//!
//! - [`NamedPipe`] creates a FIFO and removes it on drop
//! - [`FifoWriter`] is an owned write handle, closed when dropped
//! - [`FifoReader`] is an owned read handle with optional read timeout

pub mod config;
pub mod error;

#[cfg(unix)]
pub mod fifo;
#[cfg(unix)]
pub mod named;

pub use config::FifoConfig;
pub use error::{Result, TransportError};

/// Largest write a pipe delivers to its reader as one indivisible unit.
///
/// POSIX guarantees at least 512 bytes; Linux provides a full page.
#[cfg(target_os = "linux")]
pub const PIPE_BUF: usize = 4096;
#[cfg(not(target_os = "linux"))]
pub const PIPE_BUF: usize = 512;

#[cfg(unix)]
pub use fifo::{probe_reader, FifoReader, FifoWriter};
#[cfg(unix)]
pub use named::{is_fifo, NamedPipe};
