use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::os::fd::{AsRawFd, RawFd};
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::config::FifoConfig;
use crate::error::{Result, TransportError};

/// Owned write end of a FIFO.
///
/// The descriptor is closed when the writer is dropped, on every path.
pub struct FifoWriter {
    file: File,
    path: PathBuf,
}

impl FifoWriter {
    /// Open the write end of the FIFO at `path`, waiting at most
    /// `config.open_timeout` for a reader to attach.
    ///
    /// A plain blocking open would hang until some reader shows up. Instead
    /// the open is attempted with `O_NONBLOCK`, which fails with `ENXIO` while
    /// no reader exists, and retried until the deadline. Once open, the
    /// descriptor is switched back to blocking mode for the write.
    ///
    /// An `open_timeout` too large to add to the current instant waits
    /// without a deadline.
    pub fn open(path: impl AsRef<Path>, config: &FifoConfig) -> Result<Self> {
        let path = path.as_ref();
        check_fifo(path)?;

        let started = Instant::now();
        let deadline = started.checked_add(config.open_timeout);
        let mut attempts = 0u32;

        loop {
            attempts = attempts.saturating_add(1);
            match open_nonblocking(path, false) {
                Ok(file) => {
                    ensure_fifo_handle(&file, path)?;
                    set_nonblocking(file.as_raw_fd(), false)?;
                    debug!(?path, attempts, elapsed = ?started.elapsed(), "opened fifo for writing");
                    return Ok(Self {
                        file,
                        path: path.to_path_buf(),
                    });
                }
                Err(err) if err.raw_os_error() == Some(libc::ENXIO) => {
                    let now = Instant::now();
                    let pause = match deadline {
                        Some(deadline) if now >= deadline => {
                            return Err(TransportError::NoReader {
                                path: path.to_path_buf(),
                                waited: config.open_timeout,
                            });
                        }
                        Some(deadline) => config.poll_interval.min(deadline - now),
                        None => config.poll_interval,
                    };
                    trace!(?path, attempts, "no reader attached yet");
                    std::thread::sleep(pause);
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    return Err(TransportError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Err(err) => {
                    return Err(TransportError::Open {
                        path: path.to_path_buf(),
                        source: err,
                    });
                }
            }
        }
    }
}

impl Write for FifoWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl AsRawFd for FifoWriter {
    fn as_raw_fd(&self) -> RawFd {
        self.file.as_raw_fd()
    }
}

impl std::fmt::Debug for FifoWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoWriter")
            .field("path", &self.path)
            .field("fd", &self.file.as_raw_fd())
            .finish()
    }
}

/// Owned read end of a FIFO.
pub struct FifoReader {
    file: File,
    /// Write end held by persistent readers so the FIFO never reports EOF
    /// between two writers.
    keepalive: Option<File>,
    read_timeout: Option<Duration>,
}

impl FifoReader {
    /// Open the read end, blocking until a writer opens the FIFO.
    ///
    /// Reads return EOF once the last writer closes.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_fifo(path)?;
        let file = OpenOptions::new()
            .read(true)
            .open(path)
            .map_err(|e| open_error(path, e))?;
        ensure_fifo_handle(&file, path)?;
        debug!(?path, "opened fifo for reading");
        Ok(Self {
            file,
            keepalive: None,
            read_timeout: None,
        })
    }

    /// Open the read end without waiting for a writer.
    ///
    /// The reader counts as attached as soon as this returns. It also holds a
    /// write end of its own, so reads block waiting for data instead of
    /// returning EOF when individual writers come and go.
    pub fn open_persistent(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        check_fifo(path)?;
        let file = open_nonblocking(path, true).map_err(|e| open_error(path, e))?;
        ensure_fifo_handle(&file, path)?;
        let keepalive = open_nonblocking(path, false).map_err(|e| open_error(path, e))?;
        set_nonblocking(file.as_raw_fd(), false)?;
        debug!(?path, "opened persistent fifo reader");
        Ok(Self {
            file,
            keepalive: Some(keepalive),
            read_timeout: None,
        })
    }

    /// Set a read timeout. `None` blocks indefinitely.
    ///
    /// A read that times out fails with `ErrorKind::TimedOut`.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) {
        self.read_timeout = timeout;
    }

    /// Whether this reader keeps the FIFO open across writers.
    pub fn is_persistent(&self) -> bool {
        self.keepalive.is_some()
    }
}

impl Read for FifoReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if let Some(timeout) = self.read_timeout {
            wait_readable(self.file.as_raw_fd(), timeout)?;
        }
        self.file.read(buf)
    }
}

impl std::fmt::Debug for FifoReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FifoReader")
            .field("fd", &self.file.as_raw_fd())
            .field("persistent", &self.keepalive.is_some())
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

/// Check, without blocking, whether a reader is attached to the FIFO.
///
/// The probe opens and immediately closes a write end. A reader that is not
/// persistent observes that as a writer coming and going.
pub fn probe_reader(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    check_fifo(path)?;
    loop {
        match open_nonblocking(path, false) {
            Ok(_file) => return Ok(true),
            Err(err) if err.raw_os_error() == Some(libc::ENXIO) => return Ok(false),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(open_error(path, err)),
        }
    }
}

fn check_fifo(path: &Path) -> Result<()> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.file_type().is_fifo() => Ok(()),
        Ok(_) => Err(TransportError::NotFifo {
            path: path.to_path_buf(),
        }),
        Err(err) => Err(open_error(path, err)),
    }
}

// The path may have been swapped between the metadata check and the open.
fn ensure_fifo_handle(file: &File, path: &Path) -> Result<()> {
    if file.metadata()?.file_type().is_fifo() {
        Ok(())
    } else {
        Err(TransportError::NotFifo {
            path: path.to_path_buf(),
        })
    }
}

fn open_error(path: &Path, err: std::io::Error) -> TransportError {
    if err.kind() == ErrorKind::NotFound {
        TransportError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        TransportError::Open {
            path: path.to_path_buf(),
            source: err,
        }
    }
}

fn open_nonblocking(path: &Path, read: bool) -> std::io::Result<File> {
    OpenOptions::new()
        .read(read)
        .write(!read)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
}

fn set_nonblocking(fd: RawFd, nonblocking: bool) -> std::io::Result<()> {
    // SAFETY: `fd` is an open descriptor owned by the caller; F_GETFL takes no
    // pointer arguments.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(std::io::Error::last_os_error());
    }
    let updated = if nonblocking {
        flags | libc::O_NONBLOCK
    } else {
        flags & !libc::O_NONBLOCK
    };
    if updated != flags {
        // SAFETY: as above; F_SETFL takes an integer flag argument.
        let rc = unsafe { libc::fcntl(fd, libc::F_SETFL, updated) };
        if rc < 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    Ok(())
}

fn wait_readable(fd: RawFd, timeout: Duration) -> std::io::Result<()> {
    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

    // SAFETY: `pfd` is a valid, writable pollfd and the count is exactly one.
    let rc = unsafe { libc::poll(&mut pfd, 1, millis) };
    match rc {
        0 => Err(std::io::Error::new(
            ErrorKind::TimedOut,
            "fifo read timed out",
        )),
        n if n < 0 => Err(std::io::Error::last_os_error()),
        _ => Ok(()),
    }
}
