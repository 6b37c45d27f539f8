use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};
#[cfg(unix)]
use graphpipe_transport::FifoReader;
use tracing::{debug, trace};

use crate::codec::{decode_line, Command, LineConfig};
use crate::error::{LineError, Result};

const READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads complete command lines from any `Read` stream.
///
/// Handles partial reads internally; callers always get whole commands. A
/// read that times out surfaces as `LineError::Io` with the partial line kept
/// in the buffer, so the next call resumes where it left off.
///
/// A line that outgrows `max_line_len` before its terminator arrives is
/// reported once as `LineTooLong`; the rest of it is dropped as it arrives and
/// reading resumes after the next `\n`.
pub struct LineReader<T> {
    inner: T,
    buf: BytesMut,
    config: LineConfig,
    discarding: bool,
}

impl<T: Read> LineReader<T> {
    /// Create a new line reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, LineConfig::default())
    }

    /// Create a new line reader with explicit configuration.
    pub fn with_config(inner: T, config: LineConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(config.max_line_len.min(READ_CHUNK_SIZE)),
            config,
            discarding: false,
        }
    }

    /// Read the next complete command (blocking).
    ///
    /// Returns `Err(LineError::ConnectionClosed)` when EOF is reached.
    pub fn read_command(&mut self) -> Result<Command> {
        loop {
            if self.discarding {
                self.skip_to_terminator();
            }

            if !self.discarding {
                let terminated = self.buf.contains(&b'\n');
                match decode_line(&mut self.buf, self.config.max_line_len) {
                    Ok(Some(command)) => {
                        trace!(%command, "decoded command line");
                        return Ok(command);
                    }
                    Ok(None) => {}
                    Err(err @ LineError::LineTooLong { .. }) if !terminated => {
                        debug!(dropped = self.buf.len(), "discarding oversized line");
                        self.buf.clear();
                        self.discarding = true;
                        return Err(err);
                    }
                    Err(err) => return Err(err),
                }
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LineError::Io(err)),
            };

            if read == 0 {
                return Err(LineError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&chunk[..read]);
        }
    }

    fn skip_to_terminator(&mut self) {
        match self.buf.iter().position(|b| *b == b'\n') {
            Some(pos) => {
                self.buf.advance(pos + 1);
                self.discarding = false;
            }
            None => self.buf.clear(),
        }
    }

    /// Bytes received but not yet returned as a command.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current line reader configuration.
    pub fn config(&self) -> &LineConfig {
        &self.config
    }
}

#[cfg(unix)]
impl LineReader<FifoReader> {
    /// Create a line reader for a FIFO and apply the read timeout from config.
    pub fn with_config_fifo(mut inner: FifoReader, config: LineConfig) -> Self {
        inner.set_read_timeout(config.read_timeout);
        Self::with_config(inner, config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::ValidationError;
    use crate::verb::Verb;

    #[test]
    fn read_single_command() {
        let mut reader = LineReader::new(Cursor::new(b"add Node1\n".to_vec()));
        let command = reader.read_command().unwrap();
        assert_eq!(command.verb(), Verb::Add);
        assert_eq!(command.label(), "Node1");
    }

    #[test]
    fn read_multiple_commands() {
        let mut reader = LineReader::new(Cursor::new(b"add a\nadd b\nadd c\n".to_vec()));

        let labels: Vec<String> = (0..3)
            .map(|_| reader.read_command().unwrap().label().to_string())
            .collect();

        assert_eq!(labels, ["a", "b", "c"]);
        assert!(matches!(
            reader.read_command(),
            Err(LineError::ConnectionClosed)
        ));
    }

    #[test]
    fn partial_read_handling() {
        let byte_reader = ByteByByteReader {
            bytes: b"add slow node\n".to_vec(),
            pos: 0,
        };
        let mut reader = LineReader::new(byte_reader);

        let command = reader.read_command().unwrap();
        assert_eq!(command.label(), "slow node");
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = LineReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_command().unwrap_err();
        assert!(matches!(err, LineError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_line() {
        let mut reader = LineReader::new(Cursor::new(b"add trunc".to_vec()));
        let err = reader.read_command().unwrap_err();
        assert!(matches!(err, LineError::ConnectionClosed));
        assert_eq!(reader.pending(), 9);
    }

    #[test]
    fn invalid_line_does_not_poison_stream() {
        let mut reader = LineReader::new(Cursor::new(b"add \nadd ok\n".to_vec()));
        let err = reader.read_command().unwrap_err();
        assert!(matches!(err, LineError::Invalid(ValidationError::EmptyLabel)));
        assert_eq!(reader.read_command().unwrap().label(), "ok");
    }

    #[test]
    fn oversized_line_rejected() {
        let config = LineConfig {
            max_line_len: 16,
            ..LineConfig::default()
        };
        let mut reader = LineReader::with_config(Cursor::new(vec![b'x'; 64]), config);
        let err = reader.read_command().unwrap_err();
        assert!(matches!(err, LineError::LineTooLong { .. }));
    }

    #[test]
    fn reading_resumes_after_unterminated_oversized_line() {
        let config = LineConfig {
            max_line_len: 16,
            ..LineConfig::default()
        };
        let mut first = b"add ".to_vec();
        first.extend_from_slice(&[b'x'; 20]);
        let mut reader = LineReader::with_config(
            Chunked {
                chunks: vec![first, b"xxxx".to_vec(), b"yyy\nadd ok\n".to_vec()],
            },
            config,
        );

        let err = reader.read_command().unwrap_err();
        assert!(matches!(err, LineError::LineTooLong { .. }));
        assert_eq!(reader.pending(), 0);

        let command = reader.read_command().unwrap();
        assert_eq!(command.verb(), Verb::Add);
        assert_eq!(command.label(), "ok");
        assert!(matches!(
            reader.read_command().unwrap_err(),
            LineError::ConnectionClosed
        ));
    }

    #[test]
    fn terminated_oversized_line_keeps_following_line() {
        let config = LineConfig {
            max_line_len: 16,
            ..LineConfig::default()
        };
        let mut input = b"add ".to_vec();
        input.extend_from_slice(&[b'x'; 20]);
        input.extend_from_slice(b"\nadd next\n");
        let mut reader = LineReader::with_config(Cursor::new(input), config);

        assert!(matches!(
            reader.read_command().unwrap_err(),
            LineError::LineTooLong { .. }
        ));
        assert_eq!(reader.read_command().unwrap().label(), "next");
    }

    #[test]
    fn timeout_keeps_partial_line() {
        let mut reader = LineReader::new(TimeoutBetweenChunks {
            chunks: vec![b"add pa".to_vec(), b"rtial\n".to_vec()],
            timed_out: false,
        });

        let err = reader.read_command().unwrap_err();
        assert!(matches!(err, LineError::Io(ref e) if e.kind() == ErrorKind::TimedOut));
        assert_eq!(reader.read_command().unwrap().label(), "partial");
    }

    #[test]
    fn interrupted_read_is_retried() {
        let mut reader = LineReader::new(InterruptedOnce {
            interrupted: false,
            inner: Cursor::new(b"add again\n".to_vec()),
        });
        assert_eq!(reader.read_command().unwrap().label(), "again");
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut reader = LineReader::new(Cursor::new(Vec::<u8>::new()));
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        assert_eq!(reader.config().max_line_len, crate::DEFAULT_MAX_LINE);
        let _inner = reader.into_inner();
    }

    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    struct TimeoutBetweenChunks {
        chunks: Vec<Vec<u8>>,
        timed_out: bool,
    }

    impl Read for TimeoutBetweenChunks {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.chunks.len() == 1 && !self.timed_out {
                self.timed_out = true;
                return Err(std::io::Error::from(ErrorKind::TimedOut));
            }
            if self.chunks.is_empty() {
                return Ok(0);
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    struct Chunked {
        chunks: Vec<Vec<u8>>,
    }

    impl Read for Chunked {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.chunks.is_empty() {
                return Ok(0);
            }
            let chunk = self.chunks.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    struct InterruptedOnce {
        interrupted: bool,
        inner: Cursor<Vec<u8>>,
    }

    impl Read for InterruptedOnce {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.inner.read(buf)
        }
    }
}
