use std::io::{ErrorKind, Write};

use crate::codec::EncodedLine;
use crate::error::{LineError, Result};

/// Writes complete command lines to any `Write` stream.
pub struct LineWriter<T> {
    inner: T,
}

impl<T: Write> LineWriter<T> {
    /// Create a new line writer.
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Write one complete line and flush (blocking).
    ///
    /// A line no longer than `PIPE_BUF` goes out in a single `write` call on a
    /// pipe. Short writes are continued until the whole line is out; a
    /// zero-byte write means the reader is gone.
    pub fn write_line(&mut self, line: &EncodedLine) -> Result<usize> {
        let bytes = line.as_bytes();
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(LineError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LineError::Io(err)),
            }
        }

        self.flush()?;
        Ok(offset)
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(LineError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::codec::encode;
    use crate::verb::Verb;

    #[test]
    fn write_single_line() {
        let mut writer = LineWriter::new(Cursor::new(Vec::<u8>::new()));
        let written = writer
            .write_line(&encode(Verb::Add, "Node1").unwrap())
            .unwrap();

        assert_eq!(written, 10);
        assert_eq!(writer.into_inner().into_inner(), b"add Node1\n");
    }

    #[test]
    fn write_multiple_lines() {
        let mut writer = LineWriter::new(Cursor::new(Vec::<u8>::new()));
        for label in ["one", "two", "three"] {
            writer.write_line(&encode(Verb::Add, label).unwrap()).unwrap();
        }

        assert_eq!(
            writer.into_inner().into_inner(),
            b"add one\nadd two\nadd three\n"
        );
    }

    #[test]
    fn short_writes_are_continued() {
        let mut writer = LineWriter::new(TwoBytesAtATime::default());
        writer.write_line(&encode(Verb::Add, "chunked").unwrap()).unwrap();
        assert_eq!(writer.into_inner().data, b"add chunked\n");
    }

    #[test]
    fn flush_propagates() {
        let sink = FlushTrackingWriter::default();
        let flag = Arc::clone(&sink.flushed);
        let mut writer = LineWriter::new(sink);

        writer.write_line(&encode(Verb::Add, "x").unwrap()).unwrap();

        assert!(flag.load(Ordering::SeqCst));
    }

    #[test]
    fn handles_interrupted_write_and_flush() {
        let mut writer = LineWriter::new(InterruptedWriteThenFlush {
            wrote_once: false,
            flush_interrupted: false,
            data: Vec::new(),
        });
        writer.write_line(&encode(Verb::Add, "retry").unwrap()).unwrap();

        assert_eq!(writer.into_inner().data, b"add retry\n");
    }

    #[test]
    fn connection_closed_when_write_returns_zero() {
        let mut writer = LineWriter::new(ZeroWriter);
        let err = writer
            .write_line(&encode(Verb::Add, "x").unwrap())
            .unwrap_err();
        assert!(matches!(err, LineError::ConnectionClosed));
    }

    #[test]
    fn broken_pipe_surfaces_as_io() {
        let mut writer = LineWriter::new(BrokenPipeWriter);
        let err = writer
            .write_line(&encode(Verb::Add, "x").unwrap())
            .unwrap_err();
        assert!(matches!(err, LineError::Io(ref e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn accessors_and_into_inner() {
        let mut writer = LineWriter::new(Cursor::new(Vec::<u8>::new()));
        let _ = writer.get_ref();
        let _ = writer.get_mut();
        let _inner = writer.into_inner();
    }

    #[derive(Default)]
    struct TwoBytesAtATime {
        data: Vec<u8>,
    }

    impl Write for TwoBytesAtATime {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = buf.len().min(2);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct FlushTrackingWriter {
        flushed: Arc<AtomicBool>,
        data: Vec<u8>,
    }

    impl Write for FlushTrackingWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct InterruptedWriteThenFlush {
        wrote_once: bool,
        flush_interrupted: bool,
        data: Vec<u8>,
    }

    impl Write for InterruptedWriteThenFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.wrote_once {
                self.wrote_once = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.data.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            if !self.flush_interrupted {
                self.flush_interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            Ok(())
        }
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipeWriter;

    impl Write for BrokenPipeWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
