//! An [`InputSource`] over any byte reader.

use std::collections::VecDeque;
use std::io::{self, Read};

use promptline_core::{InputError, InputSource, KeyEvent};

use crate::decoder::KeyDecoder;

const READ_CHUNK: usize = 1024;

/// Decodes key events from a [`Read`] implementation such as stdin, a pty
/// or a byte slice in tests.
///
/// Each `read` is decoded as a unit: an `ESC` still pending once a read has
/// been decoded is reported as the Escape key. End of the reader flushes
/// whatever the decoder holds and then reports end of stream.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use promptline_io::{ByteStreamSource, InputSource, Key};
///
/// let mut source = ByteStreamSource::new(Cursor::new(b"a\x1b[D".to_vec()));
/// assert_eq!(source.read_event().unwrap().unwrap().text.as_deref(), Some("a"));
/// assert_eq!(source.read_event().unwrap().unwrap().key, Key::Left);
/// assert!(source.read_event().unwrap().is_none());
/// ```
pub struct ByteStreamSource<R> {
    reader: R,
    decoder: KeyDecoder,
    queue: VecDeque<KeyEvent>,
    exhausted: bool,
}

impl<R: Read> ByteStreamSource<R> {
    pub fn new(reader: R) -> Self {
        Self::with_decoder(reader, KeyDecoder::new())
    }

    pub fn with_decoder(reader: R, decoder: KeyDecoder) -> Self {
        ByteStreamSource {
            reader,
            decoder,
            queue: VecDeque::new(),
            exhausted: false,
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Read once and queue what the bytes decode to.
    fn fill(&mut self) -> Result<(), InputError> {
        let mut chunk = [0u8; READ_CHUNK];
        let read = loop {
            match self.reader.read(&mut chunk) {
                Ok(read) => break read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        };

        if read == 0 {
            log::debug!("byte stream closed");
            self.exhausted = true;
            self.queue.extend(self.decoder.flush());
            return Ok(());
        }

        log::trace!("read {read} bytes");
        self.queue.extend(self.decoder.feed(&chunk[..read]));
        self.queue.extend(self.decoder.settle_escape());
        Ok(())
    }
}

impl ByteStreamSource<io::Stdin> {
    /// Read from the process's standard input. Putting the terminal into raw
    /// mode is left to the caller.
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

impl<R: Read + Send> InputSource for ByteStreamSource<R> {
    fn read_event(&mut self) -> Result<Option<KeyEvent>, InputError> {
        loop {
            if let Some(event) = self.queue.pop_front() {
                return Ok(Some(event));
            }
            if self.exhausted {
                return Ok(None);
            }
            self.fill()?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptline_core::Key;

    /// Hands out one pre-split chunk per read.
    struct Chunked {
        chunks: VecDeque<io::Result<Vec<u8>>>,
    }

    impl Chunked {
        fn new(chunks: Vec<io::Result<Vec<u8>>>) -> Self {
            Chunked {
                chunks: chunks.into(),
            }
        }
    }

    impl Read for Chunked {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(err)) => Err(err),
                None => Ok(0),
            }
        }
    }

    fn drain<R: Read + Send>(source: &mut ByteStreamSource<R>) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        while let Some(event) = source.read_event().unwrap() {
            events.push(event);
        }
        events
    }

    #[test]
    fn test_lone_escape_per_read() {
        let mut source = ByteStreamSource::new(Chunked::new(vec![
            Ok(b"\x1b".to_vec()),
            Ok(b"x".to_vec()),
        ]));
        let events = drain(&mut source);
        assert_eq!(events[0].key, Key::Escape);
        assert_eq!(events[1].text.as_deref(), Some("x"));
    }

    #[test]
    fn test_csi_split_between_reads() {
        let mut source = ByteStreamSource::new(Chunked::new(vec![
            Ok(b"\x1b[".to_vec()),
            Ok(b"3~".to_vec()),
        ]));
        let events = drain(&mut source);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].key, Key::Delete);
    }

    #[test]
    fn test_interrupted_read_is_retried() {
        let mut source = ByteStreamSource::new(Chunked::new(vec![
            Err(io::Error::from(io::ErrorKind::Interrupted)),
            Ok(b"\t".to_vec()),
        ]));
        assert_eq!(source.read_event().unwrap().unwrap().key, Key::Tab);
        assert!(source.read_event().unwrap().is_none());
    }

    #[test]
    fn test_read_error_surfaces() {
        let mut source = ByteStreamSource::new(Chunked::new(vec![
            Ok(b"a".to_vec()),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "tty gone")),
        ]));
        assert!(source.read_event().unwrap().is_some());
        let err = source.read_event().unwrap_err();
        assert!(matches!(err, InputError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn test_end_of_stream_flushes_partial_utf8() {
        let mut source = ByteStreamSource::new(Chunked::new(vec![Ok(vec![b'o', 0xe6])]));
        let events = drain(&mut source);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].raw_bytes, [0xe6]);
        assert!(source.read_event().unwrap().is_none());
    }
}
