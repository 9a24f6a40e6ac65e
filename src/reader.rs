use std::io::{self, Read};

use log::{debug, trace};

use crate::error::ParseError;
use crate::parser::{ParseState, Parser, ParserConfig, Request};

/// Growable read buffer holding bytes not yet consumed by the parser.
///
/// Capacity starts at `initial_size` and doubles whenever the buffer is full.
/// Bytes in `[0, filled)` are unconsumed input.
#[derive(Debug)]
pub(crate) struct ReadBuffer {
    buf: Vec<u8>,
    filled: usize,
    max_size: Option<usize>,
}

impl ReadBuffer {
    pub(crate) fn new(initial_size: usize, max_size: Option<usize>) -> Self {
        Self {
            buf: vec![0; initial_size.max(1)],
            filled: 0,
            max_size,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Unconsumed bytes.
    pub(crate) fn filled(&self) -> &[u8] {
        &self.buf[..self.filled]
    }

    /// Double the capacity if no free space is left, keeping the contents.
    fn reserve(&mut self) -> Result<(), ParseError> {
        if self.filled < self.buf.len() {
            return Ok(());
        }
        let new_len = self.buf.len() * 2;
        if let Some(limit) = self.max_size
            && new_len > limit
        {
            return Err(ParseError::RequestTooLarge { limit });
        }
        debug!("growing read buffer {} -> {} bytes", self.buf.len(), new_len);
        self.buf.resize(new_len, 0);
        Ok(())
    }

    /// Perform one read into the free tail. Returns the number of bytes read;
    /// `0` means end of stream.
    fn fill_from<R: Read>(&mut self, reader: &mut R) -> Result<usize, ParseError> {
        self.reserve()?;
        loop {
            match reader.read(&mut self.buf[self.filled..]) {
                Ok(n) => {
                    self.filled += n;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Drop the first `n` bytes and slide the rest to the front.
    fn consume(&mut self, n: usize) {
        debug_assert!(n <= self.filled);
        self.buf.copy_within(n..self.filled, 0);
        self.filled -= n;
    }
}

/// Read and parse one complete request from `reader`.
///
/// Uses the default [`ParserConfig`]. See [`request_from_reader_with_config`].
///
/// # Errors
///
/// Returns [`ParseError`] on malformed input, on a read failure, or with
/// [`ParseError::IncompleteRequest`] if the stream ends before the request
/// is complete.
pub fn request_from_reader<R: Read>(reader: R) -> Result<Request, ParseError> {
    request_from_reader_with_config(reader, ParserConfig::default())
}

/// Read and parse one complete request from `reader` using custom limits.
///
/// Reads are issued one at a time into a buffer that doubles whenever it
/// fills up. After each read the parser consumes whatever whole grammar
/// elements are available and the remainder is kept for the next round.
///
/// # Errors
///
/// As [`request_from_reader`], plus [`ParseError::RequestTooLarge`] when the
/// buffer would outgrow `config.max_buffer_size` or the declared
/// `Content-Length` exceeds `config.max_body_size`.
pub fn request_from_reader_with_config<R: Read>(
    mut reader: R,
    config: ParserConfig,
) -> Result<Request, ParseError> {
    let mut buffer = ReadBuffer::new(config.initial_buffer_size, config.max_buffer_size);
    let mut parser = Parser::with_config(&config);

    while parser.state() != ParseState::Done {
        let n = buffer.fill_from(&mut reader)?;
        if n == 0 {
            return Err(ParseError::IncompleteRequest {
                state: parser.state(),
            });
        }
        trace!(
            "read {n} bytes, {}/{} buffered",
            buffer.filled,
            buffer.capacity()
        );

        let consumed = parser.parse(buffer.filled())?;
        buffer.consume(consumed);
    }

    parser.finish()
}

/// A [`Read`] adapter that returns at most `chunk_size` bytes per call.
///
/// Simulates a peer whose data arrives in small TCP segments.
///
/// ```rust
/// use reqframe::{FragmentedReader, request_from_reader};
///
/// let raw = b"GET / HTTP/1.1\r\nHost: a\r\n\r\n";
/// let request = request_from_reader(FragmentedReader::new(&raw[..], 3)).unwrap();
/// assert_eq!(request.request_line.method, "GET");
/// ```
#[derive(Debug)]
pub struct FragmentedReader<R> {
    inner: R,
    chunk_size: usize,
}

impl<R> FragmentedReader<R> {
    /// Wrap `inner`, capping every read at `chunk_size` bytes (at least 1).
    pub fn new(inner: R, chunk_size: usize) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1),
        }
    }
}

impl<R: Read> Read for FragmentedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = buf.len().min(self.chunk_size);
        self.inner.read(&mut buf[..len])
    }
}
