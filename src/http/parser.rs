//! Incremental request reader.
//!
//! [`RequestParser`] owns a single growable buffer and a fill cursor. Bytes
//! are read into the tail, the [`Request`] state machine consumes what it
//! can from the front, and the unconsumed remainder is shifted back to
//! offset 0. The buffer doubles whenever it is full, up to a fixed ceiling.

use async_std::io::{Read, ReadExt};
use log::trace;

use crate::error::ParseError;
use crate::http::request::{ParseState, Request};

pub const DEFAULT_BUFFER_SIZE: usize = 128;
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 1024 * 1024; // 1 MB

pub struct RequestParser {
    buf: Vec<u8>,
    filled: usize,
    max_size: usize,
}

impl Default for RequestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestParser {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_BUFFER_SIZE, DEFAULT_MAX_REQUEST_SIZE)
    }

    /// `initial` is the starting buffer capacity, `max_size` the largest
    /// the buffer may grow to while waiting for a parse step to complete.
    pub fn with_limits(initial: usize, max_size: usize) -> Self {
        let initial = initial.max(1);
        Self {
            buf: vec![0; initial],
            filled: 0,
            max_size: max_size.max(initial),
        }
    }

    /// Reads from `reader` until a complete request has been parsed.
    ///
    /// A stream that ends before the request reaches [`ParseState::Done`]
    /// fails with [`ParseError::IncompleteData`].
    pub async fn read_request<R>(mut self, reader: &mut R) -> Result<Request, ParseError>
    where
        R: Read + Unpin,
    {
        let mut req = Request::new();

        while req.state != ParseState::Done {
            if self.filled == self.buf.len() {
                self.grow()?;
            }

            let n = match reader.read(&mut self.buf[self.filled..]).await {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ParseError::Io(e)),
            };
            let eof = n == 0;
            self.filled += n;

            let parsed = req.parse(&self.buf[..self.filled])?;
            if parsed > 0 {
                self.buf.copy_within(parsed..self.filled, 0);
                self.filled -= parsed;
            }
            trace!(
                "read {} bytes, parsed {}, {} buffered, state {:?}",
                n, parsed, self.filled, req.state
            );

            if eof && req.state != ParseState::Done {
                Self::resolve_eof(&mut req)?;
            }
        }

        Ok(req)
    }

    /// The source is exhausted and the last pass made no progress.
    fn resolve_eof(req: &mut Request) -> Result<(), ParseError> {
        if req.state == ParseState::ParsingBody && req.body.len() >= req.content_length()? {
            req.state = ParseState::Done;
            return Ok(());
        }
        Err(ParseError::IncompleteData)
    }

    fn grow(&mut self) -> Result<(), ParseError> {
        if self.buf.len() >= self.max_size {
            return Err(ParseError::RequestTooLarge);
        }
        let new_len = (self.buf.len() * 2).min(self.max_size);
        self.buf.resize(new_len, 0);
        Ok(())
    }
}
