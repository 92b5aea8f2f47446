//! Response assembly over a raw byte stream.
//!
//! The writer emits the status line, then the header block, then the body,
//! each at most once. Body bytes passed to [`ResponseWriter::write`] are
//! buffered and only reach the wire in [`ResponseWriter::finalize`]; the
//! chunked path writes frames directly instead.

use async_std::io::{Write, WriteExt};

use crate::error::WriteError;
use crate::http::headers::Headers;
use crate::http::status::StatusCode;
use crate::http::CRLF;

const CONTENT_LENGTH: &str = "content-length";
const CONNECTION: &str = "connection";
const CONTENT_TYPE: &str = "content-type";
const TRANSFER_ENCODING: &str = "transfer-encoding";
const TRAILER: &str = "trailer";

pub struct ResponseWriter<W> {
    conn: W,
    headers: Headers,
    body: Vec<u8>,
    status_written: bool,
    headers_written: bool,
    chunked_done: bool,
    trailers_written: bool,
}

impl<W: Write + Unpin> ResponseWriter<W> {
    pub fn new(conn: W) -> Self {
        Self {
            conn,
            headers: Headers::new(),
            body: Vec::new(),
            status_written: false,
            headers_written: false,
            chunked_done: false,
            trailers_written: false,
        }
    }

    /// `HTTP/1.1 <code> <reason>\r\n`
    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), WriteError> {
        if self.status_written {
            return Err(WriteError::StatusLineAlreadyWritten);
        }

        let line = format!("HTTP/1.1 {} {}\r\n", status, status.reason());
        self.conn.write_all(line.as_bytes()).await?;

        self.status_written = true;
        Ok(())
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.headers.set(name, value);
    }

    pub fn get(&self, name: &str) -> &str {
        self.headers.get(name)
    }

    pub fn delete(&mut self, name: &str) {
        self.headers.delete(name);
    }

    pub fn is_headers_written(&self) -> bool {
        self.headers_written
    }

    /// Buffers body bytes and keeps `content-length` equal to the total
    /// buffered so far.
    pub fn write(&mut self, data: &[u8]) {
        self.body.extend_from_slice(data);
        self.headers
            .replace(CONTENT_LENGTH, &self.body.len().to_string());
    }

    /// Fills in `content-length`, `connection` and `content-type` when the
    /// handler left them unset. A chunked response drops `content-length`
    /// and `connection`.
    pub fn apply_default_headers(&mut self) {
        if !self.headers.contains(CONTENT_LENGTH) {
            self.headers.set(CONTENT_LENGTH, "0");
        }
        if !self.headers.contains(CONNECTION) {
            self.headers.set(CONNECTION, "close");
        }
        if !self.headers.contains(CONTENT_TYPE) {
            self.headers.set(CONTENT_TYPE, "text/plain");
        }
        if self.headers.get(TRANSFER_ENCODING) == "chunked" {
            self.headers.delete(CONTENT_LENGTH);
            self.headers.delete(CONNECTION);
        }
    }

    /// Writes the header block and the blank line that ends it.
    ///
    /// A value built from repeated `set` calls goes out as one line per
    /// `", "`-separated component. A single value containing `", "` is split
    /// the same way.
    pub async fn write_headers(&mut self) -> Result<(), WriteError> {
        if self.headers_written {
            return Err(WriteError::HeadersAlreadySent);
        }

        let mut block = String::new();
        for (name, value) in self.headers.iter() {
            for component in value.split(", ") {
                block.push_str(&format!("{}: {}\r\n", name, component));
            }
        }
        block.push_str("\r\n");
        self.conn.write_all(block.as_bytes()).await?;

        self.headers_written = true;
        Ok(())
    }

    /// Writes one `<hex-len>\r\n<data>\r\n` frame and returns the number of
    /// bytes put on the wire.
    pub async fn write_chunked_body(&mut self, data: &[u8]) -> Result<usize, WriteError> {
        let mut frame = format!("{:x}\r\n", data.len()).into_bytes();
        frame.extend_from_slice(data);
        frame.extend_from_slice(CRLF);

        self.conn.write_all(&frame).await?;
        Ok(frame.len())
    }

    /// Writes the zero-length terminating chunk.
    ///
    /// Without an announced `Trailer` header this is `0\r\n\r\n` and the
    /// message is complete. With one, only `0\r\n` is written and
    /// [`write_trailers`](Self::write_trailers) ends the message.
    pub async fn write_chunked_body_done(&mut self) -> Result<usize, WriteError> {
        let terminator: &[u8] = if self.headers.contains(TRAILER) {
            b"0\r\n"
        } else {
            b"0\r\n\r\n"
        };
        self.conn.write_all(terminator).await?;

        self.chunked_done = true;
        Ok(terminator.len())
    }

    /// Writes trailer fields after the terminating chunk, then the final
    /// blank line.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), WriteError> {
        if !self.chunked_done {
            return Err(WriteError::TrailersBeforeChunkedDone);
        }
        if !self.headers.contains(TRAILER) {
            return Err(WriteError::TrailersNotAnnounced);
        }

        let mut block = String::new();
        for (name, value) in trailers.iter() {
            block.push_str(&format!("{}: {}\r\n", name, value));
        }
        block.push_str("\r\n");
        self.conn.write_all(block.as_bytes()).await?;

        self.trailers_written = true;
        Ok(())
    }

    /// True after a terminating chunk that announced trailers, until the
    /// trailer section has been written.
    pub fn is_trailer_section_open(&self) -> bool {
        self.chunked_done && !self.trailers_written && self.headers.contains(TRAILER)
    }

    /// Completes a response whose header block the handler already wrote.
    /// An announced trailer section that was never written is closed empty.
    pub async fn finish(&mut self) -> Result<(), WriteError> {
        if self.is_trailer_section_open() {
            self.write_trailers(&Headers::new()).await?;
        }
        self.flush().await
    }

    /// Completes a non-chunked response: status line (200 unless one was
    /// written already), default headers, header block, buffered body.
    pub async fn finalize(&mut self) -> Result<(), WriteError> {
        if !self.status_written {
            self.write_status_line(StatusCode::OK).await?;
        }
        self.apply_default_headers();
        self.write_headers().await?;

        let body = std::mem::take(&mut self.body);
        self.conn.write_all(&body).await?;
        self.conn.flush().await?;
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<(), WriteError> {
        self.conn.flush().await?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.conn
    }
}
