//! Error taxonomies for the request parser and the response writer.
//!
//! Parser errors are protocol violations (or a dead transport) and are fatal
//! to the request: there is no resynchronization after a malformed message.
//! Writer errors are either transport failures or a handler driving the
//! [`ResponseWriter`](crate::http::response::ResponseWriter) out of order.

use crate::http::status::StatusCode;
use thiserror::Error;

/// Errors that can occur while reading and parsing a request.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request line")]
    MalformedRequestLine,

    #[error("unsupported http method")]
    UnsupportedHttpMethod,

    #[error("unsupported http version")]
    UnsupportedHttpVersion,

    #[error("malformed header")]
    MalformedHeader,

    #[error("invalid content length")]
    InvalidContentLength,

    #[error("body too long")]
    BodyTooLong,

    #[error("incomplete data")]
    IncompleteData,

    /// The parser buffer would have to grow past its configured maximum.
    #[error("request too large")]
    RequestTooLarge,

    /// The parser was stepped after it had already reached `Done`.
    /// This is a caller bug, not something the peer sent.
    #[error("trying to read data in a done state")]
    AlreadyDone,

    #[error("i/o error while reading request: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// Status code the dispatcher answers with, or `None` when the
    /// transport is gone and no response should be attempted.
    pub fn http_status(&self) -> Option<StatusCode> {
        match self {
            ParseError::Io(_) => None,
            ParseError::AlreadyDone => Some(StatusCode::INTERNAL_SERVER_ERROR),
            _ => Some(StatusCode::BAD_REQUEST),
        }
    }
}

/// Errors raised by the response writer.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("status line already written")]
    StatusLineAlreadyWritten,

    #[error("headers already sent")]
    HeadersAlreadySent,

    #[error("trailers written before the chunked body terminator")]
    TrailersBeforeChunkedDone,

    #[error("trailers written without a Trailer header")]
    TrailersNotAnnounced,

    #[error("i/o error while writing response: {0}")]
    Io(#[from] std::io::Error),
}
