//! HTTP/1.1 spoken directly over raw byte streams.
//!
//! The request side is an incremental parser that survives arbitrarily short
//! reads ([`http::parser::RequestParser`]). The response side mirrors the same
//! wire grammar in the write direction ([`http::response::ResponseWriter`]),
//! including chunked transfer encoding and trailers. [`net::server::Server`]
//! glues both to a TCP listener, one task and one request per connection.

pub mod config;
pub mod error;
pub mod http;
pub mod net;

pub use config::ServerConfig;
pub use error::{ParseError, WriteError};
pub use http::headers::Headers;
pub use http::request::{ParseState, Request};
pub use http::response::ResponseWriter;
pub use http::status::StatusCode;
pub use net::server::{HandlerError, Server};
