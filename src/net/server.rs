//! Connection dispatcher.
//!
//! This module is the thin networking layer around the parser and the
//! response writer. It is responsible only for:
//! - accepting TCP connections,
//! - running one task per connection,
//! - translating parser failures into a `400` response,
//! - finalizing the response once the handler returns.
//!
//! ## Request handling flow
//!
//! 1. Accept a TCP connection and spawn a task for it
//! 2. Read and incrementally parse a [`Request`]
//!    (delegated to [`RequestParser`])
//! 3. Hand the request and a fresh [`ResponseWriter`] to the handler
//! 4. Finalize the response unless the handler already wrote the header
//!    block itself (the chunked path)
//! 5. Close the connection
//!
//! One request is served per connection. In-flight connection tasks are not
//! tracked: [`Server::close`] only stops accepting.

use async_std::future;
use async_std::net::{SocketAddr, TcpListener, TcpStream};
use async_std::task::{self, JoinHandle};
use log::{debug, error, info, warn};
use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::config::ServerConfig;
use crate::error::{ParseError, WriteError};
use crate::http::parser::RequestParser;
use crate::http::request::Request;
use crate::http::response::ResponseWriter;
use crate::http::status::StatusCode;

/// A handler failure rendered by the dispatcher as a plain-text response.
///
/// Handlers should return it before writing anything themselves.
#[derive(Debug, Clone, Error)]
#[error("{status} {message}")]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

struct Shared<H> {
    config: ServerConfig,
    handler: H,
}

pub struct Server {
    local_addr: SocketAddr,
    closed: Arc<AtomicBool>,
    accept_task: JoinHandle<()>,
}

impl Server {
    /// Binds to the configured address and port and starts accepting
    /// connections in the background.
    ///
    /// Every connection gets its own task that parses one request, calls
    /// `handler` with a writer and the request, and finalizes the response.
    pub async fn serve<H, Fut>(config: ServerConfig, handler: H) -> io::Result<Server>
    where
        H: Fn(ResponseWriter<TcpStream>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResponseWriter<TcpStream>, HandlerError>> + Send + 'static,
    {
        let listener = TcpListener::bind((config.address, config.port)).await?;
        let local_addr = listener.local_addr()?;
        info!("Listening on {}", local_addr);

        let closed = Arc::new(AtomicBool::new(false));
        let shared = Arc::new(Shared { config, handler });
        let accept_task = task::spawn(Self::listen(listener, Arc::clone(&closed), shared));

        Ok(Server {
            local_addr,
            closed,
            accept_task,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections and closes the listening socket.
    ///
    /// Cancelling the accept task is what unblocks a pending `accept`. The
    /// flag is set first so a connection accepted concurrently is dropped
    /// instead of served.
    pub async fn close(self) {
        self.closed.store(true, Ordering::SeqCst);
        self.accept_task.cancel().await;
        info!("Server on {} closed", self.local_addr);
    }

    /// Runs until the accept loop exits.
    pub async fn wait(self) {
        self.accept_task.await
    }

    async fn listen<H, Fut>(listener: TcpListener, closed: Arc<AtomicBool>, shared: Arc<Shared<H>>)
    where
        H: Fn(ResponseWriter<TcpStream>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResponseWriter<TcpStream>, HandlerError>> + Send + 'static,
    {
        loop {
            match listener.accept().await {
                Ok(_) if closed.load(Ordering::SeqCst) => return,
                Ok((stream, addr)) => {
                    debug!("Accepted connection from {}", addr);
                    task::spawn(Self::handle_client(stream, Arc::clone(&shared)));
                }
                Err(err) => {
                    if closed.load(Ordering::SeqCst) {
                        return;
                    }
                    error!("Error accepting TCP connection: {}", err);
                }
            }
        }
    }

    /// Serves a single request on `stream`, then drops the connection.
    async fn handle_client<H, Fut>(stream: TcpStream, shared: Arc<Shared<H>>)
    where
        H: Fn(ResponseWriter<TcpStream>, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ResponseWriter<TcpStream>, HandlerError>> + Send + 'static,
    {
        let config = &shared.config;

        let req = match Self::read_request(&stream, config).await {
            Ok(req) => req,
            Err(err) => {
                warn!("Error reading request: {}", err);
                if let Some(status) = err.http_status() {
                    Self::write_error(stream, config, status, &err.to_string()).await;
                }
                return;
            }
        };
        debug!("{} {}", req.method, req.target);

        let writer = ResponseWriter::new(stream.clone());
        match (shared.handler)(writer, req).await {
            Ok(mut writer) => {
                let res = if writer.is_headers_written() {
                    future::timeout(config.write_timeout, writer.finish()).await
                } else {
                    future::timeout(config.write_timeout, writer.finalize()).await
                };
                log_write_result(res);
            }
            Err(handler_err) => {
                debug!("Handler failed: {}", handler_err);
                Self::write_error(stream, config, handler_err.status, &handler_err.message).await;
            }
        }
    }

    async fn read_request(stream: &TcpStream, config: &ServerConfig) -> Result<Request, ParseError> {
        let mut reader = stream.clone();
        let parser = RequestParser::with_limits(config.buffer_size, config.max_request_size);

        future::timeout(config.read_timeout, parser.read_request(&mut reader))
            .await
            .map_err(|e| ParseError::Io(io::Error::new(io::ErrorKind::TimedOut, e)))?
    }

    /// Writes a plain-text error response. Failures are logged and the
    /// connection is closed regardless.
    async fn write_error(stream: TcpStream, config: &ServerConfig, status: StatusCode, message: &str) {
        let mut writer = ResponseWriter::new(stream);

        let res = future::timeout(config.write_timeout, async {
            writer.write_status_line(status).await?;
            writer.set("Content-Type", "text/plain");
            writer.write(message.as_bytes());
            writer.finalize().await?;
            Ok::<(), WriteError>(())
        })
        .await;
        log_write_result(res);
    }
}

fn log_write_result(res: Result<Result<(), WriteError>, future::TimeoutError>) {
    match res {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!("Error writing response: {}", err),
        Err(_) => warn!("Timed out writing response"),
    }
}
