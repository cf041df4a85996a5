//! HTTP server accept loop and connection routine.
//!
//! # Responsibilities
//! - Accept connections one at a time from the listener
//! - Run the connection routine: read → parse → route → handle → respond → close
//! - Contain every per-connection failure at the connection boundary
//! - Stop accepting when shutdown is signalled
//!
//! # Design Decisions
//! - Strictly sequential: the next accept happens only after the previous
//!   connection is closed; pending clients wait in the listen backlog
//! - Handlers are synchronous and run on the blocking pool; the loop awaits
//!   them, so a panic surfaces as a `JoinError` instead of unwinding the loop
//! - Parse and handler failures close the connection without a response

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::task::JoinError;
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::http::request::{ParseError, Request};
use crate::http::response::{Reply, Response, StatusCode};
use crate::net::connection::{read_request, ConnectionId, ConnectionState};
use crate::net::listener::{Listener, ListenerError};
use crate::observability::metrics;
use crate::routing::{HandlerError, Router};

/// Pause after a failed accept before trying again.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Body of the 404 written when no route matches.
pub const NOT_FOUND_BODY: &str = "Página não encontrada.";

/// Everything that can end a connection without a response.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("failed to read request: {0}")]
    Read(#[source] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("failed to write response: {0}")]
    Write(#[source] std::io::Error),
}

impl ConnectionError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectionError::Read(_) => "read",
            ConnectionError::Parse(_) => "parse",
            ConnectionError::Handler(_) => "handler",
            ConnectionError::Write(_) => "write",
        }
    }
}

/// Route `request` and run the matched handler.
///
/// No match, including a path match with a disallowed method, is a 404.
pub fn dispatch(router: &Router, request: &Request) -> Result<Reply, HandlerError> {
    match router.match_request(request) {
        Some(matched) => {
            tracing::debug!(pattern = %matched.route.pattern(), "Route matched");
            matched.invoke(request)
        }
        None => {
            tracing::warn!(method = %request.method(), path = %request.path(), "No route matched");
            Ok(Reply::not_found(NOT_FOUND_BODY))
        }
    }
}

fn panic_message(err: JoinError) -> HandlerError {
    if !err.is_panic() {
        return HandlerError::Panicked("handler task cancelled".to_string());
    }
    let payload = err.into_panic();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    HandlerError::Panicked(message)
}

/// Log a failed accept and back off, so a persistent error such as
/// `EMFILE` does not turn the loop into a busy spin.
async fn accept_failed(err: ListenerError) {
    tracing::error!(error = %err, backoff_ms = ACCEPT_BACKOFF.as_millis() as u64, "Accept failed");
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

/// HTTP server owning the route table.
pub struct HttpServer {
    router: Arc<Router>,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a server. The router is frozen from here on.
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            router: Arc::new(router),
            config,
        }
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run the accept loop until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.router.len(),
            "HTTP server starting"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => self.serve_connection(stream, peer).await,
                    Err(e) => accept_failed(e).await,
                },
                Ok(()) = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve one connection to completion. Never fails; errors are logged.
    pub async fn serve_connection(&self, mut stream: TcpStream, peer: SocketAddr) {
        let id = ConnectionId::new();
        let span = tracing::info_span!("connection", connection_id = %id, peer_addr = %peer);

        async {
            let started = Instant::now();
            match self.handle_connection(&mut stream, started).await {
                Ok(status) => {
                    tracing::debug!(status = status.as_u16(), "Response sent");
                }
                Err(e) => {
                    match &e {
                        ConnectionError::Handler(_) => {
                            tracing::error!(error = %e, "Handler failed, closing without response")
                        }
                        _ => tracing::warn!(error = %e, kind = e.kind(), "Closing connection"),
                    }
                    metrics::record_connection_error(e.kind());
                }
            }
            drop(stream);
            tracing::trace!(state = ConnectionState::Closed.as_str(), "Connection closed");
        }
        .instrument(span)
        .await
    }

    async fn handle_connection(
        &self,
        stream: &mut TcpStream,
        started: Instant,
    ) -> Result<StatusCode, ConnectionError> {
        tracing::trace!(state = ConnectionState::Reading.as_str());
        let raw = read_request(stream, self.config.listener.read_buffer_size)
            .await
            .map_err(ConnectionError::Read)?;
        let request = Request::parse(&raw)?;
        let method = request.method().clone();

        tracing::info!(method = %method, path = %request.path(), "Request received");
        tracing::trace!(state = ConnectionState::Handling.as_str());

        let router = Arc::clone(&self.router);
        let span = tracing::Span::current();
        let reply = tokio::task::spawn_blocking(move || span.in_scope(|| dispatch(&router, &request)))
            .await
            .map_err(panic_message)??;

        tracing::trace!(state = ConnectionState::Writing.as_str());
        let response = Response::new(&self.config.response.server_name).apply(reply);
        stream
            .write_all(&response.to_bytes())
            .await
            .map_err(ConnectionError::Write)?;
        // Peer may already be gone; the response is written either way.
        let _ = stream.shutdown().await;

        let status = response.status();
        metrics::record_request(&method, status.as_u16(), started);
        Ok(status)
    }
}
