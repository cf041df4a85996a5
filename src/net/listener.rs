//! TCP listener implementation.
//!
//! # Responsibilities
//! - Resolve and bind the configured host/port
//! - Listen with a fixed backlog
//! - Accept incoming TCP connections one at a time

use std::net::SocketAddr;

use tokio::net::{lookup_host, TcpListener, TcpSocket, TcpStream};

use crate::config::ListenerConfig;

/// Depth of the kernel queue of pending connections.
pub const LISTEN_BACKLOG: u32 = 5;

/// Error type for listener operations.
#[derive(Debug)]
pub enum ListenerError {
    /// Host/port did not resolve to any address.
    Resolve(String),
    /// Failed to bind or listen.
    Bind(std::io::Error),
    /// Failed to accept connection.
    Accept(std::io::Error),
}

impl std::fmt::Display for ListenerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenerError::Resolve(addr) => write!(f, "Failed to resolve {}", addr),
            ListenerError::Bind(e) => write!(f, "Failed to bind: {}", e),
            ListenerError::Accept(e) => write!(f, "Failed to accept: {}", e),
        }
    }
}

impl std::error::Error for ListenerError {}

/// First IPv4 address, else the first address of any family.
///
/// `localhost` often resolves to `[::1]` first; IPv4 clients expect the
/// server on `127.0.0.1`.
fn preferred_addr(addrs: impl IntoIterator<Item = SocketAddr>) -> Option<SocketAddr> {
    let mut first = None;
    for addr in addrs {
        if addr.is_ipv4() {
            return Some(addr);
        }
        first.get_or_insert(addr);
    }
    first
}

/// The server's listening socket.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
}

impl Listener {
    /// Bind to the configured host and port.
    pub async fn bind(config: &ListenerConfig) -> Result<Self, ListenerError> {
        let target = format!("{}:{}", config.host, config.port);
        let resolved = lookup_host((config.host.as_str(), config.port))
            .await
            .map_err(ListenerError::Bind)?;
        let addr = preferred_addr(resolved).ok_or(ListenerError::Resolve(target))?;

        Self::bind_addr(addr)
    }

    /// Bind to an already resolved address.
    pub fn bind_addr(addr: SocketAddr) -> Result<Self, ListenerError> {
        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(ListenerError::Bind)?;

        socket.set_reuseaddr(true).map_err(ListenerError::Bind)?;
        socket.bind(addr).map_err(ListenerError::Bind)?;
        let listener = socket.listen(LISTEN_BACKLOG).map_err(ListenerError::Bind)?;

        let local_addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(
            address = %local_addr,
            backlog = LISTEN_BACKLOG,
            "Listener bound"
        );

        Ok(Self { inner: listener })
    }

    /// Accept the next pending connection.
    pub async fn accept(&self) -> Result<(TcpStream, SocketAddr), ListenerError> {
        let (stream, addr) = self.inner.accept().await.map_err(ListenerError::Accept)?;
        tracing::debug!(peer_addr = %addr, "Connection accepted");
        Ok((stream, addr))
    }

    /// Get the local address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.inner.local_addr()
    }
}
