//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Bind the listener (fatal on failure)
//! - Register routes, then hand everything to the accept loop
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Routes are registered before serving begins and never change after

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;

use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;
use crate::routing::{PatternError, Router};
use crate::users::{self, FileStore, UserStore};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("invalid route: {0}")]
    Route(#[from] PatternError),

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the route table for the users application.
pub fn build_router(config: &ServerConfig) -> Result<Router, PatternError> {
    let store: Arc<dyn UserStore> = Arc::new(FileStore::new(&config.storage.path));
    let mut router = Router::new();
    users::register_routes(&mut router, store)?;
    Ok(router)
}

/// Start serving with a validated configuration until Ctrl+C.
pub async fn run(config: ServerConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = Listener::bind(&config.listener).await?;
    let router = build_router(&config)?;

    tracing::info!(
        url = %format!("http://{}:{}/usuarios", config.listener.host, listener.local_addr()?.port()),
        storage = %config.storage.path,
        "Server ready"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config, router);
    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
