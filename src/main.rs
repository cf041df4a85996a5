//! Minimal HTTP/1.1 server (v1)
//!
//! A single-connection-at-a-time HTTP server on raw TCP sockets, serving a
//! flat-file users CRUD application.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!                 │                    HTTP SERVER                       │
//!                 │                                                      │
//!   Client        │  ┌─────────┐    ┌─────────┐    ┌──────────────┐      │
//!   ──────────────┼─▶│   net   │───▶│ request │───▶│   routing    │      │
//!                 │  │listener │    │ parser  │    │  (ordered)   │      │
//!                 │  └─────────┘    └─────────┘    └──────┬───────┘      │
//!                 │                                       │              │
//!                 │                                       ▼              │
//!                 │                               ┌──────────────┐       │
//!                 │                               │   handler    │◀──┐   │
//!                 │                               │  (blocking)  │   │   │
//!                 │                               └──────┬───────┘   │   │
//!                 │                                      │      ┌────┴─┐ │
//!   Client        │  ┌─────────┐                         │      │users │ │
//!   ◀─────────────┼──│response │◀────────────────────────┘      │store │ │
//!                 │  │ builder │                                └──────┘ │
//!                 │  └─────────┘                                         │
//!                 └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use mini_http_server::config::{self, ServerConfig};
use mini_http_server::lifecycle::startup;
use mini_http_server::observability::logging;

#[derive(Parser)]
#[command(name = "mini-http-server")]
#[command(about = "Minimal HTTP/1.1 server with a users CRUD", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Host to bind, overrides the config file.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, overrides the config file.
    #[arg(short, long)]
    port: Option<u16>,

    /// Users data file, overrides the config file.
    #[arg(short, long)]
    data: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, config::ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(data) = self.data {
            config.storage.path = data;
        }

        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("mini-http-server v0.1.0 starting");
    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        read_buffer_size = config.listener.read_buffer_size,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
