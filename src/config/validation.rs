//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (read buffer, non-empty names)
//! - Check that the metrics address parses when metrics are on
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServerConfig;

/// Largest single read a request may get.
pub const MAX_READ_BUFFER_SIZE: usize = 64 * 1024;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.host must not be empty")]
    EmptyHost,

    #[error("listener.read_buffer_size must be between 1 and 65536, got {0}")]
    ReadBufferSize(usize),

    #[error("storage.path must not be empty")]
    EmptyStoragePath,

    #[error("response.server_name must not be empty")]
    EmptyServerName,

    #[error("unknown observability.log_level {0:?}")]
    LogLevel(String),

    #[error("invalid observability.metrics_address {0:?}")]
    MetricsAddress(String),
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    let size = config.listener.read_buffer_size;
    if size == 0 || size > MAX_READ_BUFFER_SIZE {
        errors.push(ValidationError::ReadBufferSize(size));
    }

    if config.storage.path.trim().is_empty() {
        errors.push(ValidationError::EmptyStoragePath);
    }

    if config.response.server_name.trim().is_empty() {
        errors.push(ValidationError::EmptyServerName);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
