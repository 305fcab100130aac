//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("JWT secret must be at least {0} bytes in production")]
    JwtSecretTooShort(usize),

    #[error("Mailbox capacity must be between 1 and {0}")]
    InvalidMailboxCapacity(usize),

    #[error("Control queue capacity must be at least 1")]
    InvalidControlCapacity,

    #[error("Read timeout must be between 2 and 3600 seconds")]
    InvalidReadTimeout,

    #[error("Write timeout must be at least 1 second and shorter than the read timeout")]
    InvalidWriteTimeout,
}
