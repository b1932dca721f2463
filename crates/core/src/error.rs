//! Error types for the Agora core crate.

use thiserror::Error;

/// Top-level error type for all Agora operations.
#[derive(Debug, Error)]
pub enum AgoraError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("identity provider unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("identity provider rejected service credentials: {0}")]
    UpstreamAuthFailure(String),

    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },
}

/// A convenience Result alias that defaults to [`AgoraError`].
pub type Result<T> = std::result::Result<T, AgoraError>;
