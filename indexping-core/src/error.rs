//! Error types for indexping-core

use thiserror::Error;

/// Main error type for the indexping-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Option store database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// A site or endpoint address could not be parsed
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Operator-supplied key does not satisfy the IndexNow key format
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Content store lookup failed
    #[error("content lookup failed: {0}")]
    Content(String),

    /// The request never produced a response (DNS, connect, timeout)
    #[error("IndexNow request failed: {0}")]
    Transport(String),

    /// The endpoint answered with a status of 400 or above
    #[error("IndexNow request failed with HTTP status {status}: {reason}.")]
    Rejected { status: u16, reason: String },
}

/// Result type alias for indexping-core
pub type Result<T> = std::result::Result<T, Error>;
