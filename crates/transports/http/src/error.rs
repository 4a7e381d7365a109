//! HTTP transport error types

use thiserror::Error;

/// HTTP transport error types
///
/// Protocol-level rejections (`Conflict`, `Gone`, `Timeout`, ...) stay
/// distinguishable from transport failures: the former arrive as
/// [`Error::Signaling`], the latter as [`Error::Http`] or
/// [`Error::Request`].
#[derive(Debug, Error)]
pub enum Error {
    /// Protocol-level rejection reported by the server
    #[error(transparent)]
    Signaling(#[from] signalhub_core::Error),

    /// Non-2xx response without a machine-readable error body
    #[error("HTTP {status} for {url}")]
    Http {
        /// Response status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Request transport failure
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Connection error
    #[error("connection error: {0}")]
    Connection(String),

    /// Server error
    #[error("server error: {0}")]
    Server(String),
}

/// Result type for HTTP transport operations
pub type Result<T> = std::result::Result<T, Error>;
