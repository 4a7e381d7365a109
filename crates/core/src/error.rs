//! Signaling error taxonomy

use thiserror::Error;

/// Signaling error taxonomy
///
/// Every variant is recovered at the request boundary and converted to a
/// structured response there; none is fatal to the server process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Unknown session or peer
    #[error("not found: {0}")]
    NotFound(String),

    /// A publisher offer is already stored for the session
    #[error("conflict: {0}")]
    Conflict(String),

    /// The session already closed
    #[error("gone: {0}")]
    Gone(String),

    /// The counterpart never arrived within the pairing timeout
    #[error("timeout: {0}")]
    Timeout(String),

    /// Invalid SDP payload or peer name
    #[error("malformed: {0}")]
    Malformed(String),

    /// Session limit reached
    #[error("capacity: {0}")]
    Capacity(String),

    /// Invalid configuration
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Internal signaling failure
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    /// Machine-readable error kind, used as `error_type` on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound(_) => "not_found",
            Error::Conflict(_) => "conflict",
            Error::Gone(_) => "gone",
            Error::Timeout(_) => "timeout",
            Error::Malformed(_) => "malformed",
            Error::Capacity(_) => "capacity",
            Error::InvalidConfig(_) => "config",
            Error::Internal(_) => "internal",
        }
    }

    /// Reconstruct a variant from a wire `error_type`
    ///
    /// Unrecognized kinds collapse to [`Error::Internal`] so a client
    /// talking to a newer server still gets a usable error.
    pub fn from_kind(kind: &str, message: String) -> Self {
        match kind {
            "not_found" => Error::NotFound(message),
            "conflict" => Error::Conflict(message),
            "gone" => Error::Gone(message),
            "timeout" => Error::Timeout(message),
            "malformed" => Error::Malformed(message),
            "capacity" => Error::Capacity(message),
            "config" => Error::InvalidConfig(message),
            _ => Error::Internal(message),
        }
    }
}

/// Result type for signaling operations
pub type Result<T> = std::result::Result<T, Error>;
