//! Unified error type for data layer
//!
//! Everything that can go wrong while executing a compiled query against the
//! remote endpoint. Malformed filter values never reach this type: those are
//! dropped by the predicate builders.

use thiserror::Error;

/// Unified error type for data layer operations
#[derive(Error, Debug)]
pub enum DataError {
    /// The request never produced a response (DNS, connect, TLS, body read)
    #[error("Transport error on {backend}: {source}")]
    Transport {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The remote endpoint answered with a failure status
    #[error("Remote query failed on {backend} (HTTP {status}): {message}")]
    Remote {
        backend: &'static str,
        status: u16,
        message: String,
    },

    /// The response could not be decoded into the expected tabular shape
    #[error("Malformed response from {backend}: {message}")]
    MalformedResponse {
        backend: &'static str,
        message: String,
    },

    /// Query timeout
    #[error("Query timeout after {timeout_secs}s on {backend}")]
    Timeout {
        backend: &'static str,
        timeout_secs: u64,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DataError {
    /// Create a transport error, classifying timeouts separately
    pub fn from_reqwest(backend: &'static str, e: reqwest::Error, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            Self::timeout(backend, timeout_secs)
        } else {
            Self::Transport { backend, source: e }
        }
    }

    /// Create a remote failure error
    pub fn remote(backend: &'static str, status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            backend,
            status,
            message: message.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(backend: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            backend,
            message: message.into(),
        }
    }

    /// Create a timeout error
    pub fn timeout(backend: &'static str, timeout_secs: u64) -> Self {
        Self::Timeout {
            backend,
            timeout_secs,
        }
    }

    /// Check if this is a connection-related error that might be transient
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport { source, .. } => source.is_connect() || source.is_request(),
            Self::Remote { status, .. } => matches!(status, 502..=504),
            Self::MalformedResponse { .. } | Self::Config(_) => false,
        }
    }

    /// Get the backend name that generated this error
    pub fn backend(&self) -> &'static str {
        match self {
            Self::Transport { backend, .. }
            | Self::Remote { backend, .. }
            | Self::MalformedResponse { backend, .. }
            | Self::Timeout { backend, .. } => backend,
            Self::Config(_) => "unknown",
        }
    }
}
