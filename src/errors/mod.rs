/// Structured error handling for the relay core
///
/// Every failure a dispatch can produce is one of these variants. Local
/// failures (unknown source, unsupported operation, bad parameters) are
/// resolved before any network call and never retried; upstream failures are
/// retriable exactly once through the relay proxy. No error is ever cached
/// and none is fatal to the process.
use serde::Serialize;
use thiserror::Error;

use crate::types::Operation;

#[derive(Error, Debug, Clone)]
pub enum RelayError {
    #[error("unknown source: {source_id}")]
    UnknownSource { source_id: String },

    #[error("source '{source_id}' does not support operation '{operation}'")]
    UnsupportedOperation {
        source_id: String,
        operation: Operation,
    },

    #[error("invalid parameters: {message}")]
    InvalidParameters { message: String },

    #[error("timeout after {timeout_ms}ms calling {endpoint}")]
    UpstreamTimeout { endpoint: String, timeout_ms: u64 },

    #[error("upstream error from {endpoint}: {message}")]
    UpstreamError {
        endpoint: String,
        status: Option<u16>,
        message: String,
    },

    #[error("direct and relayed attempts both failed: {primary}")]
    RelayExhausted {
        /// The direct-path error, surfaced as the primary cause.
        primary: Box<RelayError>,
        relay: Box<RelayError>,
    },
}

impl RelayError {
    pub fn invalid_parameters(message: impl Into<String>) -> Self {
        RelayError::InvalidParameters {
            message: message.into(),
        }
    }

    pub fn upstream(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        RelayError::UpstreamError {
            endpoint: endpoint.into(),
            status: None,
            message: message.into(),
        }
    }

    /// Whether the failure warrants the single relayed retry. Only upstream
    /// timeouts and upstream errors qualify; everything else was decided
    /// locally and retrying cannot change the outcome.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            RelayError::UpstreamTimeout { .. } | RelayError::UpstreamError { .. }
        )
    }

    /// HTTP-style status for the boundary: 404 for unknown source or
    /// unsupported operation, 400 for bad parameters, 500 for anything that
    /// went wrong upstream.
    pub fn status_code(&self) -> u16 {
        match self {
            RelayError::UnknownSource { .. } => 404,
            RelayError::UnsupportedOperation { .. } => 404,
            RelayError::InvalidParameters { .. } => 400,
            RelayError::UpstreamTimeout { .. } => 500,
            RelayError::UpstreamError { .. } => 500,
            RelayError::RelayExhausted { .. } => 500,
        }
    }

    /// Structured object handed to the boundary layer.
    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            status: self.status_code(),
            message: self.to_string(),
        }
    }
}

/// Serializable error shape surfaced to external callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let unknown = RelayError::UnknownSource {
            source_id: "not-a-real-exchange".to_string(),
        };
        assert_eq!(unknown.status_code(), 404);
        assert!(unknown.body().message.contains("not-a-real-exchange"));

        let unsupported = RelayError::UnsupportedOperation {
            source_id: "ankr".to_string(),
            operation: Operation::Ticker,
        };
        assert_eq!(unsupported.status_code(), 404);
        assert!(unsupported.body().message.contains("ankr"));
        assert!(unsupported.body().message.contains("ticker"));

        assert_eq!(RelayError::invalid_parameters("x").status_code(), 400);
        assert_eq!(RelayError::upstream("u", "boom").status_code(), 500);
    }

    #[test]
    fn test_retriable_classification() {
        assert!(RelayError::upstream("u", "502").is_retriable());
        assert!(RelayError::UpstreamTimeout {
            endpoint: "u".to_string(),
            timeout_ms: 30_000,
        }
        .is_retriable());

        assert!(!RelayError::UnknownSource {
            source_id: "x".to_string()
        }
        .is_retriable());
        assert!(!RelayError::invalid_parameters("x").is_retriable());
    }

    #[test]
    fn test_relay_exhausted_surfaces_primary_cause() {
        let primary = RelayError::upstream("https://api.example.com", "connection reset");
        let relay = RelayError::upstream("https://relay.example.com", "502 bad gateway");
        let exhausted = RelayError::RelayExhausted {
            primary: Box::new(primary),
            relay: Box::new(relay),
        };

        assert_eq!(exhausted.status_code(), 500);
        assert!(exhausted.to_string().contains("connection reset"));
    }
}
