//! Error types for the API client
//!
//! Two families live here:
//!
//! - [`ApiError`] covers everything that can go wrong *before* a request is
//!   sent: configuration, client construction, session storage.
//! - [`NormalizedError`] is the rejection value of every gateway call. It has
//!   the same shape as a [`NormalizedResponse`] plus a [`FailureKind`], so
//!   callers never see a raw transport error.

use crate::response::NormalizedResponse;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result type alias for client construction and storage operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Result of a single call through the gateway
pub type GatewayResult = Result<NormalizedResponse, NormalizedError>;

/// Message used when the transport gave up waiting for the server
pub const TIMEOUT_MESSAGE: &str = "The request took too long. Please try again.";

/// Message used when no response was received at all
pub const NETWORK_MESSAGE: &str = "Connection error. Check that the server is running.";

/// API client errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing environment variable
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Session storage could not be read or written
    #[error("Session storage error: {0}")]
    Session(String),
}

impl ApiError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a missing env var error
    pub fn missing_env(var: impl Into<String>) -> Self {
        Self::MissingEnvVar(var.into())
    }

    /// Create a session storage error
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session(msg.into())
    }
}

/// Why a gateway call was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// No response within the transport timeout
    Timeout,
    /// No response at all (DNS, refused connection, missing base URL)
    Network,
    /// Server answered 401
    Unauthorized,
    /// Server answered 403
    Forbidden,
    /// Server answered 5xx
    Server,
}

impl FailureKind {
    /// Classify a status code the gateway rejects
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            _ => Self::Server,
        }
    }

    /// Whether no response was received
    #[must_use]
    pub fn is_connectivity(self) -> bool {
        matches!(self, Self::Timeout | Self::Network)
    }

    /// Whether the server rejected the session credentials
    #[must_use]
    pub fn is_auth(self) -> bool {
        matches!(self, Self::Unauthorized | Self::Forbidden)
    }
}

/// Rejection value of a gateway call
#[derive(Error, Debug, Clone)]
#[error("{}", .response.message)]
pub struct NormalizedError {
    /// Failure classification
    pub kind: FailureKind,
    /// Same shape a resolved call would carry
    pub response: NormalizedResponse,
}

impl NormalizedError {
    /// Build a connectivity error (status 0)
    #[must_use]
    pub fn connectivity(kind: FailureKind, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind,
            response: NormalizedResponse {
                status: 0,
                data: serde_json::json!({ "message": message }),
                message,
                headers: BTreeMap::new(),
            },
        }
    }

    /// Transport timed out
    #[must_use]
    pub fn timeout() -> Self {
        Self::connectivity(FailureKind::Timeout, TIMEOUT_MESSAGE)
    }

    /// Transport failed without a response
    #[must_use]
    pub fn network() -> Self {
        Self::connectivity(FailureKind::Network, NETWORK_MESSAGE)
    }

    /// Build from an HTTP response the gateway rejects
    #[must_use]
    pub fn from_response(response: NormalizedResponse) -> Self {
        Self {
            kind: FailureKind::from_status(response.status),
            response,
        }
    }

    /// HTTP status, 0 when no response was received
    #[must_use]
    pub fn status(&self) -> u16 {
        self.response.status
    }

    /// Parsed response body
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.response.data
    }

    /// Human readable message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.response.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connectivity_errors_have_status_zero() {
        let timeout = NormalizedError::timeout();
        assert_eq!(timeout.status(), 0);
        assert_eq!(timeout.kind, FailureKind::Timeout);
        assert_eq!(timeout.message(), TIMEOUT_MESSAGE);
        assert_eq!(timeout.data()["message"], TIMEOUT_MESSAGE);

        let network = NormalizedError::network();
        assert!(network.kind.is_connectivity());
        assert_eq!(network.to_string(), NETWORK_MESSAGE);
    }

    #[test]
    fn test_kind_from_status() {
        assert_eq!(FailureKind::from_status(401), FailureKind::Unauthorized);
        assert_eq!(FailureKind::from_status(403), FailureKind::Forbidden);
        assert_eq!(FailureKind::from_status(502), FailureKind::Server);
        assert!(FailureKind::Forbidden.is_auth());
        assert!(!FailureKind::Server.is_auth());
    }
}
