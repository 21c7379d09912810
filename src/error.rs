//! Error types for the DIS ingest SDK
//!
//! This module defines all error types used throughout the client,
//! providing clear, actionable error messages for developers.

use thiserror::Error;

/// Error type for client operations
///
/// All errors are descriptive and actionable, providing sufficient
/// information for developers to diagnose and resolve issues.
#[derive(Debug, Clone, Error)]
pub enum DisError {
    /// Invalid configuration error
    ///
    /// Occurs when configuration values are invalid or missing required fields.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Authentication failure error
    ///
    /// Occurs when the service rejects the request credentials (HTTP 401/403).
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Network/connection error
    ///
    /// Occurs when the request could not be delivered to the service at all.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The service answered with a non-success status
    #[error("Service error (HTTP {status}): {message}")]
    ServiceError {
        /// HTTP status code
        status: u16,
        /// Service error code (e.g. `DIS.4301`) if the body carried one
        error_code: Option<String>,
        /// Error message from the body, or the raw body
        message: String,
    },

    /// Request or response body could not be (de)serialized
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Record payload encryption or decryption failed
    #[error("Encryption error: {0}")]
    EncryptionError(String),

    /// Request rejected locally before anything was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The service response does not match the request it answers
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A single-record put was rejected by the service
    #[error("Record rejected with {error_code}: {error_message}")]
    RecordRejected {
        error_code: String,
        error_message: String,
    },
}

impl DisError {
    /// Check if the error is retryable
    ///
    /// Returns true for transient errors that should be retried:
    /// - ConnectionError
    /// - ServiceError with a 5xx status or 429
    pub fn is_retryable(&self) -> bool {
        match self {
            DisError::ConnectionError(_) => true,
            DisError::ServiceError { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Check if the error indicates rejected credentials
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, DisError::AuthenticationError(_))
    }

    /// Service error code carried by the error, if any
    pub fn error_code(&self) -> Option<&str> {
        match self {
            DisError::ServiceError { error_code, .. } => error_code.as_deref(),
            DisError::RecordRejected { error_code, .. } => Some(error_code.as_str()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DisError {
    fn from(e: serde_json::Error) -> Self {
        DisError::SerializationError(e.to_string())
    }
}
